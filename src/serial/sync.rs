use crate::{Error, Result};
use serialport::{DataBits, FlowControl, Parity, StopBits};
use std::io::{self, Write};
use std::time::Duration;

use super::{CommandSink, FlowControlMode, SerialOptions};

/// Write-only serial link to the display. The port is released on `close`
/// or when this value is dropped.
#[derive(Debug)]
pub struct SerialPort {
    device: String,
    baud: u32,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialPort {
    pub fn connect(device: &str, options: SerialOptions) -> Result<Self> {
        if device.is_empty() {
            return Err(Error::InvalidArgs(
                "device path cannot be empty".to_string(),
            ));
        }

        let port = serialport::new(device, options.baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(to_serial_flow(options.flow_control))
            .timeout(Duration::from_millis(options.timeout_ms))
            .open()
            .map_err(map_serial_error)?;

        Ok(Self {
            device: device.to_string(),
            baud: options.baud,
            port: Some(port),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }
}

impl CommandSink for SerialPort {
    fn send_command(&mut self, command: &str) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| Error::InvalidArgs("serial port not connected".into()))?;

        port.write_all(command.as_bytes())?;
        port.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            port.flush()?;
            log::debug!("serial port {} released", self.device);
        }
        Ok(())
    }
}

fn map_serial_error(err: serialport::Error) -> Error {
    use serialport::ErrorKind;

    let kind = match err.kind() {
        ErrorKind::NoDevice => io::ErrorKind::NotFound,
        ErrorKind::InvalidInput => io::ErrorKind::InvalidInput,
        ErrorKind::Io(inner) => inner,
        ErrorKind::Unknown => io::ErrorKind::Other,
    };

    Error::Io(io::Error::new(kind, err))
}

fn to_serial_flow(mode: FlowControlMode) -> FlowControl {
    match mode {
        FlowControlMode::None => FlowControl::None,
        FlowControlMode::Software => FlowControl::Software,
        FlowControlMode::Hardware => FlowControl::Hardware,
    }
}
