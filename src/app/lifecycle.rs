use crate::{Error, Result};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

pub const FAREWELL: &str = "Exiting program, thanks!";

/// Install a ctrl-c handler that flips the shared running flag instead of exiting immediately.
pub(crate) fn create_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let running_handle = running.clone();

    ctrlc::set_handler(move || {
        running_handle.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    Ok(running)
}

pub(crate) fn print_farewell() {
    log::info!("shutdown complete");
    println!("{FAREWELL}");
}
