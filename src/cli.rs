use crate::{weather::Units, Error, Result};

/// Options for the `run` command; values are `None` when not provided on CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub device: Option<String>,
    pub baud: Option<u32>,
    pub city: Option<String>,
    pub api_key: Option<String>,
    pub units: Option<Units>,
    pub config_file: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub demo: bool,
    pub dry_run: bool,
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Box<RunOptions>),
    ShowHelp,
    ShowVersion,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut iter = args.iter();
        match iter.next().map(|s| s.as_str()) {
            None => Ok(Command::Run(Box::default())),
            Some("run") => Ok(Command::Run(Box::new(parse_run_options(&mut iter)?))),
            Some("--help") | Some("-h") => Ok(Command::ShowHelp),
            Some("--version") | Some("-V") => Ok(Command::ShowVersion),
            Some(flag) if flag.starts_with('-') => {
                // `run` is implied when the first argument is already a flag.
                let mut iter = args.iter();
                Ok(Command::Run(Box::new(parse_run_options(&mut iter)?)))
            }
            Some(cmd) => Err(Error::InvalidArgs(format!(
                "unknown command '{cmd}', try --help"
            ))),
        }
    }

    pub fn help() -> &'static str {
        concat!(
            "serial-weather - rotate weather readings across a serial character display\n",
            "\n",
            "USAGE:\n",
            "  serial-weather [run] [OPTIONS]\n",
            "  serial-weather --help\n",
            "  serial-weather --version\n",
            "\n",
            "OPTIONS:\n",
            "  --device <path>       Serial device path (default: /dev/ttyUSB0)\n",
            "  --baud <number>       Baud rate (default: 500000)\n",
            "  --city <name>         Place to query, e.g. \"Kingston, CA\"\n",
            "  --api-key <key>       OpenWeatherMap API key (or SERIAL_WEATHER_API_KEY)\n",
            "  --units <units>       metric or imperial (default: metric)\n",
            "  --config <path>       Config file (default: ~/.serial_weather/config.toml)\n",
            "  --log-level <level>   error|warn|info|debug|trace (default: info)\n",
            "  --log-file <path>     Append log lines to a file\n",
            "  --demo                Use a built-in snapshot instead of the weather API\n",
            "  --dry-run             Print display commands to stdout instead of the serial port\n",
            "  -h, --help            Show this help\n",
            "  -V, --version         Show version\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn parse_run_options(iter: &mut std::slice::Iter<String>) -> Result<RunOptions> {
    let mut opts = RunOptions::default();

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--device" => opts.device = Some(take_value(flag, iter)?),
            "--baud" => {
                let raw = take_value(flag, iter)?;
                let baud: u32 = raw.parse().map_err(|_| {
                    Error::InvalidArgs("baud must be a positive integer".to_string())
                })?;
                if baud == 0 {
                    return Err(Error::InvalidArgs(
                        "baud must be a positive integer".to_string(),
                    ));
                }
                opts.baud = Some(baud);
            }
            "--city" => opts.city = Some(take_value(flag, iter)?),
            "--api-key" => opts.api_key = Some(take_value(flag, iter)?),
            "--units" => {
                let raw = take_value(flag, iter)?;
                opts.units = Some(raw.parse::<Units>().map_err(Error::InvalidArgs)?);
            }
            "--config" => opts.config_file = Some(take_value(flag, iter)?),
            "--log-level" => opts.log_level = Some(take_value(flag, iter)?),
            "--log-file" => opts.log_file = Some(take_value(flag, iter)?),
            "--demo" => opts.demo = true,
            "--dry-run" => opts.dry_run = true,
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown flag '{other}', try --help"
                )));
            }
        }
    }

    Ok(opts)
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::InvalidArgs(format!("expected a value after {flag}")))
}
