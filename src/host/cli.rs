//! Command line of the `turbidostat` host binary.
//!
//! Options are `--name=value` or `--name value`; flags take no value.

use std::fmt;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: turbidostat [options]

  -t, --test          print one raw (transmit, receive) pair and exit
  -?, --help          show this message
      --port=PORT     serial device (default /dev/ttyUSB0)
      --setpoint=OD   target optical density (default 0.4)
      --logfile=PATH  JSON-lines cycle log (default log.dat)
      --state=PATH    controller state file (default state.dat)";

#[derive(Debug, Clone, PartialEq)]
pub struct HostOptions {
    pub test_mode: bool,
    pub port: String,
    pub setpoint: f64,
    pub logfile: PathBuf,
    pub state_file: PathBuf,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            test_mode: false,
            port: "/dev/ttyUSB0".into(),
            setpoint: 0.4,
            logfile: PathBuf::from("log.dat"),
            state_file: PathBuf::from("state.dat"),
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Help,
    Run(HostOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    UnknownOption(String),
    MissingValue(&'static str),
    BadSetpoint(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOption(opt) => write!(f, "unknown option '{opt}'"),
            Self::MissingValue(opt) => write!(f, "option '{opt}' needs a value"),
            Self::BadSetpoint(v) => write!(f, "setpoint '{v}' is not a number"),
        }
    }
}

impl std::error::Error for CliError {}

impl HostOptions {
    /// Parse the arguments after the program name.
    pub fn parse<I, S>(args: I) -> Result<Invocation, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut opts = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            let (name, inline) = match arg.split_once('=') {
                Some((name, value)) if name.starts_with("--") => {
                    (name.to_owned(), Some(value.to_owned()))
                }
                _ => (arg.clone(), None),
            };

            match name.as_str() {
                "-t" | "--test" => opts.test_mode = true,
                "-?" | "-h" | "--help" => return Ok(Invocation::Help),
                "--port" => opts.port = value(inline, &mut args, "--port")?,
                "--logfile" => opts.logfile = value(inline, &mut args, "--logfile")?.into(),
                "--state" => opts.state_file = value(inline, &mut args, "--state")?.into(),
                "--setpoint" => {
                    let raw = value(inline, &mut args, "--setpoint")?;
                    opts.setpoint = match raw.parse::<f64>() {
                        Ok(sp) if sp.is_finite() => sp,
                        _ => return Err(CliError::BadSetpoint(raw)),
                    };
                }
                _ => return Err(CliError::UnknownOption(arg)),
            }
        }
        Ok(Invocation::Run(opts))
    }
}

fn value(
    inline: Option<String>,
    rest: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<String, CliError> {
    inline
        .or_else(|| rest.next())
        .ok_or(CliError::MissingValue(name))
}
