//! Host-side turbidostat: holds a culture at a target OD by metering
//! medium through the instrument's sample valve.
//!
//! Every `period_secs` it reads the OD, runs the PI controller, opens
//! the valve for the computed number of ticks, appends a JSON line to the
//! log and saves the controller state so a restart resumes where it left
//! off.

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serialport::SerialPort;

use odreader::host::chamber::Chamber;
use odreader::host::cli::{HostOptions, Invocation, USAGE};
use odreader::host::dilution::DilutionConfig;
use odreader::host::record::{ControllerState, RecordLog};
use odreader::host::turbidostat::Turbidostat;

const BAUD: u32 = 19_200;
const READ_TIMEOUT: Duration = Duration::from_millis(500);
/// Lets the instrument finish its start-up snapshot after the port opens.
const SETTLE: Duration = Duration::from_secs(5);

fn main() -> Result<ExitCode> {
    let opts = match HostOptions::parse(std::env::args().skip(1)) {
        Ok(Invocation::Run(opts)) => opts,
        Ok(Invocation::Help) => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("[ERROR] {e}");
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    let port = open_port(&opts.port)?;
    let mut chamber = Chamber::new(port);

    if opts.test_mode {
        let raw = chamber.read_raw().context("reading raw pair")?;
        println!("({}, {})", raw.transmit, raw.receive);
        return Ok(ExitCode::SUCCESS);
    }

    let config = DilutionConfig {
        setpoint: opts.setpoint,
        ..DilutionConfig::default()
    };
    let mut turbidostat = Turbidostat::new(chamber, &config);

    let saved = ControllerState::load(&opts.state_file)
        .with_context(|| format!("reading {}", opts.state_file.display()))?;
    if saved.is_some() {
        println!("Resuming from {}", opts.state_file.display());
    }
    let mut log = RecordLog::open(&opts.logfile)
        .with_context(|| format!("opening {}", opts.logfile.display()))?;

    thread::sleep(SETTLE);
    turbidostat.resume(saved).context("blanking")?;
    println!("Setpoint OD {:.3}, cycle every {} s", config.setpoint, config.period_secs);

    loop {
        match turbidostat.cycle(unix_time()) {
            Ok(record) => {
                turbidostat
                    .state()
                    .save(&opts.state_file)
                    .with_context(|| format!("writing {}", opts.state_file.display()))?;
                let line = record.to_json_line()?;
                println!("{line}");
                log.append(&record)
                    .with_context(|| format!("writing {}", opts.logfile.display()))?;
            }
            Err(e) => eprintln!("[WARNING] cycle skipped: {e}"),
        }
        thread::sleep(Duration::from_secs(u64::from(config.period_secs)));
    }
}

fn open_port(name: &str) -> Result<Box<dyn SerialPort>> {
    serialport::new(name, BAUD)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|e| {
            eprintln!("[ERROR] Failed to open port '{name}': {e}");
            if let Ok(ports) = serialport::available_ports() {
                eprintln!("Available ports:");
                for p in ports {
                    eprintln!("  - {}", p.port_name);
                }
            }
            e
        })
        .with_context(|| format!("opening {name}"))
}

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
