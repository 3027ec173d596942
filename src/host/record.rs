//! Turbidostat log records and persisted controller state.
//!
//! Log lines are one JSON object per cycle:
//! `{"time":1318000000,"OD":0.4012,"Z":12.3456,"U":17}`.
//! OD and Z are rounded to four decimals.
//!
//! Both files must survive the host being switched off mid-run: every
//! log line and every state save is synced to disk before returning.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::sampler::MeasurementSnapshot;
use crate::error::{Error, Result};

fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

/// One dilution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unix time (seconds)
    pub time: u64,
    #[serde(rename = "OD")]
    pub od: f64,
    #[serde(rename = "Z")]
    pub z: f64,
    #[serde(rename = "U")]
    pub u: u8,
}

impl LogRecord {
    pub fn new(time: u64, od: f64, z: f64, u: u8) -> Self {
        Self {
            time,
            od: round4(od),
            z: round4(z),
            u,
        }
    }

    pub fn to_json_line(&self) -> core::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> core::result::Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

/// Controller state carried across restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    /// PI integrator
    pub z: f64,
    /// Blank reading the OD is referenced to
    pub blank: Option<MeasurementSnapshot>,
}

impl ControllerState {
    pub fn to_json(&self) -> core::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> core::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read saved state.  A missing file means a fresh start (`None`).
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage(e)),
        };
        Self::from_json(&json)
            .map(Some)
            .map_err(|_| Error::Storage(ErrorKind::InvalidData))
    }

    /// Overwrite the state file and sync it.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json().map_err(|_| Error::Storage(ErrorKind::InvalidData))?;
        let mut file = File::create(path).map_err(Error::storage)?;
        file.write_all(json.as_bytes()).map_err(Error::storage)?;
        file.sync_data().map_err(Error::storage)
    }
}

/// Append-only JSON-lines log of [`LogRecord`]s.
pub struct RecordLog {
    file: File,
}

impl RecordLog {
    /// Open (or create) `path` for appending.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(Error::storage)?;
        Ok(Self { file })
    }

    /// Write one line and force it to disk.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = record.to_json_line().map_err(|_| Error::Storage(ErrorKind::InvalidData))?;
        writeln!(self.file, "{line}").map_err(Error::storage)?;
        self.file.flush().map_err(Error::storage)?;
        self.file.sync_data().map_err(Error::storage)
    }
}
