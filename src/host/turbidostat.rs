//! One-chamber turbidostat cycle: measure OD, update the PI controller,
//! dilute.
//!
//! Timing (the sleep between cycles) and log file handling belong to the
//! caller; [`Turbidostat::cycle`] does exactly one request/response pair
//! for the OD read and one for the dilution.

use std::io::{Read, Write};

use log::{info, warn};

use crate::error::Result;

use super::chamber::Chamber;
use super::dilution::{DilutionConfig, DilutionController};
use super::record::{ControllerState, LogRecord};

pub struct Turbidostat<L> {
    chamber: Chamber<L>,
    controller: DilutionController,
}

impl<L: Read + Write> Turbidostat<L> {
    pub fn new(chamber: Chamber<L>, config: &DilutionConfig) -> Self {
        Self {
            chamber,
            controller: DilutionController::new(config),
        }
    }

    /// Restore the integrator and blank from a previous run, or take a
    /// fresh blank when none was saved.
    pub fn resume(&mut self, state: Option<ControllerState>) -> Result<()> {
        if let Some(saved) = state {
            self.controller.set_integrator(saved.z);
        }
        match state.and_then(|s| s.blank) {
            Some(blank) => {
                self.chamber.set_blank(blank);
                info!(
                    "turbidostat: resumed (z={:.4}, blank={:?})",
                    self.controller.integrator(),
                    blank
                );
            }
            None => {
                let blank = self.chamber.blank()?;
                info!("turbidostat: fresh blank {:?}", blank);
            }
        }
        Ok(())
    }

    /// Run one measure/dilute cycle stamped with `time`.
    pub fn cycle(&mut self, time: u64) -> Result<LogRecord> {
        let od = self
            .chamber
            .read_od()
            .inspect_err(|e| warn!("turbidostat: OD read failed: {}", e))?;
        let step = self.controller.update(od);
        self.chamber.dilute(step.u)?;
        Ok(LogRecord::new(time, od, step.z, step.u))
    }

    /// State to persist after each cycle.
    pub fn state(&self) -> ControllerState {
        ControllerState {
            z: self.controller.integrator(),
            blank: self.chamber.blank_reading(),
        }
    }

    pub fn chamber(&self) -> &Chamber<L> {
        &self.chamber
    }

    pub fn chamber_mut(&mut self) -> &mut Chamber<L> {
        &mut self.chamber
    }

    pub fn controller_mut(&mut self) -> &mut DilutionController {
        &mut self.controller
    }
}
