//! PI controller for turbidostat dilution
//!
//! Turns the measured OD into a valve-open request (0–255 ticks) that
//! holds the culture at a setpoint.  Larger `kp` reacts faster at the
//! cost of more cycle-to-cycle variation in dilution volume; keep
//! `kp / ki` above roughly 15.

use serde::{Deserialize, Serialize};

/// Largest valve request the protocol can carry.
const U_MAX: f64 = 255.0;

/// Tunable controller parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DilutionConfig {
    /// OD setpoint
    pub setpoint: f64,
    /// Proportional gain (ticks per OD unit)
    pub kp: f64,
    /// Integral gain (ticks per OD unit per cycle)
    pub ki: f64,
    /// Seconds between dilution cycles
    pub period_secs: u32,
}

impl Default for DilutionConfig {
    fn default() -> Self {
        Self {
            setpoint: 0.4,
            kp: 300.0,
            ki: 8.0,
            period_secs: 60,
        }
    }
}

/// Result of one controller update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DilutionStep {
    /// `od - setpoint`
    pub error: f64,
    /// Integrator after this update
    pub z: f64,
    /// Valve request
    pub u: u8,
}

/// PI dilution controller
pub struct DilutionController {
    kp: f64,
    ki: f64,
    setpoint: f64,
    z: f64,
}

impl DilutionController {
    pub fn new(config: &DilutionConfig) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            setpoint: config.setpoint,
            z: 0.0,
        }
    }

    /// Update setpoint
    pub fn set_target(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Restore a saved integrator (clamped into range).
    pub fn set_integrator(&mut self, z: f64) {
        self.z = z.clamp(0.0, U_MAX);
    }

    pub fn integrator(&self) -> f64 {
        self.z
    }

    /// Compute the valve request for one measured OD.
    pub fn update(&mut self, od: f64) -> DilutionStep {
        let error = od - self.setpoint;

        // Integral, saturated so it never winds past the output range
        self.z = (self.z + self.ki * error).clamp(0.0, U_MAX);

        // Proportional on top of the integrator, clamped to one byte
        let u = (self.z + self.kp * error).round().clamp(0.0, U_MAX) as u8;

        DilutionStep { error, z: self.z, u }
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.z = 0.0;
    }
}
