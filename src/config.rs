//! Instrument configuration parameters
//!
//! All tunable parameters for the OD reader.  Defaults describe the
//! stock instrument; firmware builds can bake in a JSON override
//! through the `ODREADER_CONFIG` environment variable.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core instrument configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    // --- Timing ---
    /// Length of one loop tick (microseconds)
    pub tick_period_us: u32,
    /// Integrate for this many ticks before reporting a new pair
    pub integration_period_ticks: u16,
    /// Ticks to wait after bring-up before the start-up snapshot
    pub settle_ticks: u16,

    // --- Acquisition ---
    /// How often ISR pulse counts are folded into the running totals (milliseconds)
    pub gate_period_ms: u32,

    // --- Host link ---
    /// UART baud rate
    pub uart_baud: u32,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_period_us: 40_000,       // 25 Hz; 255 ticks ≈ 10 s of valve
            integration_period_ticks: 50, // 2 s
            settle_ticks: 25,             // 1 s

            // Acquisition
            gate_period_ms: 100,

            // Host link
            uart_baud: 19_200,
        }
    }
}

impl InstrumentConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_us == 0 {
            return Err(ConfigError::ValidationFailed("tick_period_us must be > 0"));
        }
        if self.integration_period_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "integration_period_ticks must be > 0",
            ));
        }
        // Elapsed-time comparisons are only ordered within half the range.
        if self.integration_period_ticks >= 0x8000 {
            return Err(ConfigError::ValidationFailed(
                "integration_period_ticks must be below half the tick range",
            ));
        }
        if self.settle_ticks >= 0x8000 {
            return Err(ConfigError::ValidationFailed(
                "settle_ticks must be below half the tick range",
            ));
        }
        if self.gate_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("gate_period_ms must be > 0"));
        }
        if self.uart_baud == 0 {
            return Err(ConfigError::ValidationFailed("uart_baud must be > 0"));
        }
        Ok(())
    }

    /// Parse a JSON override.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the parsed and validated `json` override if given.
    pub fn load(json: Option<&str>) -> Result<Self, ConfigError> {
        match json {
            Some(json) => Self::from_json(json),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Convert a duration in milliseconds to whole ticks, saturating.
    pub fn millis_to_ticks(&self, ms: u32) -> u16 {
        let ticks = u64::from(ms) * 1000 / u64::from(self.tick_period_us.max(1));
        ticks.min(u64::from(u16::MAX)) as u16
    }
}
