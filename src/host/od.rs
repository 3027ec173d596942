//! Optical density from raw detector counts.
//!
//! ```text
//!   OD = -log10( (rx / tx) / (rx_blank / tx_blank) )
//! ```
//!
//! Normalising by the transmit channel cancels source-intensity drift;
//! the blank sets OD 0 for clear medium.

use crate::app::sampler::MeasurementSnapshot;
use crate::error::OdError;

/// Receive/transmit ratio of one reading.
pub fn transmittance(reading: MeasurementSnapshot) -> Result<f64, OdError> {
    if reading.transmit == 0 || reading.receive == 0 {
        return Err(OdError::NoSignal);
    }
    Ok(f64::from(reading.receive) / f64::from(reading.transmit))
}

pub fn optical_density(sample: MeasurementSnapshot, blank: MeasurementSnapshot) -> Result<f64, OdError> {
    let signal = transmittance(sample)?;
    let reference = transmittance(blank)?;
    Ok(-(signal / reference).log10())
}
