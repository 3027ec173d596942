//! OD reader firmware library.
//!
//! Exposes the control loop and its ports for integration testing, plus
//! the host-side protocol tooling.  All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod acquisition;
pub mod app;
pub mod config;
pub mod error;
pub mod host;
pub mod link;
pub mod pins;
pub mod time;

// Hardware-facing modules; host builds get the simulation stand-ins.
pub mod adapters;
pub mod drivers;

mod esp_link_shims;
