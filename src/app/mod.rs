//! Instrument core — ports, loop state, and the control loop itself.
//!
//! Contains no hardware code: everything here runs on the host against
//! mock adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod sampler;
pub mod service;
