//! Adapters — concrete implementations of the port traits.
//!
//! Each adapter bridges one hardware service to the instrument core.
//! On non-espidf targets they fall back to in-memory stand-ins.

pub mod gpio;
pub mod time;
pub mod uart;
