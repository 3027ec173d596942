//! Hardware drivers.
//!
//! `hw_init` and `hw_timer` touch ESP-IDF directly and fall back to
//! logging stubs on the host; `valve` is HAL-generic.

pub mod hw_init;
pub mod hw_timer;
pub mod valve;
