//! Host-side tooling for the instrument's serial protocol.
//!
//! ```text
//!   Turbidostat ──▶ Chamber ──(1 byte)──▶ instrument
//!        │             ◀──(8 bytes)──┘
//!        └─▶ DilutionController (PI) ─▶ valve ticks
//! ```
//!
//! Runs on a PC next to the instrument; never built into the firmware
//! image's hot path.  The `turbidostat` binary (feature `host`) wires
//! these to a serial port, with [`cli`] parsing its command line.

pub mod chamber;
pub mod cli;
pub mod dilution;
pub mod od;
pub mod record;
pub mod turbidostat;
