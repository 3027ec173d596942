//! Per-iteration outcome reported by the control loop.
//!
//! Purely observational: the loop never consumes these itself.  Tests and
//! the bring-up code use them to see what an iteration did without
//! reaching into hardware.

use super::commands::Command;
use crate::drivers::valve::ValveState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport<T> {
    /// The single time sample every decision in this iteration used.
    pub now: T,
    /// A new snapshot was latched before any frame was built.
    pub sampled: bool,
    /// The command serviced this iteration, if a byte was waiting.
    pub command: Option<Command>,
    /// Valve state after the closing check.
    pub valve: ValveState,
}

impl<T> IterationReport<T> {
    /// Whether a response frame went out.
    pub fn responded(&self) -> bool {
        self.command.is_some()
    }
}
