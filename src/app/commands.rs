//! Host commands.
//!
//! Every request on the link is a single byte and every byte is a
//! request: there is no framing, so a stray byte on the wire is a valid
//! command.  The byte doubles as a poll trigger and, when non-zero, as a
//! valve-open duration in ticks.

use core::num::NonZeroU8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `0x00`: report the current snapshot, leave the valve alone.
    Poll,
    /// `0x01..=0xFF`: report the snapshot and open the valve for this many
    /// ticks from now (re-timing it if it is already open).
    OpenValve(NonZeroU8),
}

impl Command {
    pub fn from_byte(byte: u8) -> Self {
        match NonZeroU8::new(byte) {
            Some(ticks) => Self::OpenValve(ticks),
            None => Self::Poll,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Poll => 0,
            Self::OpenValve(ticks) => ticks.get(),
        }
    }

    /// Requested open duration, if this command touches the valve.
    pub fn valve_ticks(self) -> Option<u8> {
        match self {
            Self::Poll => None,
            Self::OpenValve(ticks) => Some(ticks.get()),
        }
    }
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}
