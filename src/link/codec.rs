//! Response frame codec.
//!
//! Wire format (no header, no length prefix, no terminator):
//! ```text
//! ┌──────────────────────┬─────────────────────┐
//! │ transmit (4B, LE u32)│ receive (4B, LE u32)│
//! └──────────────────────┴─────────────────────┘
//! ```
//!
//! Exactly one frame is sent per request byte.  Frames are derived from
//! the current snapshot at send time and never stored.

use crate::app::sampler::MeasurementSnapshot;
use crate::error::FrameError;

/// Response frame size in bytes.
pub const FRAME_LEN: usize = 8;

/// Byte offset of the receive field.
const RECEIVE_OFFSET: usize = 4;

pub type ResponseFrame = [u8; FRAME_LEN];

/// Serialise a snapshot, transmit field first, each field LSB first.
pub fn encode_frame(snapshot: &MeasurementSnapshot) -> ResponseFrame {
    let mut frame = [0u8; FRAME_LEN];
    frame[..RECEIVE_OFFSET].copy_from_slice(&snapshot.transmit.to_le_bytes());
    frame[RECEIVE_OFFSET..].copy_from_slice(&snapshot.receive.to_le_bytes());
    frame
}

/// Parse a frame received by the host.
///
/// Anything other than exactly [`FRAME_LEN`] bytes is rejected: a short
/// read means the instrument did not answer in time.
pub fn decode_frame(bytes: &[u8]) -> Result<MeasurementSnapshot, FrameError> {
    let frame: &ResponseFrame = bytes
        .try_into()
        .map_err(|_| FrameError::WrongLength(bytes.len()))?;

    let mut transmit = [0u8; RECEIVE_OFFSET];
    let mut receive = [0u8; FRAME_LEN - RECEIVE_OFFSET];
    transmit.copy_from_slice(&frame[..RECEIVE_OFFSET]);
    receive.copy_from_slice(&frame[RECEIVE_OFFSET..]);

    Ok(MeasurementSnapshot {
        transmit: u32::from_le_bytes(transmit),
        receive: u32::from_le_bytes(receive),
    })
}
