//! GPIO / peripheral pin assignments for the OD reader board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sample pressure valve
// ---------------------------------------------------------------------------

/// Digital output: HIGH = valve open.  Driven LOW at boot.
pub const SPV_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// OD detectors — light-to-frequency pulse outputs, interrupt-driven
// ---------------------------------------------------------------------------

/// Transmit (reference) channel pulse input.
pub const OD_TX_PULSE_GPIO: i32 = 5;
/// Receive (through-sample) channel pulse input.
pub const OD_RX_PULSE_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Host UART
// ---------------------------------------------------------------------------

/// UART controller used for the host link.
pub const HOST_UART_PORT: i32 = 1;
pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
/// Driver ring-buffer sizes (bytes).
pub const UART_RX_BUFFER: i32 = 256;
pub const UART_TX_BUFFER: i32 = 256;
