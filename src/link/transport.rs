//! Transport abstraction — the byte-oriented host link.
//!
//! Concrete implementations:
//! - UART serial ([`UartTransport`](crate::adapters::uart::UartTransport))
//! - In-memory queues in tests
//!
//! The transport is assumed reliable and in-order; writes always succeed
//! or buffer.  The control loop is generic over `Transport`, so swapping
//! the physical link requires no change to the loop.

/// Byte-oriented, non-blocking transport channel.
pub trait Transport {
    /// Number of received bytes waiting to be read.
    fn available(&self) -> usize;

    /// Take one received byte.  `None` only if nothing is waiting.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue one byte for transmission.
    fn write_byte(&mut self, byte: u8);

    /// Queue every byte of `data`, in order.
    fn write_all(&mut self, data: &[u8]) {
        for &byte in data {
            self.write_byte(byte);
        }
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn available(&self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte);
    }
}

/// A null transport that discards all writes and never reads.
/// Useful before the host link is brought up.
pub struct NullTransport;

impl Transport for NullTransport {
    fn available(&self) -> usize {
        0
    }

    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn write_byte(&mut self, _byte: u8) {}
}
