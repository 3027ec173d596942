//! Mock hardware adapters for integration tests.
//!
//! Records every pin write and every byte sent so tests can assert on the
//! full history without touching real GPIO or UART registers.

use core::cell::Cell;
use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::digital::{ErrorType, OutputPin};
use odreader::app::ports::{Acquisition, TimeSource};
use odreader::link::transport::Transport;

// ── MockClock ─────────────────────────────────────────────────

/// 16-bit tick counter that only moves when the test says so.
pub struct MockClock {
    tick: Cell<u16>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(tick: u16) -> Self {
        Self {
            tick: Cell::new(tick),
        }
    }

    pub fn set(&self, tick: u16) {
        self.tick.set(tick);
    }

    pub fn advance(&self, ticks: u16) {
        self.tick.set(self.tick.get().wrapping_add(ticks));
    }
}

impl TimeSource for MockClock {
    type Tick = u16;

    fn now(&self) -> u16 {
        self.tick.get()
    }
}

// ── MockAcquisition ───────────────────────────────────────────

/// Accumulator pair the test can change between iterations.
pub struct MockAcquisition {
    pair: Cell<(u32, u32)>,
}

#[allow(dead_code)]
impl MockAcquisition {
    pub fn new(transmit: u32, receive: u32) -> Self {
        Self {
            pair: Cell::new((transmit, receive)),
        }
    }

    pub fn set(&self, transmit: u32, receive: u32) {
        self.pair.set((transmit, receive));
    }
}

impl Acquisition for MockAcquisition {
    fn current_transmit(&self) -> u32 {
        self.pair.get().0
    }

    fn current_receive(&self) -> u32 {
        self.pair.get().1
    }
}

// ── MockLink ──────────────────────────────────────────────────

/// In-memory host link: `rx` is what the host sent, `tx` what the
/// instrument answered.
#[derive(Default)]
pub struct MockLink {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn take_sent(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}

impl Transport for MockLink {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.tx.push(byte);
    }
}

// ── MockPin ───────────────────────────────────────────────────

/// Valve output that records every level it is driven to.
#[derive(Default)]
pub struct MockPin {
    pub writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.writes.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.writes.push(true);
        Ok(())
    }
}
