//! Fuzz target: `ControlLoop::step` over an arbitrary host byte stream
//!
//! Input is read as (tick advance, byte) pairs.  Each pair moves the
//! clock, optionally queues a command byte, and runs one iteration.
//! Checks that every byte is answered with exactly one frame and that
//! the valve is open only while its deadline is in the future.
//!
//! cargo fuzz run fuzz_command_stream

#![no_main]

use core::cell::Cell;
use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::digital::{ErrorType, OutputPin};
use libfuzzer_sys::fuzz_target;
use odreader::app::ports::{Acquisition, TimeSource};
use odreader::app::service::ControlLoop;
use odreader::drivers::valve::ValveState;
use odreader::link::codec::FRAME_LEN;
use odreader::link::transport::Transport;
use odreader::time::is_past;

struct Ticks(Cell<u16>);

impl TimeSource for Ticks {
    type Tick = u16;

    fn now(&self) -> u16 {
        self.0.get()
    }
}

struct Counts;

impl Acquisition for Counts {
    fn current_transmit(&self) -> u32 {
        1
    }

    fn current_receive(&self) -> u32 {
        2
    }
}

#[derive(Default)]
struct Wire {
    rx: VecDeque<u8>,
    sent: usize,
}

impl Transport for Wire {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_byte(&mut self, _byte: u8) {
        self.sent += 1;
    }
}

struct Pin;

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let clock = Ticks(Cell::new(0));
    let mut wire = Wire::default();
    let mut control = ControlLoop::start(&clock, &Counts, Pin, 50);
    let mut requests = 0usize;

    for pair in data.chunks_exact(2) {
        // Bounded advance keeps every open interval below half range.
        clock.0.set(clock.0.get().wrapping_add(u16::from(pair[0] & 0x3F)));
        if pair[0] & 0x80 != 0 {
            wire.rx.push_back(pair[1]);
            requests += 1;
        }

        let report = control.step(&clock, &Counts, &mut wire);
        let deadline = control.valve().deadline();
        if report.valve == ValveState::Open {
            assert!(!is_past(report.now, deadline));
        }
    }

    assert_eq!(wire.sent, requests * FRAME_LEN);
});
