//! Control loop — the instrument's single real-time core.
//!
//! [`ControlLoop`] owns the only mutable state that outlives an iteration:
//! the measurement snapshot (inside the [`Sampler`]) and the valve deadline
//! (inside the [`Valve`]).  Time, acquisition and the host link are ports
//! injected at the call site, so the whole loop runs against mocks on the
//! host.
//!
//! ```text
//!  TimeSource ──▶ ┌──────────────────────────┐ ──▶ Transport (frames)
//! Acquisition ──▶ │       ControlLoop        │
//!   Transport ──▶ │ Sampler · Command · Valve│ ──▶ OutputPin (SPV)
//!  (commands)     └──────────────────────────┘
//! ```
//!
//! One iteration, all against a single `now` read at the top:
//! 1. latch a new snapshot if the integration period elapsed;
//! 2. if a byte is waiting, consume it and answer with one frame;
//!    a non-zero byte re-arms the valve deadline;
//! 3. close the valve if its deadline passed, drive the pin.

use embedded_hal::digital::OutputPin;
use log::{info, trace};

use crate::drivers::valve::Valve;
use crate::link::codec::encode_frame;
use crate::link::transport::Transport;
use crate::time::Tick;

use super::commands::Command;
use super::events::IterationReport;
use super::ports::{Acquisition, TimeSource};
use super::sampler::{MeasurementSnapshot, Sampler};

/// Loop state: created at start-up, mutated every iteration, never dropped
/// while the instrument runs.
///
/// `T` must be wider than 8 bits so every valve command (up to 255 ticks)
/// stays below half the tick range; `ControlLoop<_, u8>` does not build.
pub struct ControlLoop<P, T> {
    sampler: Sampler<T>,
    valve: Valve<P, T>,
    iterations: u64,
}

impl<P: OutputPin, T: Tick> ControlLoop<P, T> {
    /// Capture the start-up snapshot, take the valve pin and close it.
    ///
    /// The acquisition side must already be running; start-up sequencing
    /// is the caller's responsibility.
    pub fn start<C, A>(clock: &C, acquisition: &A, valve_pin: P, integration_period: T) -> Self
    where
        C: TimeSource<Tick = T> + ?Sized,
        A: Acquisition + ?Sized,
    {
        let now = clock.now();
        let sampler = Sampler::start(now, integration_period, acquisition);
        let valve = Valve::new(valve_pin, now);
        let snap = sampler.snapshot();
        info!(
            "ControlLoop started at tick {:?} (period={:?}, tx={}, rx={})",
            now, integration_period, snap.transmit, snap.receive
        );
        Self {
            sampler,
            valve,
            iterations: 0,
        }
    }

    /// Run one iteration.  Total: never fails, never blocks beyond the
    /// eight-byte frame write.
    pub fn step<C, A, L>(&mut self, clock: &C, acquisition: &A, link: &mut L) -> IterationReport<T>
    where
        C: TimeSource<Tick = T> + ?Sized,
        A: Acquisition + ?Sized,
        L: Transport + ?Sized,
    {
        self.iterations = self.iterations.wrapping_add(1);
        let now = clock.now();

        // 1. Sampler first, so a frame sent this iteration carries the fresh pair.
        let sampled = self.sampler.update(now, acquisition);

        // 2. At most one request per iteration.
        let command = self.service_link(now, link);

        // 3. Closing check against the same `now`.
        let valve = self.valve.update(now);

        IterationReport {
            now,
            sampled,
            command,
            valve,
        }
    }

    /// Iterate forever, calling `idle` between iterations (task yield on
    /// RTOS targets, nothing on bare metal).
    pub fn run<C, A, L>(&mut self, clock: &C, acquisition: &A, link: &mut L, mut idle: impl FnMut()) -> !
    where
        C: TimeSource<Tick = T> + ?Sized,
        A: Acquisition + ?Sized,
        L: Transport + ?Sized,
    {
        info!("ControlLoop: entering main loop");
        loop {
            self.step(clock, acquisition, link);
            idle();
        }
    }

    fn service_link<L: Transport + ?Sized>(&mut self, now: T, link: &mut L) -> Option<Command> {
        if link.available() == 0 {
            return None;
        }
        let command = Command::from_byte(link.read_byte()?);

        // Every request is answered, poll or not.
        link.write_all(&encode_frame(&self.sampler.snapshot()));

        if let Some(ticks) = command.valve_ticks() {
            self.valve.arm(now, ticks);
        }
        trace!("link: {:?} at {:?}", command, now);
        Some(command)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> MeasurementSnapshot {
        self.sampler.snapshot()
    }

    pub fn sampler(&self) -> &Sampler<T> {
        &self.sampler
    }

    pub fn valve(&self) -> &Valve<P, T> {
        &self.valve
    }

    /// Iterations run since start-up (wraps).
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
