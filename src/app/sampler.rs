//! Measurement sampler — periodic, tear-free capture of the OD pair.
//!
//! The acquisition side keeps integrating both channels continuously.
//! Reporting every raw read would expose instantaneous noise, so the
//! sampler only latches a new pair once per integration period and the
//! host keeps seeing the previous pair in between.
//!
//! The latch reads both accumulators inside a single critical section so
//! the pair never mixes a transmit value from one acquisition cycle with
//! a receive value from another.  The same critical section restarts the
//! acquisition side's integration, so each reported pair covers exactly
//! the ticks since the previous latch.

use serde::{Deserialize, Serialize};

use super::ports::Acquisition;
use crate::time::{Tick, elapsed};

/// The most recent completed integration on both channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementSnapshot {
    /// Transmit (reference) channel.
    pub transmit: u32,
    /// Receive (through-sample) channel.
    pub receive: u32,
}

impl MeasurementSnapshot {
    pub const fn new(transmit: u32, receive: u32) -> Self {
        Self { transmit, receive }
    }

    /// Read both accumulators as one pair.
    ///
    /// `critical_section::with` restores the previous interrupt state on
    /// every exit path, including unwinding out of the closure.
    pub fn capture<A: Acquisition + ?Sized>(acquisition: &A) -> Self {
        critical_section::with(|_cs| Self {
            transmit: acquisition.current_transmit(),
            receive: acquisition.current_receive(),
        })
    }

    /// Read both accumulators as one pair and restart integration in the
    /// same critical section, so no count lands between read and reset.
    pub fn take<A: Acquisition + ?Sized>(acquisition: &A) -> Self {
        critical_section::with(|_cs| {
            let pair = Self {
                transmit: acquisition.current_transmit(),
                receive: acquisition.current_receive(),
            };
            acquisition.restart_integration();
            pair
        })
    }
}

/// Integration-period scheduler plus the snapshot it maintains.
#[derive(Debug)]
pub struct Sampler<T> {
    period: T,
    last_sample: T,
    snapshot: MeasurementSnapshot,
}

impl<T: Tick> Sampler<T> {
    /// Take the start-up snapshot at `now` and schedule the next one a
    /// full `period` later.  Counts gathered before `now` go into the
    /// start-up pair; the first full window starts here.
    pub fn start<A: Acquisition + ?Sized>(now: T, period: T, acquisition: &A) -> Self {
        Self {
            period,
            last_sample: now,
            snapshot: MeasurementSnapshot::take(acquisition),
        }
    }

    /// Refresh the snapshot if a full integration period has elapsed.
    ///
    /// Returns `true` when a new pair was latched.  Cannot fail.
    pub fn update<A: Acquisition + ?Sized>(&mut self, now: T, acquisition: &A) -> bool {
        if elapsed(now, self.last_sample) < self.period {
            return false;
        }
        self.snapshot = MeasurementSnapshot::take(acquisition);
        self.last_sample = now;
        true
    }

    pub fn snapshot(&self) -> MeasurementSnapshot {
        self.snapshot
    }

    pub fn last_sample(&self) -> T {
        self.last_sample
    }

    pub fn period(&self) -> T {
        self.period
    }
}
