//! OD accumulators shared between the acquisition side and the loop.
//!
//! Both photodetectors are light-to-frequency converters.  Each output
//! edge fires a GPIO ISR that bumps an atomic pulse counter.  A periodic
//! gate (timer task context, see `drivers::hw_timer`) swaps both counters
//! to zero and adds the two counts to the shared accumulators.  The
//! accumulators keep adding up across gates until the sampler takes the
//! pair, which zeroes them and starts the next integration window:
//!
//! ```text
//!  TX edge ISR ──▶ TRANSMIT_PULSES ─┐
//!                                   ├─ latch_gate() ──▶ SharedAccumulators ──▶ Sampler
//!  RX edge ISR ──▶ RECEIVE_PULSES  ─┘   (gate timer)   (running totals,      (take + restart,
//!                                                        blocking Mutex)      main loop)
//! ```
//!
//! Pulses still sitting in the ISR counters when the sampler latches are
//! folded in by the next gate, so they count towards the next window
//! instead of being lost.
//!
//! The totals live behind an `embassy_sync` blocking mutex over the
//! `critical-section` raw mutex, the same primitive the sampler uses for
//! its pair read.  Each getter is one locked read; pair consistency comes
//! from the sampler wrapping both getters and the restart in one critical
//! section.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::ports::Acquisition;
use crate::app::sampler::MeasurementSnapshot;

/// Pulses since the last gate, transmit channel.
static TRANSMIT_PULSES: AtomicU32 = AtomicU32::new(0);
/// Pulses since the last gate, receive channel.
static RECEIVE_PULSES: AtomicU32 = AtomicU32::new(0);

/// Running totals read by the main loop.
pub static ACCUMULATORS: SharedAccumulators = SharedAccumulators::new();

/// Called from the transmit-channel GPIO ISR on each rising edge.
pub fn transmit_pulse_isr() {
    TRANSMIT_PULSES.fetch_add(1, Ordering::Relaxed);
}

/// Called from the receive-channel GPIO ISR on each rising edge.
pub fn receive_pulse_isr() {
    RECEIVE_PULSES.fetch_add(1, Ordering::Relaxed);
}

/// Close the current gate window: add the pulse counts collected since
/// the previous call to [`ACCUMULATORS`] and return them.
pub fn latch_gate() -> MeasurementSnapshot {
    let window = MeasurementSnapshot {
        transmit: TRANSMIT_PULSES.swap(0, Ordering::Relaxed),
        receive: RECEIVE_PULSES.swap(0, Ordering::Relaxed),
    };
    ACCUMULATORS.accumulate(window);
    window
}

/// `{transmit, receive}` totals since the last integration restart.
pub struct SharedAccumulators {
    inner: Mutex<CriticalSectionRawMutex, Cell<MeasurementSnapshot>>,
}

impl Default for SharedAccumulators {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedAccumulators {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(MeasurementSnapshot::new(0, 0))),
        }
    }

    /// Add one gate window to both totals in one locked write (wrapping).
    pub fn accumulate(&self, window: MeasurementSnapshot) {
        self.inner.lock(|cell| {
            let total = cell.get();
            cell.set(MeasurementSnapshot {
                transmit: total.transmit.wrapping_add(window.transmit),
                receive: total.receive.wrapping_add(window.receive),
            });
        });
    }

    /// Both values in one locked read.
    pub fn load(&self) -> MeasurementSnapshot {
        self.inner.lock(Cell::get)
    }
}

impl Acquisition for SharedAccumulators {
    fn current_transmit(&self) -> u32 {
        self.inner.lock(|cell| cell.get().transmit)
    }

    fn current_receive(&self) -> u32 {
        self.inner.lock(|cell| cell.get().receive)
    }

    fn restart_integration(&self) {
        self.inner.lock(|cell| cell.set(MeasurementSnapshot::default()));
    }
}
