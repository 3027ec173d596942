//! Pair-consistency tests: a concurrent writer must never be observed
//! half-way through an update.
//!
//! The host `critical-section` implementation is a process-wide lock, so
//! a writer thread that updates both counters inside
//! `critical_section::with` behaves like an ISR that cannot preempt the
//! sampler's pair read.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;

use odreader::acquisition::{self, ACCUMULATORS, SharedAccumulators};
use odreader::app::ports::Acquisition;
use odreader::app::sampler::{MeasurementSnapshot, Sampler};

/// Two independent counters, written by the "acquisition side" thread.
/// The writer keeps `receive == !transmit`.
struct SplitCounters {
    transmit: AtomicU32,
    receive: AtomicU32,
}

impl SplitCounters {
    fn new() -> Self {
        Self {
            transmit: AtomicU32::new(0),
            receive: AtomicU32::new(!0),
        }
    }
}

impl Acquisition for SplitCounters {
    fn current_transmit(&self) -> u32 {
        self.transmit.load(Ordering::Relaxed)
    }

    fn current_receive(&self) -> u32 {
        self.receive.load(Ordering::Relaxed)
    }
}

#[test]
fn sampler_never_sees_torn_pair() {
    let counters = SplitCounters::new();
    let done = AtomicBool::new(false);

    let torn = thread::scope(|s| {
        s.spawn(|| {
            let mut n: u32 = 0;
            while !done.load(Ordering::Relaxed) {
                n = n.wrapping_add(1);
                critical_section::with(|_| {
                    counters.transmit.store(n, Ordering::Relaxed);
                    thread::yield_now();
                    counters.receive.store(!n, Ordering::Relaxed);
                });
            }
        });

        let mut sampler = Sampler::start(0u16, 1, &counters);
        let torn = (1..=2_000u16).find_map(|tick| {
            sampler.update(tick, &counters);
            let snap = sampler.snapshot();
            (snap.receive != !snap.transmit).then_some(snap)
        });
        done.store(true, Ordering::Relaxed);
        torn
    });
    assert_eq!(torn, None, "sampler latched a torn pair");
}

#[test]
fn accumulated_pairs_are_never_mixed() {
    let shared = SharedAccumulators::new();
    let done = AtomicBool::new(false);

    let torn = thread::scope(|s| {
        s.spawn(|| {
            let mut n: u32 = 0;
            while !done.load(Ordering::Relaxed) {
                n = n.wrapping_add(3);
                shared.accumulate(MeasurementSnapshot::new(n, n.wrapping_mul(2)));
            }
        });

        let torn = (0..2_000).find_map(|_| {
            let snap = MeasurementSnapshot::take(&shared);
            (snap.receive != snap.transmit.wrapping_mul(2)).then_some(snap)
        });
        done.store(true, Ordering::Relaxed);
        torn
    });
    assert_eq!(torn, None, "reader saw a torn accumulated pair");
}

// The only test in this binary touching the global pulse counters.
#[test]
fn snapshot_integrates_every_gate_in_the_period() {
    let mut sampler = Sampler::start(0u16, 50, &ACCUMULATORS);

    // 20 gate windows of 10 transmit / 7 receive pulses, spread over the
    // integration period.
    for gate in 0..20u16 {
        for _ in 0..10 {
            acquisition::transmit_pulse_isr();
        }
        for _ in 0..7 {
            acquisition::receive_pulse_isr();
        }
        assert_eq!(acquisition::latch_gate(), MeasurementSnapshot::new(10, 7));
        assert!(!sampler.update(gate * 2 + 1, &ACCUMULATORS));
    }

    assert!(sampler.update(50, &ACCUMULATORS));
    assert_eq!(sampler.snapshot(), MeasurementSnapshot::new(200, 140));
    assert_eq!(ACCUMULATORS.load(), MeasurementSnapshot::new(0, 0));

    // Next period starts empty.
    acquisition::receive_pulse_isr();
    acquisition::latch_gate();
    assert!(sampler.update(100, &ACCUMULATORS));
    assert_eq!(sampler.snapshot(), MeasurementSnapshot::new(0, 1));
    assert_eq!(ACCUMULATORS.current_transmit(), 0);
}
