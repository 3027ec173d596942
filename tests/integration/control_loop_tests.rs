//! Integration tests for the ControlLoop → link → valve pipeline.
//!
//! Each test builds a loop over the mock clock, acquisition, link and pin,
//! steps it tick by tick, and checks the bytes and pin levels that come
//! out the other side.

use super::mock_hw::{MockAcquisition, MockClock, MockLink, MockPin};

use odreader::app::commands::Command;
use odreader::app::sampler::MeasurementSnapshot;
use odreader::app::service::ControlLoop;
use odreader::drivers::valve::ValveState;
use odreader::link::codec::decode_frame;

const PERIOD: u16 = 50;

fn make_loop(now: u16, tx: u32, rx: u32) -> (ControlLoop<MockPin, u16>, MockClock, MockAcquisition, MockLink) {
    let clock = MockClock::at(now);
    let acq = MockAcquisition::new(tx, rx);
    let cl = ControlLoop::start(&clock, &acq, MockPin::new(), PERIOD);
    (cl, clock, acq, MockLink::new())
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_drives_valve_closed_and_captures_pair() {
    let (cl, ..) = make_loop(0, 7, 9);
    assert_eq!(cl.valve().pin().writes, vec![false]);
    assert_eq!(cl.valve().state(), ValveState::Closed);
    assert_eq!(cl.snapshot(), MeasurementSnapshot::new(7, 9));
}

// ── Request / response ────────────────────────────────────────

#[test]
fn no_response_without_request() {
    let (mut cl, clock, acq, mut link) = make_loop(0, 1, 2);
    for _ in 0..200 {
        clock.advance(1);
        let report = cl.step(&clock, &acq, &mut link);
        assert!(!report.responded());
    }
    assert!(link.tx.is_empty(), "instrument must never speak unprompted");
}

#[test]
fn response_is_eight_little_endian_bytes() {
    let (mut cl, clock, acq, mut link) = make_loop(0, 0x0102_0304, 0xAABB_CCDD);
    link.send(&[0]);
    cl.step(&clock, &acq, &mut link);
    assert_eq!(link.tx, vec![0x04, 0x03, 0x02, 0x01, 0xDD, 0xCC, 0xBB, 0xAA]);
}

#[test]
fn every_byte_gets_exactly_one_frame() {
    let (mut cl, clock, acq, mut link) = make_loop(0, 5, 6);
    link.send(&[0, 3, 0]);

    for _ in 0..3 {
        cl.step(&clock, &acq, &mut link);
        clock.advance(1);
    }
    // Nothing left to answer.
    cl.step(&clock, &acq, &mut link);

    let sent = link.take_sent();
    assert_eq!(sent.len(), 24);
    for frame in sent.chunks(8) {
        assert_eq!(decode_frame(frame).unwrap(), MeasurementSnapshot::new(5, 6));
    }
}

#[test]
fn response_holds_previous_pair_until_period_elapses() {
    let (mut cl, clock, acq, mut link) = make_loop(1000, 10, 20);
    acq.set(30, 40);

    clock.set(1000 + PERIOD - 1);
    link.send(&[0]);
    cl.step(&clock, &acq, &mut link);
    assert_eq!(decode_frame(&link.take_sent()).unwrap(), MeasurementSnapshot::new(10, 20));

    clock.set(1000 + PERIOD);
    link.send(&[0]);
    let report = cl.step(&clock, &acq, &mut link);
    assert!(report.sampled);
    assert_eq!(decode_frame(&link.take_sent()).unwrap(), MeasurementSnapshot::new(30, 40));
}

#[test]
fn report_carries_decoded_command() {
    let (mut cl, clock, acq, mut link) = make_loop(0, 0, 0);
    link.send(&[42]);
    let report = cl.step(&clock, &acq, &mut link);
    assert_eq!(report.command, Some(Command::from_byte(42)));
    assert_eq!(report.command.and_then(Command::valve_ticks), Some(42));
}

// ── Valve timing ──────────────────────────────────────────────

/// Step from `from` to `to` (exclusive), one tick at a time, and collect
/// the valve state at each tick.
fn run_ticks(
    cl: &mut ControlLoop<MockPin, u16>,
    clock: &MockClock,
    acq: &MockAcquisition,
    link: &mut MockLink,
    from: u16,
    count: u16,
) -> Vec<ValveState> {
    (0..count)
        .map(|i| {
            clock.set(from.wrapping_add(i));
            cl.step(clock, acq, link).valve
        })
        .collect()
}

#[test]
fn valve_open_for_exactly_requested_ticks() {
    let (mut cl, clock, acq, mut link) = make_loop(90, 0, 0);

    clock.set(100);
    link.send(&[10]);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Open);

    let states = run_ticks(&mut cl, &clock, &acq, &mut link, 101, 9);
    assert!(states.iter().all(|s| *s == ValveState::Open), "{states:?}");

    clock.set(110);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Closed);
    assert!(!cl.valve().pin().is_high());
}

#[test]
fn valve_timing_survives_counter_wrap() {
    let (mut cl, clock, acq, mut link) = make_loop(0xFFF0, 0, 0);

    clock.set(0xFFF8);
    link.send(&[10]);
    cl.step(&clock, &acq, &mut link);
    assert_eq!(cl.valve().deadline(), 0x0002);

    let states = run_ticks(&mut cl, &clock, &acq, &mut link, 0xFFF9, 9);
    assert!(states.iter().all(|s| *s == ValveState::Open), "{states:?}");

    clock.set(0x0002);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Closed);
}

#[test]
fn poll_does_not_touch_deadline() {
    let (mut cl, clock, acq, mut link) = make_loop(100, 0, 0);
    link.send(&[10]);
    cl.step(&clock, &acq, &mut link);

    clock.set(105);
    link.send(&[0]);
    cl.step(&clock, &acq, &mut link);
    assert_eq!(cl.valve().deadline(), 110);

    clock.set(109);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Open);
    clock.set(110);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Closed);
}

#[test]
fn new_command_retimes_open_valve() {
    let (mut cl, clock, acq, mut link) = make_loop(100, 0, 0);
    link.send(&[10]);
    cl.step(&clock, &acq, &mut link);

    // Shorten: 10 at 100 then 2 at 105 closes at 107, not 110.
    clock.set(105);
    link.send(&[2]);
    cl.step(&clock, &acq, &mut link);
    assert_eq!(cl.valve().deadline(), 107);

    clock.set(107);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Closed);
}

#[test]
fn maximum_duration_stays_below_half_range() {
    let (mut cl, clock, acq, mut link) = make_loop(0x7F00, 0, 0);
    link.send(&[255]);
    cl.step(&clock, &acq, &mut link);

    clock.set(0x7F00 + 254);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Open);
    clock.set(0x7F00 + 255);
    assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Closed);
}

#[test]
fn closed_valve_is_rewritten_low_every_iteration() {
    let (mut cl, clock, acq, mut link) = make_loop(0, 0, 0);
    for _ in 0..5 {
        clock.advance(1);
        cl.step(&clock, &acq, &mut link);
    }
    assert_eq!(cl.valve().pin().writes, vec![false; 6]);
}

#[test]
fn stale_deadline_never_reopens_valve() {
    let (mut cl, clock, acq, mut link) = make_loop(0, 0, 0);
    link.send(&[5]);
    cl.step(&clock, &acq, &mut link);
    clock.set(5);
    cl.step(&clock, &acq, &mut link);

    // Walk the clock a full revolution; the old deadline aliases into the
    // future for half of it.
    for t in (6u32..=0x1_0005).step_by(97) {
        clock.set(t as u16);
        assert_eq!(cl.step(&clock, &acq, &mut link).valve, ValveState::Closed);
    }
    assert!(cl.valve().pin().writes.iter().skip(2).all(|high| !high));
}
