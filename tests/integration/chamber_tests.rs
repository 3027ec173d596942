//! End-to-end tests: host-side `Chamber` / `Turbidostat` talking to a real
//! `ControlLoop` through an in-memory serial line.

use std::io::{self, Read, Write};

use super::mock_hw::{MockAcquisition, MockClock, MockLink, MockPin};

use odreader::app::ports::TimeSource;
use odreader::app::sampler::MeasurementSnapshot;
use odreader::app::service::ControlLoop;
use odreader::drivers::valve::ValveState;
use odreader::error::{Error, OdError};
use odreader::host::chamber::Chamber;
use odreader::host::dilution::DilutionConfig;
use odreader::host::record::ControllerState;
use odreader::host::turbidostat::Turbidostat;

const PERIOD: u16 = 50;

/// Instrument on the far end of a serial line.
///
/// Every byte the host writes is delivered, then the loop is stepped once
/// per integration period until the byte is consumed, so each request is
/// answered with a freshly latched pair.
struct Instrument {
    control: ControlLoop<MockPin, u16>,
    clock: MockClock,
    acq: MockAcquisition,
    link: MockLink,
}

impl Instrument {
    fn new(tx: u32, rx: u32) -> Self {
        let clock = MockClock::at(0);
        let acq = MockAcquisition::new(tx, rx);
        let control = ControlLoop::start(&clock, &acq, MockPin::new(), PERIOD);
        Self {
            control,
            clock,
            acq,
            link: MockLink::new(),
        }
    }

    fn run_pending(&mut self) {
        while !self.link.rx.is_empty() {
            self.clock.advance(PERIOD);
            self.control.step(&self.clock, &self.acq, &mut self.link);
        }
    }
}

impl Write for Instrument {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.link.send(buf);
        self.run_pending();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for Instrument {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.link.tx.len());
        buf[..n].copy_from_slice(&self.link.tx[..n]);
        self.link.tx.drain(..n);
        Ok(n)
    }
}

#[test]
fn chamber_reads_pair_from_running_loop() {
    let mut chamber = Chamber::new(Instrument::new(0x0102_0304, 0xAABB_CCDD));
    assert_eq!(
        chamber.read_raw().unwrap(),
        MeasurementSnapshot::new(0x0102_0304, 0xAABB_CCDD)
    );
    let instrument = chamber.into_inner();
    assert_eq!(instrument.control.valve().state(), ValveState::Closed);
}

#[test]
fn chamber_dilute_opens_valve() {
    let mut chamber = Chamber::new(Instrument::new(1, 1));
    chamber.dilute(30).unwrap();

    let instrument = chamber.into_inner();
    assert!(instrument.control.valve().is_open());
    assert_eq!(
        instrument.control.valve().deadline(),
        instrument.clock.now().wrapping_add(30)
    );
}

#[test]
fn od_read_without_blank_sends_nothing() {
    let mut chamber = Chamber::new(Instrument::new(1, 1));
    assert_eq!(chamber.read_od(), Err(Error::Od(OdError::NoBlank)));
    assert_eq!(chamber.into_inner().control.iterations(), 0);
}

#[test]
fn dark_detector_is_reported_not_divided() {
    let mut chamber = Chamber::new(Instrument::new(1000, 1000));
    chamber.blank().unwrap();
    chamber.get_mut().acq.set(1000, 0);
    assert_eq!(chamber.read_od(), Err(Error::Od(OdError::NoSignal)));
}

#[test]
fn turbidostat_cycle_measures_then_dilutes() {
    let mut t = Turbidostat::new(
        Chamber::new(Instrument::new(1000, 1000)),
        &DilutionConfig::default(),
    );
    t.resume(None).unwrap();
    assert_eq!(t.state().blank, Some(MeasurementSnapshot::new(1000, 1000)));

    // Ten times less light through the sample: OD 1.0, error 0.6.
    // z = 8 * 0.6 = 4.8; u = round(4.8 + 300 * 0.6) = 185.
    t.chamber_mut().get_mut().acq.set(1000, 100);
    let rec = t.cycle(1_700_000_000).unwrap();
    assert_eq!(rec.time, 1_700_000_000);
    assert!((rec.od - 1.0).abs() < 1e-9, "od={}", rec.od);
    assert!((rec.z - 4.8).abs() < 1e-9, "z={}", rec.z);
    assert_eq!(rec.u, 185);

    let instrument = t.chamber_mut().get_mut();
    assert!(instrument.control.valve().is_open());
    assert_eq!(
        instrument.control.valve().deadline(),
        instrument.clock.now().wrapping_add(185)
    );
}

#[test]
fn turbidostat_resumes_saved_state_without_reblanking() {
    let saved = ControllerState {
        z: 12.5,
        blank: Some(MeasurementSnapshot::new(2000, 1000)),
    };
    let mut t = Turbidostat::new(
        Chamber::new(Instrument::new(2000, 1000)),
        &DilutionConfig::default(),
    );
    t.resume(Some(saved)).unwrap();

    assert_eq!(t.state(), saved);
    assert_eq!(t.chamber_mut().get_mut().control.iterations(), 0, "no request sent");

    // At the blank: OD 0, error -0.4, z = 12.5 - 3.2 = 9.3, u = round(9.3 - 120) → 0.
    let rec = t.cycle(1).unwrap();
    assert!(rec.od.abs() < 1e-9);
    assert!((rec.z - 9.3).abs() < 1e-9, "z={}", rec.z);
    assert_eq!(rec.u, 0);
    assert!(!t.chamber_mut().get_mut().control.valve().is_open());
}
