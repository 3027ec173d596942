//! Sample pressure valve (SPV) driver.
//!
//! Single digital output: HIGH = open, LOW = closed.  The valve opens on a
//! host command for a given number of ticks and closes itself once the
//! deadline has passed.
//!
//! ```text
//!            arm(now, d)              arm(now, d)  (re-time)
//!   Closed ─────────────▶ Open ◀──────────────────┐
//!     ▲                    │ └────────────────────┘
//!     └────────────────────┘
//!        is_past(now, deadline)
//! ```
//!
//! The pin is re-driven to the current state on every [`Valve::update`];
//! repeated writes of the same level are expected and harmless.
//!
//! ## Safety contract
//!
//! The tick type must be wider than 8 bits.  A command byte can ask for
//! up to 255 ticks, and on an 8-bit counter anything from 128 up lands
//! at or beyond half the range, where the deadline reads as already
//! past and the valve would never open.  `Valve<_, u8>` is rejected at
//! compile time.
//!
//! The closing check only ever moves Open → Closed.  A stale deadline
//! that drifts more than half the tick range behind `now` aliases to
//! "in the future" under the half-range rule; because Closed never
//! re-opens on its own, that alias cannot reopen the valve.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::time::{Tick, is_past};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveState {
    Closed,
    Open,
}

pub struct Valve<P, T> {
    pin: P,
    deadline: T,
    state: ValveState,
}

impl<P: OutputPin, T: Tick> Valve<P, T> {
    /// Every command byte (1..=255) must stay below half the tick range.
    const TICK_HOLDS_ANY_COMMAND: () = assert!(
        T::BITS > u8::BITS,
        "valve deadlines need a tick wider than 8 bits"
    );

    /// Take the pin, drive it closed, and arm the deadline to "already
    /// expired" at `now`.
    pub fn new(pin: P, now: T) -> Self {
        let () = Self::TICK_HOLDS_ANY_COMMAND;
        let mut valve = Self {
            pin,
            deadline: now,
            state: ValveState::Closed,
        };
        valve.drive();
        valve
    }

    /// Open (or keep open) until `now + ticks`.
    ///
    /// The sum is allowed to wrap; [`is_past`] orders it correctly because
    /// `ticks` (at most 255) is below half of any accepted tick range.
    pub fn arm(&mut self, now: T, ticks: u8) {
        self.deadline = now.offset_by(T::from(ticks));
        if self.state == ValveState::Closed {
            debug!("valve: open until {:?} ({} ticks)", self.deadline, ticks);
        } else {
            debug!("valve: re-timed to {:?} ({} ticks)", self.deadline, ticks);
        }
        self.state = ValveState::Open;
    }

    /// Close if the deadline has passed, then drive the pin to match.
    pub fn update(&mut self, now: T) -> ValveState {
        if self.state == ValveState::Open && is_past(now, self.deadline) {
            debug!("valve: closed at {:?}", now);
            self.state = ValveState::Closed;
        }
        self.drive();
        self.state
    }

    fn drive(&mut self) {
        let result = match self.state {
            ValveState::Open => self.pin.set_high(),
            ValveState::Closed => self.pin.set_low(),
        };
        // Next update re-drives the pin, so a failed write is retried.
        if let Err(e) = result {
            warn!("valve: pin write failed ({:?}), want {:?}", e, self.state);
        }
    }

    pub fn state(&self) -> ValveState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ValveState::Open
    }

    /// Last armed deadline (the start-up tick if never armed).
    pub fn deadline(&self) -> T {
        self.deadline
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}
