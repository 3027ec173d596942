//! Wraparound-safe tick arithmetic.
//!
//! The instrument keeps time with a small free-running counter that is
//! advanced by a hardware timer and wraps modulo 2^width.  Nothing in the
//! firmware assumes an absolute epoch; every comparison is made on the
//! *difference* of two tick values:
//!
//! ```text
//!   elapsed  = now - since                      (mod 2^width)
//!   is_past  = (now - deadline) as signed >= 0  (half-range rule)
//! ```
//!
//! Both are correct across counter overflow provided the true interval
//! never exceeds half the counter range.

use core::fmt::Debug;

/// Fixed-width unsigned tick value.
///
/// Implemented for `u8`, `u16` and `u32`.  The methods are named so they
/// never collide with the inherent `wrapping_*` integer methods.
pub trait Tick: Copy + Eq + Ord + Debug + From<u8> {
    /// Counter width in bits.
    const BITS: u32;

    /// 2^(width - 1): the longest interval the half-range rule can order.
    const HALF_RANGE: Self;

    /// `self - since`, modulo 2^width.
    fn ticks_since(self, since: Self) -> Self;

    /// `self + by`, modulo 2^width.
    fn offset_by(self, by: Self) -> Self;

    /// Reinterpret as the same-width signed integer and test `>= 0`.
    fn is_non_negative_signed(self) -> bool;
}

macro_rules! impl_tick {
    ($unsigned:ty, $signed:ty) => {
        impl Tick for $unsigned {
            const BITS: u32 = <$unsigned>::BITS;
            const HALF_RANGE: Self = 1 << (<$unsigned>::BITS - 1);

            #[inline]
            fn ticks_since(self, since: Self) -> Self {
                self.wrapping_sub(since)
            }

            #[inline]
            fn offset_by(self, by: Self) -> Self {
                self.wrapping_add(by)
            }

            #[inline]
            fn is_non_negative_signed(self) -> bool {
                (self as $signed) >= 0
            }
        }
    };
}

impl_tick!(u8, i8);
impl_tick!(u16, i16);
impl_tick!(u32, i32);

/// Ticks elapsed from `since` to `now`, modulo 2^width.
#[inline]
pub fn elapsed<T: Tick>(now: T, since: T) -> T {
    now.ticks_since(since)
}

/// `true` once `now` has reached or passed `deadline` (half-range rule).
#[inline]
pub fn is_past<T: Tick>(now: T, deadline: T) -> bool {
    now.ticks_since(deadline).is_non_negative_signed()
}

/// A monotonically increasing tick counter, read-only to the firmware.
pub trait TimeSource {
    type Tick: Tick;

    /// Current counter value.  Never blocks.
    fn now(&self) -> Self::Tick;
}

impl<S: TimeSource + ?Sized> TimeSource for &S {
    type Tick = S::Tick;

    fn now(&self) -> Self::Tick {
        (**self).now()
    }
}

/// Time source adapter: deadline and duration queries on top of a
/// [`TimeSource`].
pub struct Clock<S> {
    source: S,
}

impl<S: TimeSource> Clock<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn now(&self) -> S::Tick {
        self.source.now()
    }

    /// Ticks since `since`, measured against a fresh `now()`.
    pub fn elapsed(&self, since: S::Tick) -> S::Tick {
        elapsed(self.now(), since)
    }

    /// Whether `deadline` has been reached, measured against a fresh `now()`.
    pub fn is_past(&self, deadline: S::Tick) -> bool {
        is_past(self.now(), deadline)
    }

    /// Busy-wait for `duration` ticks.
    ///
    /// Good to about half a tick: the wait starts somewhere inside the
    /// current tick.  Start-up only; the control loop never calls this.
    /// `duration` must stay below [`Tick::HALF_RANGE`].
    pub fn pause_for(&self, duration: S::Tick) {
        let start = self.now();
        while self.elapsed(start) < duration {
            core::hint::spin_loop();
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: TimeSource> TimeSource for Clock<S> {
    type Tick = S::Tick;

    fn now(&self) -> Self::Tick {
        self.source.now()
    }
}
