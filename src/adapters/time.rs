//! Tick source adapter.
//!
//! Derives the loop's 16-bit wrapping tick from a monotonic microsecond
//! clock:
//!
//! - **`target_os = "espidf"`** — `esp_timer_get_time()` from the ESP-IDF
//!   high-resolution timer.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` for host-side
//!   testing and simulation.
//!
//! Truncating `micros / tick_period_us` to `u16` is exactly "count modulo
//! 2^16", which is all the wraparound-safe comparisons need.

use crate::time::TimeSource;

/// 16-bit tick counter over the system microsecond timer.
pub struct SystemTickSource {
    tick_period_us: u64,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl SystemTickSource {
    /// `tick_period_us` of zero is treated as one.
    pub fn new(tick_period_us: u32) -> Self {
        Self {
            tick_period_us: u64::from(tick_period_us.max(1)),
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub fn tick_period_us(&self) -> u64 {
        self.tick_period_us
    }
}

impl TimeSource for SystemTickSource {
    type Tick = u16;

    fn now(&self) -> u16 {
        (self.uptime_us() / self.tick_period_us) as u16
    }
}
