//! Port traits — the boundary between the control loop and the instrument.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! The acquisition subsystem and the tick counter are driven adapters the
//! loop only reads from.  The byte link lives in
//! [`link::transport`](crate::link::transport) and the valve is a plain
//! [`embedded_hal::digital::OutputPin`].

pub use crate::time::TimeSource;

// ───────────────────────────────────────────────────────────────
// Acquisition port (driven adapter: sensor front-end → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port onto the two OD accumulators.
///
/// Both values are written asynchronously by the acquisition side.  Each
/// getter on its own is a single consistent read; reading the *pair*
/// consistently is the caller's job and must happen inside one
/// `critical_section::with` block (see [`Sampler`](super::sampler::Sampler)).
pub trait Acquisition {
    /// Accumulated count on the transmit (reference) channel.
    fn current_transmit(&self) -> u32;

    /// Accumulated count on the receive (through-sample) channel.
    fn current_receive(&self) -> u32;

    /// Zero both accumulators and start a new integration window.
    ///
    /// Called inside the same critical section as the pair read, right
    /// after it.  Sources whose values already describe one window keep
    /// the default no-op.
    fn restart_integration(&self) {}
}

impl<A: Acquisition + ?Sized> Acquisition for &A {
    fn current_transmit(&self) -> u32 {
        (**self).current_transmit()
    }

    fn current_receive(&self) -> u32 {
        (**self).current_receive()
    }

    fn restart_integration(&self) {
        (**self).restart_integration();
    }
}
