//! Acquisition gate timer using ESP-IDF's esp_timer API.
//!
//! A periodic timer closes one pulse-count window per period by calling
//! [`latch_gate`](crate::acquisition::latch_gate), which adds the window's
//! transmit/receive counts to the totals the main loop integrates.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can take the critical-section mutex that guards the pair.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::acquisition::latch_gate;

#[cfg(target_os = "espidf")]
static mut GATE_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: GATE_TIMER is written once in `start_gate_timer()` before any
/// timer callback fires.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn gate_timer() -> esp_timer_handle_t { unsafe { GATE_TIMER } }

#[cfg(target_os = "espidf")]
unsafe extern "C" fn gate_cb(_arg: *mut core::ffi::c_void) {
    latch_gate();
}

/// Start the periodic acquisition gate.
#[cfg(target_os = "espidf")]
pub fn start_gate_timer(period_ms: u32) {
    // SAFETY: GATE_TIMER is written here once at boot from the single
    // main-task context before any timer callback fires.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(gate_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"od_gate\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut GATE_TIMER);
        if ret != ESP_OK as i32 {
            log::error!("hw_timer: gate timer create failed (rc={}); snapshots will stay at zero", ret);
            return;
        }
        let ret = esp_timer_start_periodic(gate_timer(), u64::from(period_ms) * 1_000);
        if ret != ESP_OK as i32 {
            log::error!("hw_timer: gate timer start failed (rc={})", ret);
            return;
        }

        info!("hw_timer: OD gate every {} ms", period_ms);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_gate_timer(_period_ms: u32) {
    log::info!("hw_timer(sim): gate timer not started (call latch_gate() directly)");
}
