//! OD Reader Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SystemTickSource   SharedAccumulators   UartTransport         │
//! │  (TimeSource)       (Acquisition)        (Transport)           │
//! │  GpioOutput (SPV, OutputPin)                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Sampler · Command/Response · Valve                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Pulse ISRs → gate timer → accumulators                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::info;

use odreader::acquisition::ACCUMULATORS;
use odreader::adapters::gpio::GpioOutput;
use odreader::adapters::time::SystemTickSource;
use odreader::adapters::uart::UartTransport;
use odreader::app::service::ControlLoop;
use odreader::config::InstrumentConfig;
use odreader::drivers::{hw_init, hw_timer};
use odreader::pins;
use odreader::time::Clock;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  OD Reader v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    // Optional JSON override baked in at build time:
    //   ODREADER_CONFIG='{"integration_period_ticks":25}' cargo build ...
    let overrides = option_env!("ODREADER_CONFIG");
    let config = InstrumentConfig::load(overrides)?;
    info!(
        "Config ({}): {:?}",
        if overrides.is_some() { "override" } else { "defaults" },
        config
    );

    // ── 3. Peripherals (valve driven closed here) ─────────────
    hw_init::init_peripherals(config.uart_baud)?;
    hw_init::init_isr_service()?;
    hw_timer::start_gate_timer(config.gate_period_ms);

    // ── 4. Adapters ───────────────────────────────────────────
    let clock = Clock::new(SystemTickSource::new(config.tick_period_us));
    let mut link = UartTransport::new(pins::HOST_UART_PORT);
    let valve_pin = GpioOutput::new(pins::SPV_GPIO);

    // Let the first gate windows fill before the start-up snapshot.
    clock.pause_for(config.settle_ticks);

    // ── 5. Control loop ───────────────────────────────────────
    let mut control = ControlLoop::start(
        &clock,
        &ACCUMULATORS,
        valve_pin,
        config.integration_period_ticks,
    );

    info!("System ready. Entering control loop.");

    // Yield one RTOS tick per iteration so the idle task (and its
    // watchdog) keeps running.
    control.run(&clock, &ACCUMULATORS, &mut link, || FreeRtos::delay_ms(1))
}
