//! Host-link UART adapter.
//!
//! Implements [`Transport`] over the ESP-IDF UART driver installed by
//! [`hw_init::init_peripherals`](crate::drivers::hw_init::init_peripherals).  All calls
//! are non-blocking: reads use a zero tick timeout and only happen when
//! the driver reports buffered data, writes go into the driver's TX ring
//! buffer.
//!
//! On non-espidf targets the adapter is an in-memory loopback pair so the
//! bring-up path can be exercised on the host.

use crate::link::transport::Transport;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct UartTransport {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    port: i32,
    #[cfg(not(target_os = "espidf"))]
    rx: std::collections::VecDeque<u8>,
    #[cfg(not(target_os = "espidf"))]
    tx: Vec<u8>,
}

impl UartTransport {
    pub fn new(port: i32) -> Self {
        Self {
            port,
            #[cfg(not(target_os = "espidf"))]
            rx: std::collections::VecDeque::new(),
            #[cfg(not(target_os = "espidf"))]
            tx: Vec::new(),
        }
    }

    /// Simulate bytes arriving from the host.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Drain everything written towards the host so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn take_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }
}

#[cfg(target_os = "espidf")]
impl Transport for UartTransport {
    fn available(&self) -> usize {
        let mut len: usize = 0;
        // SAFETY: the driver for `port` was installed by init_peripherals();
        // `len` is a valid out-pointer for the duration of the call.
        let ret = unsafe { uart_get_buffered_data_len(self.port, &mut len) };
        if ret != ESP_OK as i32 { 0 } else { len }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        // SAFETY: one-byte buffer, zero timeout; driver installed at boot.
        let n = unsafe {
            uart_read_bytes(self.port, (&raw mut byte).cast(), 1, 0)
        };
        (n == 1).then_some(byte)
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_all(&[byte]);
    }

    fn write_all(&mut self, data: &[u8]) {
        // SAFETY: `data` outlives the call; the driver copies into its TX
        // ring buffer before returning.
        let n = unsafe { uart_write_bytes(self.port, data.as_ptr().cast(), data.len()) };
        if n < 0 {
            log::warn!("uart: write of {} bytes failed (rc={})", data.len(), n);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Transport for UartTransport {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.tx.push(byte);
    }
}
