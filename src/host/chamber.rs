//! Host-side client for one instrument chamber.
//!
//! Speaks the one-byte request / eight-byte response protocol over any
//! `Read + Write` link (a serial port, a socket, or an in-memory pair in
//! tests).  The link should be configured with a read timeout: a frame
//! shorter than eight bytes is reported as [`FrameError::WrongLength`].

use std::io::{ErrorKind, Read, Write};

use log::{debug, warn};

use crate::app::commands::Command;
use crate::app::sampler::MeasurementSnapshot;
use crate::error::{OdError, Result};
use crate::link::codec::{FRAME_LEN, decode_frame};

use super::od::optical_density;

pub struct Chamber<L> {
    link: L,
    blank: Option<MeasurementSnapshot>,
}

impl<L: Read + Write> Chamber<L> {
    pub fn new(link: L) -> Self {
        Self { link, blank: None }
    }

    /// Send one command byte and read back its frame.
    pub fn request(&mut self, command: Command) -> Result<MeasurementSnapshot> {
        self.link.write_all(&[command.to_byte()])?;
        self.link.flush()?;

        let mut frame = [0u8; FRAME_LEN];
        let n = self.read_frame(&mut frame)?;
        let reading = decode_frame(&frame[..n]).inspect_err(|e| warn!("chamber: {}", e))?;
        debug!("chamber: {:?} -> tx={} rx={}", command, reading.transmit, reading.receive);
        Ok(reading)
    }

    /// Poll the current `{transmit, receive}` pair without touching the valve.
    pub fn read_raw(&mut self) -> Result<MeasurementSnapshot> {
        self.request(Command::Poll)
    }

    /// Open the valve for `ticks` (0 = poll only) and return the reading
    /// that came back with the request.
    pub fn dilute(&mut self, ticks: u8) -> Result<MeasurementSnapshot> {
        self.request(Command::from_byte(ticks))
    }

    /// Take a blank (reference) reading from the chamber.
    pub fn blank(&mut self) -> Result<MeasurementSnapshot> {
        let reading = self.read_raw()?;
        self.blank = Some(reading);
        Ok(reading)
    }

    /// Restore a blank saved from an earlier session.
    pub fn set_blank(&mut self, blank: MeasurementSnapshot) {
        self.blank = Some(blank);
    }

    pub fn blank_reading(&self) -> Option<MeasurementSnapshot> {
        self.blank
    }

    /// Poll and convert to OD units against the stored blank.
    pub fn read_od(&mut self) -> Result<f64> {
        let blank = self.blank.ok_or(OdError::NoBlank)?;
        let reading = self.read_raw()?;
        Ok(optical_density(reading, blank)?)
    }

    pub fn get_ref(&self) -> &L {
        &self.link
    }

    pub fn get_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    /// Read until the frame is full, the link times out, or it hits EOF.
    fn read_frame(&mut self, frame: &mut [u8; FRAME_LEN]) -> Result<usize> {
        let mut filled = 0;
        while filled < FRAME_LEN {
            match self.link.read(&mut frame[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}
