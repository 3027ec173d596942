//! Unified error types for the OD reader.
//!
//! The control loop itself is total and never produces these.  They cover
//! configuration, bring-up and the host-side tooling.  All variants are
//! `Copy` so they pass through logging and retry paths without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation outside the control loop funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// A response frame from the instrument was malformed.
    Frame(FrameError),
    /// The host link failed.
    Link(std::io::ErrorKind),
    /// A host-side log or state file could not be read or written.
    Storage(std::io::ErrorKind),
    /// An OD value could not be computed from the readings.
    Od(OdError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Link(kind) => write!(f, "link: {kind}"),
            Self::Storage(kind) => write!(f, "storage: {kind}"),
            Self::Od(e) => write!(f, "od: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// File I/O failure on the host side (not the instrument link).
    pub fn storage(e: std::io::Error) -> Self {
        Self::Storage(e.kind())
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The serialised config could not be parsed.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame was not exactly 8 bytes (usually a read timeout).
    WrongLength(usize),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength(n) => write!(f, "expected 8 bytes, got {n}"),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// OD computation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdError {
    /// No blank reading has been taken yet.
    NoBlank,
    /// A transmit or receive count was zero (detector unplugged or dark).
    NoSignal,
}

impl fmt::Display for OdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBlank => write!(f, "no blank reading"),
            Self::NoSignal => write!(f, "zero detector signal"),
        }
    }
}

impl std::error::Error for OdError {}

impl From<OdError> for Error {
    fn from(e: OdError) -> Self {
        Self::Od(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Link(e.kind())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
