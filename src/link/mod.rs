//! Host link — byte transport and the response frame codec.

pub mod codec;
pub mod transport;
