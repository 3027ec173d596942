//! Fuzz target: `decode_frame`
//!
//! Arbitrary host-side reads must either decode to a pair that
//! re-encodes to the same bytes, or be rejected with their length.
//!
//! cargo fuzz run fuzz_frame_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use odreader::error::FrameError;
use odreader::link::codec::{FRAME_LEN, decode_frame, encode_frame};

fuzz_target!(|data: &[u8]| {
    match decode_frame(data) {
        Ok(snapshot) => {
            assert_eq!(data.len(), FRAME_LEN);
            assert_eq!(&encode_frame(&snapshot)[..], data);
        }
        Err(FrameError::WrongLength(n)) => {
            assert_eq!(n, data.len());
            assert_ne!(n, FRAME_LEN);
        }
    }
});
