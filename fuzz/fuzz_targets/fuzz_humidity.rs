//! Fuzz target: humidity compensation encoding
//!
//! Any pair of `f32`s, including NaN and infinities, must map to a code
//! without panicking.
//!
//! cargo fuzz run fuzz_humidity

#![no_main]

use iaqmon::sensors::humidity::convert;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 8]| {
    let t = f32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let rh = f32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let _ = convert(t, rh);
});
