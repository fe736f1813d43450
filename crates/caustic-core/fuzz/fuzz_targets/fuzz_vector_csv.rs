#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The vector reader scatters records by their embedded coordinates,
    // so hostile coordinates must be rejected rather than allocate wildly
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = caustic_core::parse_vector_field(text);
    }
});
