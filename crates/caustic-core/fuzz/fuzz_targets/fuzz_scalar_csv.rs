#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Try to parse arbitrary text - should error cleanly, never panic
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = caustic_core::parse_scalar_field(text);
    }
});
