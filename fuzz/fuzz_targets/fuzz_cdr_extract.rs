#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must not panic — errors are fine, panics are bugs.
    let _ = remision::ubl::cdr::extract_cdr_status(data);
});
