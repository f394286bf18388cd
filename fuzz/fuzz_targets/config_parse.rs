#![no_main]

use libfuzzer_sys::fuzz_target;

extern crate weblaunch;

fuzz_target!(|data: &[u8]| {
    // The configuration parser must reject garbage with an error, not
    // a panic.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = weblaunch::config::parse_config(text);
    }
});
