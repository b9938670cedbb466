#![no_main]
use libfuzzer_sys::fuzz_target;
use zconv::convert::json_to_xml;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = json_to_xml(s, "root");
    }
});
