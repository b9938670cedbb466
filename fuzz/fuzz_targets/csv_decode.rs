#![no_main]
use libfuzzer_sys::fuzz_target;
use zconv::csv::{self, CsvConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(rows) = csv::decode(s, &CsvConfig::default()) {
            let _ = csv::encode(&rows, &CsvConfig::default());
        }
    }
});
