#![no_main]
use libfuzzer_sys::fuzz_target;
use zconv::xml::{self, XmlConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(decoded) = xml::decode_document(s, &XmlConfig::default()) {
            if let Ok(text) = xml::encode(&decoded.node, &decoded.root) {
                let _ = xml::decode(&text);
            }
        }
    }
});
