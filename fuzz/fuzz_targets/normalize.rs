#![no_main]

use std::path::Path;

use dicon::{BuiltinNormalizer, SourceNormalizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        let normalizer = BuiltinNormalizer::new();
        if let Ok(once) = normalizer.normalize(Path::new("fuzz.go"), s) {
            // Accepted input must stay accepted
            assert!(normalizer.normalize(Path::new("fuzz.go"), &once).is_ok());
        }
    }
});
