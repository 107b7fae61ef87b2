// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use md2adoc_pipeline::{Converter, Destination};

fuzz_target!(|data: &[u8]| {
    // Decoding and rendering may fail, but never panic
    if let Ok(Some(out)) = Converter::new().convert(data, Destination::Return, None) {
        assert!(out.is_empty() || (out.ends_with('\n') && !out.ends_with("\n\n")));
    }
});
