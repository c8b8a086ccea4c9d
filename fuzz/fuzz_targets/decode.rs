#![no_main]

use std::hint::black_box;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The decoder must reject malformed input with an error, never a
    // panic or an out-of-bounds read. Re-encoding a decoded document must
    // always succeed.
    if let Ok(bdoc::Value::Document(doc)) = bdoc::decode(data) {
        let bytes = bdoc::encode(&doc).expect("decoded document must re-encode");
        drop(black_box(bytes));
    }
});
