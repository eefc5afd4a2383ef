#![no_main]

use facturx::font::FontMetrics;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must not panic or read out of bounds. Errors are fine.
    if let Ok(metrics) = FontMetrics::parse(data) {
        let _ = metrics.string_width("Facture N° 1 €", 10.0);
        let _ = metrics.scale_to_1000(i32::from(metrics.ascender()));
    }
});
