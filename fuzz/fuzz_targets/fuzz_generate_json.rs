#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any JSON invoice either fails validation or yields a document. Never panics.
    if let Ok(invoice) = serde_json::from_slice::<facturx::Invoice>(data) {
        let _ = facturx::generate_xml_only(&invoice);
        let _ = facturx::generate(&invoice);
    }
});
