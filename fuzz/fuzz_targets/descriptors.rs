#![no_main]

use dicon::{DescriptorDocument, EmissionContext, GeneratorConfig, emit_container, emit_mocks};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary documents must produce output or a generation error, never a panic or a hang
    if let Ok(doc) = serde_json::from_slice::<DescriptorDocument>(data) {
        let mut ctx = EmissionContext::new(GeneratorConfig::default());
        if let Some(container) = &doc.container {
            let _ = emit_container(&mut ctx, &container.interface, &container.factories);
        }
        let _ = emit_mocks(&mut ctx, &doc.mocks);
    }
});
