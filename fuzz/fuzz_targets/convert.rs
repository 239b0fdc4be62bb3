#![no_main]

use libfuzzer_sys::fuzz_target;
use reflectgrid::numeric::parse_decimal;
use reflectgrid::{NumericKind, TypeConverterRegistry, TypeKey};

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        let registry = TypeConverterRegistry::new();
        for key in [TypeKey::Bool, TypeKey::Char, TypeKey::Number] {
            let _ = registry.from_string(key, s);
        }
        for kind in NumericKind::ALL {
            // Anything that parses must render again
            if let Ok(value) = registry.from_string(TypeKey::Numeric(kind), s) {
                let _ = registry.to_string(TypeKey::Numeric(kind), &value);
            }
        }
        let _ = parse_decimal(s);
    }
});
