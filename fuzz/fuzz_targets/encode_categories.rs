#![no_main]
use libfuzzer_sys::fuzz_target;
use sdr_category::{CategoryEncoder, EncoderConfig};

fuzz_target!(|data: (u8, Vec<Option<u8>>)| {
    let (shape, values) = data;
    let w = 2 * (shape as usize % 5) + 1; // 1 to 9 bits
    let n = 6 * w + 1 + (shape as usize / 5) % 32;

    let mut encoder: CategoryEncoder<u8> = match CategoryEncoder::new(EncoderConfig::new(w, n)) {
        Ok(encoder) => encoder,
        Err(_) => return,
    };

    let mut first = std::collections::HashMap::new();
    for value in &values {
        let sdr = encoder.encode(value.as_ref());
        assert_eq!(sdr.len(), n);
        match value {
            Some(v) => {
                assert_eq!(sdr.count_ones(), w);
                let expected = first.entry(*v).or_insert_with(|| sdr.clone());
                assert_eq!(*expected, sdr);
            }
            None => assert!(sdr.not_any()),
        }
    }

    let total: usize = encoder.ledger().usage_counts().sum();
    assert_eq!(total, w * encoder.store().len());
});
