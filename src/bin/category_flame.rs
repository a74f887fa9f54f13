use sdr_category::{CategoryEncoder, EncoderConfig};

fn main() {
    let values = (0..10_000).map(|i| i.to_string()).collect::<Vec<_>>();

    let mut encoder = match CategoryEncoder::new(EncoderConfig::default()) {
        Ok(encoder) => encoder,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    for value in &values {
        encoder.encode(Some(value));
    }

    // Known categories only exercise the lookup path.
    for _ in 0..100 {
        for value in &values {
            encoder.encode(Some(value));
        }
    }

    println!(
        "{} categories, overlap threshold {}",
        encoder.registry().len(),
        encoder.overlap_threshold()
    );
}
