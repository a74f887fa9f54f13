//! Category value -> dense bit vector.

use std::fmt::{self, Write as _};
use std::hash::Hash;

use bitvec::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::allocator::{overlap, RepresentationAllocator};
use crate::config::EncoderConfig;
use crate::error::{Error, Result};
use crate::ledger::BitUsageLedger;
use crate::registry::{CategoryIndexRegistry, NOT_DEFINED};
use crate::store::RepresentationStore;

/// Dense output of an encode: `n` bits, `w` of them set.
pub type Sdr = BitVec<u64, Lsb0>;

/// Encodes category values as sparse distributed representations.
///
/// Every distinct value gets `w` of `n` bits, allocated on first sight and
/// fixed from then on. Encoding reads and then writes allocation state, so
/// callers sharing one instance must serialize access (e.g. a `Mutex`).
#[derive(Clone, Debug)]
pub struct CategoryEncoder<C = String> {
    config: EncoderConfig,
    registry: CategoryIndexRegistry<C>,
    store: RepresentationStore,
    allocator: RepresentationAllocator,
    ledger: BitUsageLedger,
}

impl<C> CategoryEncoder<C>
where
    C: Eq + Hash + Clone + fmt::Debug,
{
    /// Create an encoder from validated parameters.
    ///
    /// # Errors
    /// Returns the configuration error from [`EncoderConfig::validate`].
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let encoder = Self {
            allocator: RepresentationAllocator::new(config.w, config.n),
            ledger: BitUsageLedger::new(config.n),
            registry: CategoryIndexRegistry::new(),
            store: RepresentationStore::new(),
            config,
        };
        if encoder.config.verbosity > 0 {
            info!("{}", encoder.dump());
        }
        Ok(encoder)
    }

    /// Shorthand for `new(EncoderConfig::new(w, n))`.
    pub fn with_params(w: usize, n: usize) -> Result<Self> {
        Self::new(EncoderConfig::new(w, n))
    }

    /// Assemble an encoder from restored parts. The ledger is re-derived
    /// from `store`.
    pub(crate) fn from_parts(
        config: EncoderConfig,
        registry: CategoryIndexRegistry<C>,
        store: RepresentationStore,
        overlap_threshold: usize,
    ) -> Self {
        let ledger = BitUsageLedger::from_representations(config.n, store.iter());
        let encoder = Self {
            allocator: RepresentationAllocator::with_threshold(
                config.w,
                config.n,
                overlap_threshold,
            ),
            ledger,
            registry,
            store,
            config,
        };
        if encoder.config.verbosity > 0 {
            info!("restored {}", encoder.dump());
        }
        encoder
    }

    /// Construction parameters.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Output width `n`.
    pub fn width(&self) -> usize {
        self.config.n
    }

    /// `[(name, 0)]`: one field starting at bit offset 0.
    pub fn description(&self) -> Vec<(&str, usize)> {
        vec![(self.config.name.as_str(), 0)]
    }

    /// Current overlap threshold.
    pub fn overlap_threshold(&self) -> usize {
        self.allocator.overlap_threshold()
    }

    /// Bit usage, for diagnostics.
    pub fn ledger(&self) -> &BitUsageLedger {
        &self.ledger
    }

    /// Value -> index mapping.
    pub fn registry(&self) -> &CategoryIndexRegistry<C> {
        &self.registry
    }

    /// Index -> bits mapping.
    pub fn store(&self) -> &RepresentationStore {
        &self.store
    }

    /// Index for `value`, registering it if new.
    ///
    /// Missing values map to `None`. Once the overlap threshold has reached
    /// `w`, unseen values are routed to [`NOT_DEFINED`] instead of getting a
    /// fresh index.
    pub fn bucket_indices(&mut self, value: Option<&C>) -> Option<usize> {
        let value = value?;
        if let Some(index) = self.registry.get(value) {
            return Some(index);
        }
        if self.allocator.is_saturated() {
            if self.config.verbosity > 0 {
                warn!(
                    encoder = %self.config.name,
                    category = ?value,
                    threshold = self.allocator.overlap_threshold(),
                    "overlap threshold saturated, routing to not-defined bucket"
                );
            }
            return Some(NOT_DEFINED);
        }
        let index = self.registry.index_for(Some(value));
        if self.config.verbosity >= 2 {
            debug!(encoder = %self.config.name, category = ?value, ?index, "created new index");
        }
        index
    }

    /// Bits for `index`, allocating them on first request.
    pub fn bits_for_index(&mut self, index: usize) -> &[usize] {
        let Self {
            config,
            store,
            allocator,
            ledger,
            ..
        } = self;
        store.get_or_allocate(index, |index| {
            let before = allocator.overlap_threshold();
            let bits = allocator.allocate(index, ledger);
            let after = allocator.overlap_threshold();
            if config.verbosity >= 2 {
                debug!(encoder = %config.name, index, ?bits, "allocated representation");
            }
            if after > before && config.verbosity > 0 {
                debug!(
                    encoder = %config.name,
                    index,
                    from = before,
                    to = after,
                    "raised overlap threshold"
                );
            }
            bits
        })
    }

    /// Encode `value` into `output`, which is cleared first.
    ///
    /// # Errors
    /// Returns `Error::OutputLength` if `output` is not exactly `n` bits.
    pub fn encode_into(
        &mut self,
        value: Option<&C>,
        output: &mut BitSlice<u64, Lsb0>,
    ) -> Result<()> {
        if output.len() != self.config.n {
            return Err(Error::OutputLength {
                expected: self.config.n,
                actual: output.len(),
            });
        }
        output.fill(false);
        self.render(value, output);
        Ok(())
    }

    /// Encode `value` into a fresh `n`-bit vector. `None` is all zeros.
    pub fn encode(&mut self, value: Option<&C>) -> Sdr {
        let mut output = bitvec![u64, Lsb0; 0; self.config.n];
        self.render(value, &mut output);
        output
    }

    /// Set the bits for `value` in a zeroed `n`-bit `output`.
    fn render(&mut self, value: Option<&C>, output: &mut BitSlice<u64, Lsb0>) {
        let Some(index) = self.bucket_indices(value) else {
            return;
        };
        if self.config.verbosity >= 2 {
            debug!(encoder = %self.config.name, category = ?value, index, "encoding");
        }
        for &bit in self.bits_for_index(index) {
            output.set(bit, true);
        }
    }

    /// Shared bits between two allocated indices.
    pub fn overlap(&self, i: usize, j: usize) -> Option<usize> {
        Some(overlap(self.store.get(i)?, self.store.get(j)?))
    }

    /// Whether two allocated indices overlap by no more than the threshold.
    pub fn overlap_ok(&self, i: usize, j: usize) -> bool {
        self.overlap(i, j)
            .is_some_and(|o| o <= self.allocator.overlap_threshold())
    }

    /// Lowest allocated index.
    pub fn min_index(&self) -> Option<usize> {
        self.store.index_range().map(|(min, _)| min)
    }

    /// Highest allocated index.
    pub fn max_index(&self) -> Option<usize> {
        self.store.index_range().map(|(_, max)| max)
    }

    /// Human-readable configuration; includes every bucket when
    /// verbosity is above 2.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CategoryEncoder:");
        let _ = writeln!(out, "  w:          {}", self.config.w);
        let _ = writeln!(out, "  n:          {}", self.width());
        let _ = writeln!(out, "  name:       {}", self.config.name);
        let _ = writeln!(out, "  threshold:  {}", self.overlap_threshold());
        if self.config.verbosity > 2 {
            let _ = writeln!(out, "  All buckets:");
            for (index, bits) in self.store.iter() {
                let _ = writeln!(out, "    {index}: {bits:?}");
            }
        }
        out
    }
}

impl CategoryEncoder<String> {
    /// Encode a dynamically typed value: `null` is missing, a string is a
    /// category.
    ///
    /// # Errors
    /// Returns `Error::UnexpectedType` for any other JSON type.
    pub fn encode_json(&mut self, value: &Value) -> Result<Sdr> {
        match value {
            Value::Null => Ok(self.encode(None)),
            Value::String(s) => Ok(self.encode(Some(s))),
            Value::Bool(_) => Err(Error::UnexpectedType("bool")),
            Value::Number(_) => Err(Error::UnexpectedType("number")),
            Value::Array(_) => Err(Error::UnexpectedType("array")),
            Value::Object(_) => Err(Error::UnexpectedType("object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoder(w: usize, n: usize) -> CategoryEncoder {
        CategoryEncoder::new(EncoderConfig::new(w, n).with_name("encoder")).unwrap()
    }

    #[test]
    fn test_encoding_width_and_cardinality() {
        let mut encoder = encoder(11, 200);
        let sdr = encoder.encode(Some(&"T0".to_string()));
        assert_eq!(sdr.len(), 200);
        assert_eq!(sdr.count_ones(), 11);
        assert_eq!(encoder.width(), 200);
        assert_eq!(encoder.description(), vec![("encoder", 0)]);
    }

    #[test]
    fn test_same_value_same_bits() {
        let mut encoder = encoder(11, 200);
        let a = encoder.encode(Some(&"cat".to_string()));
        let _ = encoder.encode(Some(&"dog".to_string()));
        let b = encoder.encode(Some(&"cat".to_string()));
        assert_eq!(a, b);
        assert_eq!(encoder.store().len(), 2);
    }

    #[test]
    fn test_missing_value_is_all_zeros() {
        let mut encoder = encoder(11, 200);
        let sdr = encoder.encode(None);
        assert_eq!(sdr.len(), 200);
        assert!(sdr.not_any());
        assert!(encoder.registry().is_empty());
        assert!(encoder.store().is_empty());
    }

    #[test]
    fn test_encode_into_clears_and_checks_length() {
        let mut encoder = encoder(11, 200);
        let mut out = bitvec![u64, Lsb0; 1; 200];
        encoder.encode_into(None, &mut out).unwrap();
        assert!(out.not_any());

        let mut short = bitvec![u64, Lsb0; 0; 199];
        let err = encoder.encode_into(Some(&"x".to_string()), &mut short).unwrap_err();
        assert!(matches!(
            err,
            Error::OutputLength {
                expected: 200,
                actual: 199
            }
        ));
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            CategoryEncoder::<String>::with_params(4, 400),
            Err(Error::InvalidWidth { w: 4 })
        ));
        assert!(CategoryEncoder::<String>::with_params(10, 50).is_err());
        assert!(matches!(
            CategoryEncoder::<String>::with_params(11, 66),
            Err(Error::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_encode_json_types() {
        let mut encoder = encoder(11, 200);
        assert_eq!(encoder.encode_json(&json!("a")).unwrap().count_ones(), 11);
        assert!(encoder.encode_json(&json!(null)).unwrap().not_any());
        assert!(matches!(
            encoder.encode_json(&json!(3)),
            Err(Error::UnexpectedType("number"))
        ));
        assert!(matches!(
            encoder.encode_json(&json!(["a"])),
            Err(Error::UnexpectedType("array"))
        ));
        assert_eq!(encoder.registry().len(), 1);
    }

    #[test]
    fn test_saturated_values_route_to_not_defined() {
        let mut encoder = encoder(3, 19);
        // Drive the threshold all the way to w through direct allocation.
        let mut index = 1;
        while encoder.overlap_threshold() < 3 {
            encoder.bits_for_index(index);
            index += 1;
        }
        let before = encoder.registry().len();
        let sdr = encoder.encode(Some(&"late".to_string()));
        assert_eq!(sdr.count_ones(), 3);
        assert_eq!(encoder.registry().len(), before);
        assert_eq!(encoder.bucket_indices(Some(&"late".to_string())), Some(NOT_DEFINED));
        assert!(encoder.store().contains(NOT_DEFINED));
    }

    #[test]
    fn test_overlap_diagnostics() {
        let mut encoder = encoder(3, 19);
        for i in 0..10 {
            encoder.encode(Some(&format!("c{i}")));
        }
        assert_eq!(encoder.min_index(), Some(1));
        assert_eq!(encoder.max_index(), Some(10));
        assert_eq!(encoder.overlap(1, 2), Some(0));
        assert_eq!(encoder.overlap(1, 99), None);
        assert!(encoder.overlap_ok(1, 10));
        assert!(!encoder.overlap_ok(1, 99));
    }

    #[test]
    fn test_dump_lists_buckets_at_high_verbosity() {
        let mut quiet = encoder(3, 19);
        quiet.encode(Some(&"a".to_string()));
        assert!(!quiet.dump().contains("All buckets"));

        let mut loud: CategoryEncoder =
            CategoryEncoder::new(EncoderConfig::new(3, 19).with_verbosity(3)).unwrap();
        loud.encode(Some(&"a".to_string()));
        let dump = loud.dump();
        assert!(dump.contains("All buckets"));
        assert!(dump.contains("1: [0, 1, 2]"));
    }
}
