//! Persisted encoder state.
//!
//! The bit-usage ledger is not stored; it is re-derived from the
//! per-index bits on restore. The overlap threshold is stored, and raised
//! on restore to the largest overlap the stored representations exhibit.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::allocator::max_pairwise_overlap;
use crate::config::EncoderConfig;
use crate::encoder::CategoryEncoder;
use crate::error::{Error, Result};
use crate::ledger::BitUsageLedger;
use crate::registry::{CategoryIndexRegistry, NOT_DEFINED};
use crate::store::RepresentationStore;

/// One `key -> value` record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<K, V> {
    /// Record key.
    pub key: K,
    /// Record value.
    pub value: V,
}

/// Serializable state of a [`CategoryEncoder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<C> {
    /// Active bits per representation.
    pub w: usize,
    /// Total bits.
    pub n: usize,
    /// Debug label.
    pub name: String,
    /// Diagnostics level.
    pub verbosity: u8,
    /// Seed the encoder was configured with.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Threshold reached when the snapshot was taken.
    #[serde(default)]
    pub overlap_threshold: Option<usize>,
    /// Category value -> index.
    pub bucket_index_map: Vec<Entry<C, usize>>,
    /// Index -> allocated bits.
    pub bucket_map: Vec<Entry<usize, Vec<usize>>>,
}

impl<C> Snapshot<C> {
    fn config(&self) -> EncoderConfig {
        EncoderConfig {
            w: self.w,
            n: self.n,
            name: self.name.clone(),
            seed: self.seed,
            verbosity: self.verbosity,
        }
    }
}

impl<C> CategoryEncoder<C>
where
    C: Eq + Hash + Clone + fmt::Debug,
{
    /// Capture the current state.
    pub fn snapshot(&self) -> Snapshot<C> {
        let config = self.config();
        Snapshot {
            w: config.w,
            n: config.n,
            name: config.name.clone(),
            verbosity: config.verbosity,
            seed: config.seed,
            overlap_threshold: Some(self.overlap_threshold()),
            bucket_index_map: self
                .registry()
                .entries()
                .into_iter()
                .map(|(key, value)| Entry {
                    key: key.clone(),
                    value,
                })
                .collect(),
            bucket_map: self
                .store()
                .iter()
                .map(|(key, bits)| Entry {
                    key,
                    value: bits.to_vec(),
                })
                .collect(),
        }
    }

    /// Rebuild an encoder from `snapshot`.
    ///
    /// Indices present in the snapshot are treated as already allocated.
    ///
    /// # Errors
    /// Returns a configuration error for invalid `w`/`n`, and
    /// `Error::InvalidSnapshot` if the index map is not a bijection onto
    /// non-zero indices, a representation belongs to no category or is not
    /// `w` distinct bits below `n`, or the threshold exceeds `w`.
    pub fn restore(snapshot: Snapshot<C>) -> Result<Self> {
        let config = snapshot.config();
        config.validate()?;

        let registered: HashSet<usize> = snapshot
            .bucket_index_map
            .iter()
            .map(|entry| entry.value)
            .collect();
        let registry = CategoryIndexRegistry::from_entries(
            snapshot
                .bucket_index_map
                .into_iter()
                .map(|entry| (entry.key, entry.value)),
        )
        .ok_or_else(|| {
            Error::InvalidSnapshot("bucket index map is not a bijection onto 1..".to_string())
        })?;

        let mut store = RepresentationStore::new();
        for Entry { key, value: bits } in snapshot.bucket_map {
            // An orphaned index would be handed to the next new value along
            // with bits it never earned.
            if key != NOT_DEFINED && !registered.contains(&key) {
                return Err(Error::InvalidSnapshot(format!(
                    "index {key} has bits but no category"
                )));
            }
            validate_bits(key, &bits, config.w, config.n)?;
            if !store.insert(key, bits) {
                return Err(Error::InvalidSnapshot(format!("index {key} stored twice")));
            }
        }

        if let Some(threshold) = snapshot.overlap_threshold {
            if threshold > config.w {
                return Err(Error::InvalidSnapshot(format!(
                    "overlap threshold {threshold} exceeds w = {}",
                    config.w
                )));
            }
        }
        // The stored bits are authoritative: the threshold never sits below
        // the overlap they already exhibit.
        let ledger = BitUsageLedger::from_representations(config.n, store.iter());
        let observed = max_pairwise_overlap(&ledger, store.iter());
        let overlap_threshold = snapshot.overlap_threshold.unwrap_or(0).max(observed);

        Ok(Self::from_parts(config, registry, store, overlap_threshold))
    }
}

impl<C> CategoryEncoder<C>
where
    C: Eq + Hash + Clone + fmt::Debug + Serialize + DeserializeOwned,
{
    /// Write the snapshot as JSON.
    ///
    /// # Errors
    /// Returns `Error::Json` if serialization fails and `Error::Io` if the
    /// writer does.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let bytes = serde_json::to_vec(&self.snapshot())?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a JSON snapshot and restore from it.
    ///
    /// # Errors
    /// Returns `Error::Io` if the reader fails, `Error::Json` for malformed
    /// input, and any error from [`CategoryEncoder::restore`].
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let snapshot: Snapshot<C> = serde_json::from_slice(&bytes)?;
        Self::restore(snapshot)
    }
}

fn validate_bits(index: usize, bits: &[usize], w: usize, n: usize) -> Result<()> {
    if bits.len() != w {
        return Err(Error::InvalidSnapshot(format!(
            "index {index} has {} bits, expected {w}",
            bits.len()
        )));
    }
    if let Some(&bit) = bits.iter().find(|&&bit| bit >= n) {
        return Err(Error::InvalidSnapshot(format!(
            "index {index} uses bit {bit} outside 0..{n}"
        )));
    }
    let distinct: HashSet<usize> = bits.iter().copied().collect();
    if distinct.len() != w {
        return Err(Error::InvalidSnapshot(format!("index {index} repeats a bit")));
    }
    Ok(())
}
