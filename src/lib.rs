//! # Category SDR Encoder
//!
//! *Sparse, fixed-width binary codes for categorical values with bounded
//! accidental overlap.*
//!
//! ## Intuition First
//!
//! Give every category a handful of lamps to switch on in a long row of
//! lamps. Two categories that light many of the same lamps look alike to
//! anything downstream that compares rows by counting shared lit lamps. So
//! when a new category arrives, hand it lamps that few others already use,
//! and never let it share more than a few lamps with any single existing
//! category. When that promise can no longer be kept, loosen it by one lamp
//! and carry on.
//!
//! ## The Problem
//!
//! Pattern matchers built on sparse distributed representations (SDRs)
//! measure similarity as bit overlap. Categories carry no natural order, so
//! their codes should be mutually dissimilar:
//! - **One-hot codes** are perfectly separated but need one bit per
//!   category and are not sparse-distributed.
//! - **Random `w`-of-`n` codes** scale, but nothing stops two of them from
//!   colliding heavily.
//!
//! This crate allocates codes greedily against a bit-usage ledger, keeping
//! pairwise overlap under an explicit threshold that only rises when the
//! universe is genuinely crowded.
//!
//! ## Mathematical Formulation
//!
//! Each category `c` receives a set `R(c) ⊂ {0, .., n-1}` with `|R(c)| = w`.
//! The allocator maintains a threshold `T` and guarantees, for the category
//! `c2` allocated after `c1`,
//!
//! ```text
//! |R(c1) ∩ R(c2)| <= T(c2)
//! ```
//!
//! where `T(c2)` is the threshold once `c2`'s allocation finished. `T` is
//! non-decreasing, so the bound also holds against the current threshold.
//!
//! ## Complexity Analysis
//!
//! - **Time**: `O(n log n + w · n · u)` per new category, where `u` is the
//!   mean number of categories per bit; lookups of known categories are a
//!   hash probe.
//! - **Space**: `O(k · w)` for `k` categories, held twice (per category and
//!   per bit).
//!
//! ## Failure Modes
//!
//! 1. **Threshold creep**: with many categories relative to `n / w`, `T`
//!    rises and codes become more similar.
//! 2. **Saturation**: once `T` reaches `w`, unseen values all share the
//!    reserved not-defined code.
//!
//! ## Implementation Notes
//!
//! - [`BitUsageLedger`]: which categories use each bit.
//! - [`CategoryIndexRegistry`]: value to stable index, index 0 reserved.
//! - [`RepresentationAllocator`]: the greedy search and the threshold.
//! - [`RepresentationStore`]: index to bits, allocated once.
//! - [`CategoryEncoder`]: the public entry point, plus JSON [`Snapshot`]s.
//!
//! Bit selection is deterministic; no random generator is consulted.
//!
//! ## References
//!
//! - Hawkins, J., Ahmad, S. (2016). "Why Neurons Have Thousands of Synapses,
//!   a Theory of Sequence Memory in Neocortex."
//! - Ahmad, S., Hawkins, J. (2015). "Properties of Sparse Distributed
//!   Representations and their Application to Hierarchical Temporal Memory."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod config;
pub mod encoder;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use allocator::RepresentationAllocator;
pub use config::EncoderConfig;
pub use encoder::{CategoryEncoder, Sdr};
pub use error::Error;
pub use ledger::BitUsageLedger;
pub use registry::{CategoryIndexRegistry, NOT_DEFINED};
pub use snapshot::Snapshot;
pub use store::RepresentationStore;
