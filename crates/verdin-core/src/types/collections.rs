//! Hash collections used across Verdin crates.
//! FxHash is a non-cryptographic hasher; keys here are short identifier
//! strings, never attacker-controlled data structures.

pub use rustc_hash::{FxHashMap, FxHashSet};
