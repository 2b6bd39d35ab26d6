//! This module provides deterministic hashing helpers and a `HashMap` alias that uses a
//! deterministic hasher. The hashing data structures in the standard library are not
//! deterministic:
//!
//! > By default, HashMap uses a hashing algorithm selected to provide
//! > resistance against HashDoS attacks. The algorithm is randomly seeded, and a
//! > reasonable best-effort is made to generate this seed from a high quality,
//! > secure source of randomness provided by the host without blocking the program.
//!
//! Use `HashMap::default()` to create a new map with the deterministic hasher.
//!
//! The `hash_str` and `hash_words` free functions are used by the random stream partitioner in
//! `crate::random` to derive substream seeds.

use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

pub use rustc_hash::FxHashMap as HashMap;

/// A convenience method to compute the hash of a `&str`.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Hashes a sequence of `u64` words under the given seed. The words are hashed as their
/// little-endian bytes so the result does not depend on the host's endianness.
pub fn hash_words(seed: u64, words: &[u64]) -> u64 {
    let mut bytes = Vec::with_capacity(words.len() * 8);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    xxh3_64_with_seed(&bytes, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings() {
        let a = hash_str("hello");
        let b = hash_str("hello");
        let c = hash_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn word_order_matters() {
        assert_eq!(hash_words(7, &[1, 2]), hash_words(7, &[1, 2]));
        assert_ne!(hash_words(7, &[1, 2]), hash_words(7, &[2, 1]));
        assert_ne!(hash_words(7, &[1, 2]), hash_words(8, &[1, 2]));
    }
}
