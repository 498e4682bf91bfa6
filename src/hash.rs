//! Stable truncated hash
//!
//! A deterministic DJB2-style rolling hash over the leading bytes of a key,
//! plus bucket routing. The hash must never change between releases: it is
//! persisted in every on-disk record and drives bucket placement, so a
//! different hash function would silently orphan existing data.

use crate::error::{ChainError, Result};

/// DJB2 seed
const SEED: u32 = 5381;

/// Hash the first `length` bytes of a key string.
///
/// `length` is clamped to the input's byte length; a negative value hashes
/// the whole input. Hashing only a short prefix keeps routing cheap for
/// short keys; full-key equality is verified separately wherever the hash
/// is used for lookup.
///
/// Fails with `InvalidArgument` if `value` is empty.
pub fn prehash(value: &str, length: i32) -> Result<u32> {
    if value.is_empty() {
        return Err(ChainError::InvalidArgument(
            "key cannot be empty".to_string(),
        ));
    }

    Ok(prehash_bytes(value.as_bytes(), length))
}

/// Hash the first `length` bytes of a byte slice.
///
/// Same rolling hash as [`prehash`], but infallible: an empty slice simply
/// hashes to the seed.
pub fn prehash_bytes(data: &[u8], length: i32) -> u32 {
    // Negative lengths (the -1 "whole input" convention) and over-long
    // lengths clamp to the input's natural length; no out-of-bounds reads.
    let length = if length < 0 || length as usize > data.len() {
        data.len()
    } else {
        length as usize
    };

    let mut hash = SEED;
    for &byte in &data[..length] {
        // hash * 33 + byte, with unsigned 32-bit wraparound
        hash = hash
            .wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(u32::from(byte));
    }

    hash
}

/// Hash a key string and route it to a bucket.
///
/// Returns the full prehash and `hash % bucket_count`. Callers must
/// guarantee `bucket_count >= 1`; the store validates this at construction
/// time so routing never divides by zero.
pub fn hash_bucket(value: &str, length: i32, bucket_count: u32) -> Result<(u32, u32)> {
    let hash = prehash(value, length)?;
    Ok((hash, hash % bucket_count))
}

/// Hash a byte-slice key and route it to a bucket.
pub fn hash_bucket_bytes(data: &[u8], length: i32, bucket_count: u32) -> (u32, u32) {
    let hash = prehash_bytes(data, length);
    (hash, hash % bucket_count)
}
