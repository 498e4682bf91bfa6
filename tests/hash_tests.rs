//! Tests for the stable truncated hash
//!
//! These tests verify:
//! - Known hash values stay pinned across releases
//! - Length clamping never reads past the input
//! - Prefix truncation collides exactly as designed
//! - Bucket routing stays within range

use chainkv::hash::{hash_bucket, hash_bucket_bytes, prehash, prehash_bytes};
use chainkv::ChainError;

// =============================================================================
// Pinned Values
// =============================================================================

#[test]
fn test_prehash_generates_expected_hash() {
    let hash = prehash("hello", 3).unwrap();

    assert_eq!(hash, 193_493_694);
}

#[test]
fn test_prehash_bytes_matches_string_overload() {
    assert_eq!(prehash_bytes(b"hello", 3), prehash("hello", 3).unwrap());
    assert_eq!(prehash_bytes(b"hello", -1), prehash("hello", -1).unwrap());
}

#[test]
fn test_prehash_bytes_empty_input_hashes_to_seed() {
    assert_eq!(prehash_bytes(&[], 3), 5381);
    assert_eq!(prehash_bytes(&[], -1), 5381);
}

// =============================================================================
// Length Clamping
// =============================================================================

#[test]
fn test_prehash_does_not_overrun_input_length() {
    let full = prehash("hello", 5).unwrap();
    assert_eq!(full, 261_238_937);

    assert_eq!(prehash("hello", 6).unwrap(), full);
    assert_eq!(prehash("hello", 15).unwrap(), full);
    assert_eq!(prehash("hello", 100).unwrap(), full);
}

#[test]
fn test_prehash_negative_length_hashes_whole_input() {
    assert_eq!(prehash("hello", -1).unwrap(), prehash("hello", 5).unwrap());
}

// =============================================================================
// Collision Behavior
// =============================================================================

#[test]
fn test_prehash_differs_for_different_prefixes() {
    let hash1 = prehash("hello", 3).unwrap();
    let hash2 = prehash("jimmy", 3).unwrap();

    assert_ne!(hash1, hash2);
}

#[test]
fn test_prehash_collides_for_shared_prefix() {
    // "hel" is the only part that gets hashed, so these collide on purpose
    let hash1 = prehash("hello", 3).unwrap();
    let hash2 = prehash("help", 3).unwrap();

    assert_eq!(hash1, hash2);
}

// =============================================================================
// Bucket Routing
// =============================================================================

#[test]
fn test_hash_bucket_returns_expected_bucket() {
    let buckets = 10;

    let (_, bucket) = hash_bucket("hello", 3, buckets).unwrap();
    assert!(bucket < buckets);
    assert_eq!(bucket, 4);

    let (_, bucket) = hash_bucket("jimmy", 3, buckets).unwrap();
    assert!(bucket < buckets);
    assert_eq!(bucket, 5);
}

#[test]
fn test_hash_bucket_bytes_routes_like_string_overload() {
    let (hash, bucket) = hash_bucket_bytes(b"hello", 3, 10);
    let (expected_hash, expected_bucket) = hash_bucket("hello", 3, 10).unwrap();

    assert_eq!(hash, expected_hash);
    assert_eq!(bucket, expected_bucket);
}

// =============================================================================
// Argument Validation
// =============================================================================

#[test]
fn test_prehash_rejects_empty_string() {
    let err = prehash("", 3).unwrap_err();

    assert!(matches!(err, ChainError::InvalidArgument(_)));
}

#[test]
fn test_hash_bucket_rejects_empty_string() {
    let err = hash_bucket("", 3, 10).unwrap_err();

    assert!(matches!(err, ChainError::InvalidArgument(_)));
}
