//! Tests for the value codec boundary
//!
//! These tests verify:
//! - The default bincode codec round-trips strings and structs
//! - Encoding is deterministic (the store's pair-containment check
//!   compares persisted bytes, so equal values must encode equally)
//! - Undecodable bytes surface as a codec error

use chainkv::{BincodeCodec, ChainError, ValueCodec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sensor {
    name: String,
    reading: f64,
    online: bool,
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_string_round_trip() {
    let codec = BincodeCodec::<String>::new();

    let bytes = codec.encode(&"payload".to_string()).unwrap();
    let decoded = codec.decode(&bytes).unwrap();

    assert_eq!(decoded, "payload");
}

#[test]
fn test_struct_round_trip() {
    let codec = BincodeCodec::<Sensor>::new();
    let sensor = Sensor {
        name: "boiler-3".to_string(),
        reading: 98.6,
        online: true,
    };

    let bytes = codec.encode(&sensor).unwrap();
    let decoded = codec.decode(&bytes).unwrap();

    assert_eq!(decoded, sensor);
}

#[test]
fn test_encoding_is_deterministic() {
    let codec = BincodeCodec::<String>::new();
    let value = "same value".to_string();

    assert_eq!(codec.encode(&value).unwrap(), codec.encode(&value).unwrap());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_truncated_bytes_fail_to_decode() {
    let codec = BincodeCodec::<String>::new();

    // A valid string encoding starts with an 8-byte length prefix
    let err = codec.decode(&[0xFF, 0xFF]).unwrap_err();

    assert!(matches!(err, ChainError::Codec(_)));
}

#[test]
fn test_garbage_bytes_fail_to_decode() {
    let codec = BincodeCodec::<Sensor>::new();

    let err = codec.decode(&[0x01]).unwrap_err();

    assert!(matches!(err, ChainError::Codec(_)));
}

// =============================================================================
// Codec Boundary Through the Store
// =============================================================================

#[test]
fn test_store_persists_struct_values_through_the_codec() {
    use chainkv::{ChainStore, StoreConfig};
    use std::io::Cursor;

    let mut store = ChainStore::create(
        Cursor::new(Vec::new()),
        BincodeCodec::<Sensor>::new(),
        StoreConfig::default(),
    )
    .unwrap();

    let sensor = Sensor {
        name: "boiler-3".to_string(),
        reading: 98.6,
        online: true,
    };
    store.add("boiler-3", &sensor).unwrap();

    let stored = store.get("boiler-3").unwrap();
    assert_eq!(stored, sensor);
    assert!(store.contains_pair("boiler-3", &sensor).unwrap());
}
