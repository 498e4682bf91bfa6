//! Record codec
//!
//! The fixed 48-byte layout of one chain node, and its pure encode/decode.
//!
//! ## Record Layout (48 bytes)
//!
//! ```text
//! ┌────────┬───────────────┬──────┐
//! │ Offset │ Field         │ Size │
//! ├────────┼───────────────┼──────┤
//! │ 0      │ next_offset   │ 8    │
//! │ 8      │ hash          │ 4    │
//! │ 12     │ key_offset    │ 8    │
//! │ 20     │ key_length    │ 4    │
//! │ 24     │ data_offset   │ 8    │
//! │ 32     │ data_length   │ 4    │
//! │ 36     │ reserved      │ 12   │
//! └────────┴───────────────┴──────┘
//! ```
//!
//! All integers little-endian. Offset 0 is reserved as the null-offset
//! sentinel: the stream header always occupies it, so no record can ever
//! legitimately live there.

/// Size of one encoded record in bytes
pub const RECORD_SIZE: usize = 48;

/// Sentinel for "no record here" in any offset field
pub const NULL_OFFSET: u64 = 0;

// Field positions inside the 48-byte encoding; the store reads single
// fields at these offsets without materializing whole records
pub(crate) const NEXT_OFFSET_POS: usize = 0;
pub(crate) const HASH_POS: usize = 8;
pub(crate) const KEY_OFFSET_POS: usize = 12;
pub(crate) const KEY_LENGTH_POS: usize = 20;
pub(crate) const DATA_OFFSET_POS: usize = 24;
pub(crate) const DATA_LENGTH_POS: usize = 32;

/// One node of a bucket's collision chain
///
/// Lives either in a fixed directory head slot or appended in the log
/// region as an overflow record. The key and value bytes it points at are
/// stored out-of-line, addressed by `(offset, length)` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Record {
    /// Absolute stream offset of the next chain node, or [`NULL_OFFSET`]
    pub next_offset: u64,

    /// Full prehash of the owning key
    pub hash: u32,

    /// Absolute stream offset of the key bytes
    pub key_offset: u64,

    /// Length of the key bytes
    pub key_length: u32,

    /// Absolute stream offset of the encoded value bytes
    pub data_offset: u64,

    /// Length of the encoded value bytes
    pub data_length: u32,
}

impl Record {
    /// The all-zero sentinel marking an unoccupied bucket head slot
    pub const EMPTY: Record = Record {
        next_offset: NULL_OFFSET,
        hash: 0,
        key_offset: NULL_OFFSET,
        key_length: 0,
        data_offset: NULL_OFFSET,
        data_length: 0,
    };

    pub fn new(
        next_offset: u64,
        hash: u32,
        key_offset: u64,
        key_length: u32,
        data_offset: u64,
        data_length: u32,
    ) -> Self {
        Self {
            next_offset,
            hash,
            key_offset,
            key_length,
            data_offset,
            data_length,
        }
    }

    /// Whether this record is the empty sentinel
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Encode into exactly [`RECORD_SIZE`] bytes; reserved bytes are zero
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[NEXT_OFFSET_POS..NEXT_OFFSET_POS + 8].copy_from_slice(&self.next_offset.to_le_bytes());
        buf[HASH_POS..HASH_POS + 4].copy_from_slice(&self.hash.to_le_bytes());
        buf[KEY_OFFSET_POS..KEY_OFFSET_POS + 8].copy_from_slice(&self.key_offset.to_le_bytes());
        buf[KEY_LENGTH_POS..KEY_LENGTH_POS + 4].copy_from_slice(&self.key_length.to_le_bytes());
        buf[DATA_OFFSET_POS..DATA_OFFSET_POS + 8].copy_from_slice(&self.data_offset.to_le_bytes());
        buf[DATA_LENGTH_POS..DATA_LENGTH_POS + 4].copy_from_slice(&self.data_length.to_le_bytes());
        buf
    }

    /// Decode from exactly [`RECORD_SIZE`] bytes
    pub fn decode(buf: &[u8; RECORD_SIZE]) -> Self {
        // Slice bounds are fixed, so the try_into calls cannot fail
        Self {
            next_offset: u64::from_le_bytes(
                buf[NEXT_OFFSET_POS..NEXT_OFFSET_POS + 8].try_into().unwrap(),
            ),
            hash: u32::from_le_bytes(buf[HASH_POS..HASH_POS + 4].try_into().unwrap()),
            key_offset: u64::from_le_bytes(
                buf[KEY_OFFSET_POS..KEY_OFFSET_POS + 8].try_into().unwrap(),
            ),
            key_length: u32::from_le_bytes(
                buf[KEY_LENGTH_POS..KEY_LENGTH_POS + 4].try_into().unwrap(),
            ),
            data_offset: u64::from_le_bytes(
                buf[DATA_OFFSET_POS..DATA_OFFSET_POS + 8].try_into().unwrap(),
            ),
            data_length: u32::from_le_bytes(
                buf[DATA_LENGTH_POS..DATA_LENGTH_POS + 4].try_into().unwrap(),
            ),
        }
    }
}

/// Equality deliberately excludes `key_offset`/`key_length`: the only use
/// of record equality is detecting the all-zero empty sentinel, and the
/// remaining four fields are sufficient for that.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.next_offset == other.next_offset
            && self.hash == other.hash
            && self.data_offset == other.data_offset
            && self.data_length == other.data_length
    }
}

impl Eq for Record {}
