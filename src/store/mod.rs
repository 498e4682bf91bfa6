//! Store Module
//!
//! The hash index engine: bucket routing, chain traversal and splicing,
//! and the append-only allocation policy over one backing stream.
//!
//! ## Responsibilities
//! - Persist the fixed header (count, bucket count, prehash length) and
//!   the bucket directory at the front of the stream
//! - Route keys to buckets and walk/splice collision chains
//! - Append overflow records and key/value byte runs at the end of stream
//! - Keep the persisted entry count in sync on every insert/removal
//!
//! ## Allocation Policy
//! The header and directory never move. Everything else is appended at the
//! current end of stream and never rewritten in place except for record
//! field updates (chain links, value metadata). Removals and value
//! overwrites orphan their old byte runs; nothing reclaims them short of a
//! full [`ChainStore::clear`].

mod iter;

pub use iter::{Keys, Pairs, Values};

use std::io::{Read, Seek, SeekFrom, Write};

use crate::codec::ValueCodec;
use crate::config::StoreConfig;
use crate::error::{ChainError, Result};
use crate::hash;
use crate::record::{self, Record, NULL_OFFSET, RECORD_SIZE};
use crate::stream::BackingStream;

// =============================================================================
// Header Layout Constants
// =============================================================================

/// Header field offsets: count, bucket count, prehash length
const COUNT_OFFSET: usize = 0;
const BUCKET_COUNT_OFFSET: usize = 4;
const PREHASH_LENGTH_OFFSET: usize = 8;

/// Total header size: three little-endian 32-bit fields
pub const HEADER_SIZE: u64 = 12;

// =============================================================================
// ChainStore
// =============================================================================

/// A disk-backed hash table with separate chaining inside one stream
///
/// Generic over the backing medium `S` (file or in-memory buffer) and the
/// value codec `C`. The store exclusively owns its stream; every operation
/// is synchronous, blocking, and single-threaded. Wrap the store in a lock
/// if it must be shared across threads.
#[derive(Debug)]
pub struct ChainStore<S, C> {
    /// The backing medium, exclusively owned until close/into_stream
    stream: S,

    /// Encodes and decodes values; persisted bytes are opaque to the engine
    codec: C,

    /// Number of directory head slots, immutable after creation
    bucket_count: u32,

    /// Leading key bytes fed to the routing prehash, immutable after creation
    prehash_length: i32,

    /// Live entry count, mirrored to the header on every change
    count: u32,

    /// Mutating operations are rejected when set
    read_only: bool,
}

impl<S, C> ChainStore<S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a fresh store over an empty stream
    ///
    /// Writes the header and a zeroed bucket directory immediately. Fails
    /// with `InvalidArgument` if the stream is not empty or the configured
    /// bucket count is zero.
    pub fn create(stream: S, codec: C, config: StoreConfig) -> Result<Self> {
        if config.bucket_count == 0 {
            return Err(ChainError::InvalidArgument(
                "bucket count must be at least 1".to_string(),
            ));
        }

        let mut store = Self {
            stream,
            codec,
            bucket_count: config.bucket_count,
            prehash_length: config.prehash_length,
            count: 0,
            read_only: config.read_only,
        };

        if store.stream.stream_len()? != 0 {
            return Err(ChainError::InvalidArgument(
                "expected an empty stream".to_string(),
            ));
        }

        store.initialize_stream()?;

        tracing::debug!(
            "created store: {} buckets, prehash length {}",
            store.bucket_count,
            store.prehash_length
        );

        Ok(store)
    }

    /// Open a store over an existing stream, allowing mutation
    ///
    /// Reads the header back and validates it against the stream's actual
    /// size; fails with `InvalidFormat` on a short stream or a header that
    /// reports zero buckets.
    pub fn open(stream: S, codec: C) -> Result<Self> {
        Self::open_with(stream, codec, false)
    }

    /// Open a store over an existing stream, rejecting every mutation
    pub fn open_read_only(stream: S, codec: C) -> Result<Self> {
        Self::open_with(stream, codec, true)
    }

    fn open_with(stream: S, codec: C, read_only: bool) -> Result<Self> {
        let mut store = Self {
            stream,
            codec,
            bucket_count: 0,
            prehash_length: 0,
            count: 0,
            read_only,
        };

        let actual_len = store.stream.stream_len()?;
        if actual_len < HEADER_SIZE {
            return Err(ChainError::InvalidFormat(format!(
                "stream too short to hold a header: {} bytes",
                actual_len
            )));
        }

        let (count, bucket_count, prehash_length) = store.read_header()?;
        store.count = count;
        store.bucket_count = bucket_count;
        store.prehash_length = prehash_length;

        if store.bucket_count == 0 {
            return Err(ChainError::InvalidFormat(
                "header reports zero buckets".to_string(),
            ));
        }

        let min_len = store.min_stream_len();
        if actual_len < min_len {
            return Err(ChainError::InvalidFormat(format!(
                "invalid stream size: expected at least {} bytes, got {}",
                min_len, actual_len
            )));
        }

        tracing::debug!(
            "opened store: {} entries, {} buckets, prehash length {}",
            store.count,
            store.bucket_count,
            store.prehash_length
        );

        Ok(store)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Whether the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of directory head slots
    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Leading key bytes fed to the routing prehash
    pub fn prehash_length(&self) -> i32 {
        self.prehash_length
    }

    /// Whether mutating operations are rejected
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Insert a new entry; the key must not already be present
    ///
    /// An empty bucket takes the new record directly in its head slot with
    /// the key/value bytes appended at the end of stream; a non-empty bucket
    /// gets the whole node appended and the former chain tail relinked to
    /// it. The persisted count is incremented synchronously.
    pub fn add(&mut self, key: &str, value: &C::Value) -> Result<()> {
        Self::ensure_key(key)?;
        self.ensure_writable()?;

        let (key_hash, bucket) = hash::hash_bucket(key, self.prehash_length, self.bucket_count)?;
        let head_offset = self.bucket_offset(bucket);

        if !self.read_record(head_offset)?.is_empty() && self.find_key(key)?.is_some() {
            return Err(ChainError::DuplicateKey(key.to_string()));
        }

        // Encode up front so a codec failure leaves the chain untouched
        let data = self.codec.encode(value)?;

        let (tail_offset, tail) = self.last_record_in_bucket(bucket)?;
        let end = self.stream.stream_len()?;

        let (record_offset, key_offset) = if tail.is_empty() {
            // Unoccupied bucket: the head slot itself becomes the record,
            // only the key/value bytes go to the end of stream
            (head_offset, end)
        } else {
            // Occupied bucket: append the whole node, link the old tail to it
            self.write_next_offset(tail_offset, end)?;
            (end, end + RECORD_SIZE as u64)
        };

        let data_offset = key_offset + key.len() as u64;
        let record = Record::new(
            NULL_OFFSET,
            key_hash,
            key_offset,
            key.len() as u32,
            data_offset,
            data.len() as u32,
        );

        self.write_record(&record, record_offset)?;
        self.write_all_at(key_offset, key.as_bytes())?;
        self.write_all_at(data_offset, &data)?;

        self.count += 1;
        self.write_count()?;

        tracing::trace!("added key {:?} to bucket {}", key, bucket);

        Ok(())
    }

    /// Look up a value by key
    ///
    /// Fails with `KeyNotFound` after a full-chain miss and with `Codec` if
    /// the stored bytes do not decode.
    pub fn get(&mut self, key: &str) -> Result<C::Value> {
        Self::ensure_key(key)?;

        let offset = self
            .find_key(key)?
            .ok_or_else(|| ChainError::KeyNotFound(key.to_string()))?;

        let record = self.read_record(offset)?;
        let bytes = self.read_bytes(record.data_offset, record.data_length as usize)?;
        self.codec.decode(&bytes)
    }

    /// Look up a value by key, mapping a miss to `Ok(None)`
    ///
    /// Every other error kind still propagates.
    pub fn try_get(&mut self, key: &str) -> Result<Option<C::Value>> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(ChainError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert or overwrite an entry
    ///
    /// For an existing key the value is re-encoded and appended at the end
    /// of stream, and only the record's value metadata is rewritten: chain
    /// linkage and key bytes stay put, the old value bytes are orphaned.
    pub fn set(&mut self, key: &str, value: &C::Value) -> Result<()> {
        Self::ensure_key(key)?;
        self.ensure_writable()?;

        match self.find_key(key)? {
            None => self.add(key, value),
            Some(offset) => {
                let data = self.codec.encode(value)?;
                let data_offset = self.stream.stream_len()?;
                self.write_all_at(data_offset, &data)?;

                let current = self.read_record(offset)?;
                let updated = Record {
                    data_offset,
                    data_length: data.len() as u32,
                    ..current
                };
                self.write_record(&updated, offset)?;

                Ok(())
            }
        }
    }

    /// Remove an entry, returning whether the key was present
    ///
    /// A head-slot match pulls the next chain node (or the empty sentinel)
    /// into the slot; any other match splices the previous node past the
    /// removed one. The removed node and its byte runs are orphaned.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        Self::ensure_key(key)?;
        self.ensure_writable()?;

        let (key_hash, bucket) = hash::hash_bucket(key, self.prehash_length, self.bucket_count)?;
        let head_offset = self.bucket_offset(bucket);

        let mut offset = head_offset;
        let mut previous = head_offset;

        loop {
            if self.read_hash_field(offset)? == key_hash {
                let (key_offset, key_length) = self.read_key_meta(offset)?;
                let stored_key = self.read_key_string(key_offset, key_length)?;
                if stored_key == key {
                    let record = self.read_record(offset)?;

                    if offset == head_offset {
                        // Overwrite the head slot with the next record, or
                        // the empty sentinel when the chain ends here
                        let replacement = if record.next_offset == NULL_OFFSET {
                            Record::EMPTY
                        } else {
                            self.read_record(record.next_offset)?
                        };
                        self.write_record(&replacement, head_offset)?;
                    } else {
                        // Splice the previous node past the removed one
                        self.write_next_offset(previous, record.next_offset)?;
                    }

                    self.count -= 1;
                    self.write_count()?;

                    tracing::trace!("removed key {:?} from bucket {}", key, bucket);

                    return Ok(true);
                }
            }

            previous = offset;
            offset = self.read_next_offset(offset)?;
            if offset == NULL_OFFSET {
                return Ok(false);
            }
        }
    }

    /// Reset the store to empty
    ///
    /// Zeroes the directory, resets the persisted count, and truncates the
    /// stream back to header + directory size, discarding the entire log
    /// region including every orphaned byte.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_writable()?;
        self.initialize_stream()?;

        tracing::debug!(
            "cleared store; stream truncated to {} bytes",
            self.min_stream_len()
        );

        Ok(())
    }

    /// Whether the key is present (pure chain search)
    pub fn contains_key(&mut self, key: &str) -> Result<bool> {
        Self::ensure_key(key)?;
        Ok(self.find_key(key)?.is_some())
    }

    /// Whether the key is present with exactly this value
    ///
    /// The candidate is re-encoded and compared byte-for-byte against the
    /// persisted run, so "same key, different value" is a non-match.
    pub fn contains_pair(&mut self, key: &str, value: &C::Value) -> Result<bool> {
        Self::ensure_key(key)?;

        match self.find_key(key)? {
            None => Ok(false),
            Some(offset) => {
                let (data_offset, data_length) = self.read_data_meta(offset)?;
                let stored = self.read_bytes(data_offset, data_length as usize)?;
                let candidate = self.codec.encode(value)?;
                Ok(stored == candidate)
            }
        }
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Iterate over all live key/value pairs
    ///
    /// Bucket-major order, chain-insertion order within a bucket. Each call
    /// restarts a fresh traversal from bucket 0.
    pub fn iter(&mut self) -> Pairs<'_, S, C> {
        Pairs::new(self)
    }

    /// Iterate over all live keys
    pub fn keys(&mut self) -> Keys<'_, S, C> {
        Keys::new(self)
    }

    /// Iterate over all live values
    pub fn values(&mut self) -> Values<'_, S, C> {
        Values::new(self)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Flush the backing medium
    pub fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }

    /// Flush and release the backing medium
    ///
    /// Ownership guarantees the medium is released exactly once on every
    /// exit path; there is no separate dispose step.
    pub fn into_stream(mut self) -> Result<S> {
        self.stream.flush()?;
        Ok(self.stream)
    }

    /// Flush and drop the store
    pub fn close(self) -> Result<()> {
        self.into_stream().map(drop)
    }

    // =========================================================================
    // Private: Chain Search
    // =========================================================================

    /// Find the offset of the record matching `key`, if any
    ///
    /// Walks the one bucket the key routes to, comparing the full prehash
    /// first and the complete key bytes on a hash match.
    fn find_key(&mut self, key: &str) -> Result<Option<u64>> {
        let (key_hash, bucket) = hash::hash_bucket(key, self.prehash_length, self.bucket_count)?;

        let mut offset = self.bucket_offset(bucket);
        loop {
            if self.read_hash_field(offset)? == key_hash {
                let (key_offset, key_length) = self.read_key_meta(offset)?;
                let stored_key = self.read_key_string(key_offset, key_length)?;
                if stored_key == key {
                    return Ok(Some(offset));
                }
            }

            offset = self.read_next_offset(offset)?;
            if offset == NULL_OFFSET {
                return Ok(None);
            }
        }
    }

    /// Offset and contents of the last record in a bucket's chain
    ///
    /// For an unoccupied bucket this is the head slot holding the empty
    /// sentinel.
    fn last_record_in_bucket(&mut self, bucket: u32) -> Result<(u64, Record)> {
        let mut offset = self.bucket_offset(bucket);
        let mut next = self.read_next_offset(offset)?;

        while next != NULL_OFFSET {
            offset = next;
            next = self.read_next_offset(offset)?;
        }

        let record = self.read_record(offset)?;
        Ok((offset, record))
    }

    // =========================================================================
    // Private: Layout Arithmetic
    // =========================================================================

    /// Absolute stream offset of a bucket's head slot
    fn bucket_offset(&self, bucket: u32) -> u64 {
        HEADER_SIZE + u64::from(bucket) * RECORD_SIZE as u64
    }

    /// Smallest valid stream length: header plus full directory
    fn min_stream_len(&self) -> u64 {
        HEADER_SIZE + u64::from(self.bucket_count) * RECORD_SIZE as u64
    }

    // =========================================================================
    // Private: Record I/O
    // =========================================================================

    fn read_record(&mut self, offset: u64) -> Result<Record> {
        let mut buf = [0u8; RECORD_SIZE];
        self.read_exact_at(offset, &mut buf)?;
        Ok(Record::decode(&buf))
    }

    fn write_record(&mut self, record: &Record, offset: u64) -> Result<()> {
        self.write_all_at(offset, &record.encode())
    }

    /// Read just the `next_offset` field of the record at `offset`
    fn read_next_offset(&mut self, offset: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact_at(offset + record::NEXT_OFFSET_POS as u64, &mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Rewrite just the `next_offset` field of the record at `offset`
    fn write_next_offset(&mut self, offset: u64, next_offset: u64) -> Result<()> {
        self.write_all_at(
            offset + record::NEXT_OFFSET_POS as u64,
            &next_offset.to_le_bytes(),
        )
    }

    /// Read just the `hash` field of the record at `offset`
    fn read_hash_field(&mut self, offset: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_at(offset + record::HASH_POS as u64, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read the key `(offset, length)` pair of the record at `offset`
    ///
    /// `key_offset` and `key_length` are adjacent in the layout, so both
    /// come back in one read.
    fn read_key_meta(&mut self, offset: u64) -> Result<(u64, u32)> {
        let mut buf = [0u8; 12];
        self.read_exact_at(offset + record::KEY_OFFSET_POS as u64, &mut buf)?;
        let key_offset = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let key_length = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        Ok((key_offset, key_length))
    }

    /// Read the value `(offset, length)` pair of the record at `offset`
    fn read_data_meta(&mut self, offset: u64) -> Result<(u64, u32)> {
        let mut buf = [0u8; 12];
        self.read_exact_at(offset + record::DATA_OFFSET_POS as u64, &mut buf)?;
        let data_offset = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let data_length = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        Ok((data_offset, data_length))
    }

    // =========================================================================
    // Private: Header and Directory I/O
    // =========================================================================

    fn read_header(&mut self) -> Result<(u32, u32, i32)> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        self.read_exact_at(0, &mut buf)?;

        let count = u32::from_le_bytes(buf[COUNT_OFFSET..COUNT_OFFSET + 4].try_into().unwrap());
        let bucket_count = u32::from_le_bytes(
            buf[BUCKET_COUNT_OFFSET..BUCKET_COUNT_OFFSET + 4]
                .try_into()
                .unwrap(),
        );
        let prehash_length = i32::from_le_bytes(
            buf[PREHASH_LENGTH_OFFSET..PREHASH_LENGTH_OFFSET + 4]
                .try_into()
                .unwrap(),
        );
        Ok((count, bucket_count, prehash_length))
    }

    fn write_header(&mut self) -> Result<()> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[COUNT_OFFSET..COUNT_OFFSET + 4].copy_from_slice(&self.count.to_le_bytes());
        buf[BUCKET_COUNT_OFFSET..BUCKET_COUNT_OFFSET + 4]
            .copy_from_slice(&self.bucket_count.to_le_bytes());
        buf[PREHASH_LENGTH_OFFSET..PREHASH_LENGTH_OFFSET + 4]
            .copy_from_slice(&self.prehash_length.to_le_bytes());
        self.write_all_at(0, &buf)
    }

    /// Persist the live entry count to the header
    fn write_count(&mut self) -> Result<()> {
        self.write_all_at(COUNT_OFFSET as u64, &self.count.to_le_bytes())
    }

    /// Zero-fill every head slot, making each bucket the empty sentinel
    fn zero_directory(&mut self) -> Result<()> {
        let directory = vec![0u8; self.bucket_count as usize * RECORD_SIZE];
        self.write_all_at(HEADER_SIZE, &directory)
    }

    /// Write header + zeroed directory and cut the stream to exactly that
    fn initialize_stream(&mut self) -> Result<()> {
        self.count = 0;
        self.write_header()?;
        self.zero_directory()?;
        self.stream.truncate(self.min_stream_len())?;
        Ok(())
    }

    // =========================================================================
    // Private: Raw Stream I/O
    // =========================================================================

    /// Every access is an explicit seek + I/O pair; no state is carried in
    /// the stream cursor between operations.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.stream.seek(SeekFrom::Start(offset))?;
        self.stream.read_exact(buf)?;
        Ok(())
    }

    fn write_all_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.stream.seek(SeekFrom::Start(offset))?;
        self.stream.write_all(buf)?;
        Ok(())
    }

    fn read_bytes(&mut self, offset: u64, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Read a stored key back as a string
    fn read_key_string(&mut self, offset: u64, length: u32) -> Result<String> {
        let bytes = self.read_bytes(offset, length as usize)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // =========================================================================
    // Private: Guards
    // =========================================================================

    /// Argument errors are raised before any stream access
    fn ensure_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(ChainError::InvalidArgument(
                "key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Read-only violations are raised before any stream access
    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(ChainError::ReadOnly);
        }
        Ok(())
    }
}
