//! Chain-walking iterators
//!
//! Lazy enumeration over every bucket chain: bucket-major order, and
//! chain-insertion order within a bucket (new entries are appended at the
//! tail). Each iterator holds an explicit `(bucket, offset)` cursor and
//! advances by following `next_offset` links; a fresh call to
//! `iter()`/`keys()`/`values()` restarts the traversal from bucket 0.
//!
//! Unoccupied head slots and records with dead metadata are skipped. A
//! record counts as live for pairs when both its key and value metadata
//! are non-null with positive length; keys and values each check only
//! their own side, mirroring the lookup rules of the store.

use super::ChainStore;
use crate::codec::ValueCodec;
use crate::error::Result;
use crate::record::{Record, NULL_OFFSET};
use crate::stream::BackingStream;

// =============================================================================
// Raw Record Cursor
// =============================================================================

/// Cursor visiting every record slot in the directory, chains included
///
/// Yields raw records without liveness filtering; the public iterators
/// apply their own filters on top. An I/O error ends the walk after being
/// reported once.
struct RecordWalk<'a, S, C> {
    store: &'a mut ChainStore<S, C>,
    /// Next bucket to enter once the current chain is exhausted
    bucket: u32,
    /// Offset of the next chain node to visit, if still inside a chain
    offset: Option<u64>,
    done: bool,
}

impl<'a, S, C> RecordWalk<'a, S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    fn new(store: &'a mut ChainStore<S, C>) -> Self {
        Self {
            store,
            bucket: 0,
            offset: None,
            done: false,
        }
    }

    fn advance(&mut self) -> Option<Result<Record>> {
        if self.done {
            return None;
        }

        let offset = match self.offset {
            Some(offset) => offset,
            None => {
                if self.bucket >= self.store.bucket_count() {
                    self.done = true;
                    return None;
                }
                let head = self.store.bucket_offset(self.bucket);
                self.bucket += 1;
                head
            }
        };

        match self.store.read_record(offset) {
            Ok(record) => {
                self.offset = if record.next_offset == NULL_OFFSET {
                    None
                } else {
                    Some(record.next_offset)
                };
                Some(Ok(record))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    /// Stop the walk after a fault while materializing a record's bytes
    fn fail(&mut self) {
        self.done = true;
    }
}

// =============================================================================
// Pairs
// =============================================================================

/// Iterator over live `(key, value)` pairs
pub struct Pairs<'a, S, C> {
    walk: RecordWalk<'a, S, C>,
}

impl<'a, S, C> Pairs<'a, S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    pub(super) fn new(store: &'a mut ChainStore<S, C>) -> Self {
        Self {
            walk: RecordWalk::new(store),
        }
    }
}

impl<'a, S, C> Iterator for Pairs<'a, S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    type Item = Result<(String, C::Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.walk.advance()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };

            if record.key_offset == NULL_OFFSET
                || record.key_length == 0
                || record.data_offset == NULL_OFFSET
                || record.data_length == 0
            {
                continue;
            }

            let key = match self
                .walk
                .store
                .read_key_string(record.key_offset, record.key_length)
            {
                Ok(key) => key,
                Err(e) => {
                    self.walk.fail();
                    return Some(Err(e));
                }
            };

            let bytes = match self
                .walk
                .store
                .read_bytes(record.data_offset, record.data_length as usize)
            {
                Ok(bytes) => bytes,
                Err(e) => {
                    self.walk.fail();
                    return Some(Err(e));
                }
            };

            return match self.walk.store.codec.decode(&bytes) {
                Ok(value) => Some(Ok((key, value))),
                Err(e) => {
                    self.walk.fail();
                    Some(Err(e))
                }
            };
        }
    }
}

// =============================================================================
// Keys
// =============================================================================

/// Iterator over live keys
pub struct Keys<'a, S, C> {
    walk: RecordWalk<'a, S, C>,
}

impl<'a, S, C> Keys<'a, S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    pub(super) fn new(store: &'a mut ChainStore<S, C>) -> Self {
        Self {
            walk: RecordWalk::new(store),
        }
    }
}

impl<'a, S, C> Iterator for Keys<'a, S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.walk.advance()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };

            if record.key_offset == NULL_OFFSET || record.key_length == 0 {
                continue;
            }

            return match self
                .walk
                .store
                .read_key_string(record.key_offset, record.key_length)
            {
                Ok(key) => Some(Ok(key)),
                Err(e) => {
                    self.walk.fail();
                    Some(Err(e))
                }
            };
        }
    }
}

// =============================================================================
// Values
// =============================================================================

/// Iterator over live decoded values
pub struct Values<'a, S, C> {
    walk: RecordWalk<'a, S, C>,
}

impl<'a, S, C> Values<'a, S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    pub(super) fn new(store: &'a mut ChainStore<S, C>) -> Self {
        Self {
            walk: RecordWalk::new(store),
        }
    }
}

impl<'a, S, C> Iterator for Values<'a, S, C>
where
    S: BackingStream,
    C: ValueCodec,
{
    type Item = Result<C::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.walk.advance()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };

            if record.data_offset == NULL_OFFSET || record.data_length == 0 {
                continue;
            }

            let bytes = match self
                .walk
                .store
                .read_bytes(record.data_offset, record.data_length as usize)
            {
                Ok(bytes) => bytes,
                Err(e) => {
                    self.walk.fail();
                    return Some(Err(e));
                }
            };

            return match self.walk.store.codec.decode(&bytes) {
                Ok(value) => Some(Ok(value)),
                Err(e) => {
                    self.walk.fail();
                    Some(Err(e))
                }
            };
        }
    }
}
