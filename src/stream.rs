//! Backing stream abstraction
//!
//! The store operates over any byte-addressable, seekable medium. Std's
//! `Read + Write + Seek` covers the access pattern, but the engine also
//! needs the medium's total length (append offsets are computed from it)
//! and physical truncation (a full clear discards the log region), neither
//! of which std expresses as a trait. [`BackingStream`] adds both.
//!
//! The engine exclusively owns its stream for the store's lifetime and
//! never relies on cursor position carrying over between operations: every
//! access is an explicit seek + read/write pair.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};

/// A byte-addressable, seekable, readable and writable medium
pub trait BackingStream: Read + Write + Seek {
    /// Current total length of the medium in bytes
    fn stream_len(&mut self) -> io::Result<u64>;

    /// Physically truncate the medium to `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl BackingStream for File {
    fn stream_len(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl BackingStream for Cursor<Vec<u8>> {
    fn stream_len(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.get_mut().truncate(len as usize);
        // Keep the cursor inside the shrunk buffer
        if self.position() > len {
            self.set_position(len);
        }
        Ok(())
    }
}
