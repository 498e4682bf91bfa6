//! Configuration for ChainKV
//!
//! Centralized configuration with sensible defaults.

/// Configuration for a freshly created store
///
/// `bucket_count` and `prehash_length` are baked into the stream header at
/// creation time and are immutable for the life of the store; reopening the
/// same stream reads them back from the header, so the config only matters
/// to [`ChainStore::create`](crate::ChainStore::create).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Directory Configuration
    // -------------------------------------------------------------------------
    /// Number of bucket head slots in the fixed directory.
    ///
    /// Must be at least 1. More buckets mean fewer same-bucket collisions
    /// at the cost of a larger fixed region (48 bytes per bucket).
    pub bucket_count: u32,

    // -------------------------------------------------------------------------
    // Hashing Configuration
    // -------------------------------------------------------------------------
    /// Number of leading key bytes fed to the routing prehash.
    ///
    /// A negative value hashes the entire key. Truncation trades collision
    /// rate for cheaper hashing on long keys; correctness is unaffected
    /// because full keys are compared after every hash match.
    pub prehash_length: i32,

    // -------------------------------------------------------------------------
    // Access Configuration
    // -------------------------------------------------------------------------
    /// Reject every mutating operation when set.
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket_count: 1024,
            prehash_length: 3,
            read_only: false,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the number of bucket head slots (must be >= 1)
    pub fn bucket_count(mut self, count: u32) -> Self {
        self.config.bucket_count = count;
        self
    }

    /// Set the number of leading key bytes to prehash (negative = whole key)
    pub fn prehash_length(mut self, length: i32) -> Self {
        self.config.prehash_length = length;
        self
    }

    /// Mark the store read-only
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
