//! Cache tuning parameters.

/// Eviction and accounting tunables.
///
/// The defaults reproduce long-standing behavior; none of the exact values
/// are load-bearing, so they are plain fields rather than constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries untouched for more than this many frames become cleanup
    /// candidates.
    pub max_entry_age: u64,
    /// Pipelines with at least this many uses survive cleanup regardless of
    /// age.
    pub pipeline_min_use_count: u32,
    /// Libraries with at least this many uses survive cleanup regardless of
    /// age.
    pub library_min_use_count: u32,
    /// Flat per-entry cost used for the memory-usage estimate.
    pub bytes_per_entry: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entry_age: 1000,
            pipeline_min_use_count: 5,
            library_min_use_count: 3,
            bytes_per_entry: 1024,
        }
    }
}
