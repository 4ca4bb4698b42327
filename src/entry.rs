//! Cache bookkeeping records and statistics.

use smallvec::SmallVec;

use crate::driver::{LibraryHandle, PipelineHandle};
use crate::shader::ShaderStages;

/// One cached, executable pipeline.
///
/// Owns the driver pipeline handle exclusively; the handle is released by
/// eviction, cleanup or cache teardown, never by the caller.
#[derive(Debug)]
pub struct PipelineCacheEntry {
    pub pipeline: PipelineHandle,
    /// Libraries this pipeline was linked from (diagnostic record only;
    /// library lifetime is owned by the library table).
    pub libraries: SmallVec<[LibraryHandle; 4]>,
    /// Frame index as of the most recent access.
    pub last_used: u64,
    /// Monotonically increasing hit counter.
    pub use_count: u32,
}

impl PipelineCacheEntry {
    pub(crate) fn touch(&mut self, frame: u64) {
        self.last_used = frame;
        self.use_count += 1;
    }
}

/// One cached, reusable pipeline library.
///
/// Lifetime is independent of any pipeline that references it: a library may
/// be linked into many pipelines and survives as long as the table holds it,
/// even if every pipeline using it has been evicted.
#[derive(Debug)]
pub struct LibraryCacheEntry {
    pub library: LibraryHandle,
    /// Stage(s) this library covers.
    pub stages: ShaderStages,
    /// Content hash of the originating shader.
    pub shader_hash: u64,
    pub last_used: u64,
    pub use_count: u32,
}

impl LibraryCacheEntry {
    pub(crate) fn touch(&mut self, frame: u64) {
        self.last_used = frame;
        self.use_count += 1;
    }
}

/// Read-only cache statistics snapshot.
///
/// Hit/miss counters are monotonic for the cache's lifetime and are never
/// reset. `estimated_memory` is a coarse heuristic (flat per-entry cost ×
/// entry count), not a measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub pipeline_count: usize,
    pub library_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub estimated_memory: u64,
}
