//! Driver collaborator interface and opaque handle types.
//!
//! The cache never talks to a GPU API directly; it issues create/destroy
//! calls through the [`Driver`] trait and stores the opaque handles the
//! driver returns. Handles are thin `Copy` newtypes so the two tables cannot
//! accidentally mix up pipelines and libraries.

use thiserror::Error;

use crate::descriptor::{FixedFunctionState, GraphicsPipelineDescriptor, LibraryDescriptor};

/// Handle to a fully linked, executable pipeline object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub u64);

/// Handle to a partially compiled, linkable pipeline library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LibraryHandle(pub u64);

/// Handle to a driver pipeline layout object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineLayoutHandle(pub u64);

/// Handle to the driver's top-level compilation-acceleration cache.
///
/// Created once at cache construction, passed to every create call, and
/// destroyed once at teardown. Opaque beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompilationCacheHandle(pub u64);

/// Failure modes reported by the driver.
///
/// All of these are non-fatal to the cache: a failed creation is logged and
/// surfaced to the caller as an absent handle, never cached.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The driver rejected a create call, with its native status code.
    #[error("driver returned error code {0}")]
    CreationFailed(i32),

    /// The requested operation is not supported by this driver.
    #[error("operation not supported by driver")]
    Unsupported,

    /// The device was lost; subsequent calls will also fail.
    #[error("device lost")]
    DeviceLost,
}

/// The external GPU driver, borrowed (never owned) by the cache.
///
/// Implementations perform the actual compilation and own nothing the cache
/// stores: every handle returned from a `create_*` call is owned exclusively
/// by the cache table it lands in, and must remain valid until the cache
/// passes it back to `destroy_*`.
pub trait Driver: Send + Sync {
    /// Whether the driver supports linkable pipeline libraries.
    ///
    /// Gates the library-linking creation path; when `false`, the cache only
    /// ever uses the monolithic path.
    fn supports_pipeline_libraries(&self) -> bool;

    /// Built-in pipeline layout with no bound resources.
    fn empty_pipeline_layout(&self) -> PipelineLayoutHandle;

    /// Create the top-level compilation-acceleration cache object.
    fn create_compilation_cache(&self) -> Result<CompilationCacheHandle, DriverError>;

    /// Destroy the compilation-acceleration cache object.
    fn destroy_compilation_cache(&self, cache: CompilationCacheHandle);

    /// Create a complete graphics pipeline in a single step.
    fn create_graphics_pipeline(
        &self,
        cache: Option<CompilationCacheHandle>,
        descriptor: &GraphicsPipelineDescriptor,
    ) -> Result<PipelineHandle, DriverError>;

    /// Create a single-stage pipeline library.
    fn create_pipeline_library(
        &self,
        cache: Option<CompilationCacheHandle>,
        descriptor: &LibraryDescriptor,
    ) -> Result<LibraryHandle, DriverError>;

    /// Link previously created libraries with the remaining fixed-function
    /// state into one executable pipeline.
    fn link_pipeline_libraries(
        &self,
        cache: Option<CompilationCacheHandle>,
        libraries: &[LibraryHandle],
        state: &FixedFunctionState,
        layout: PipelineLayoutHandle,
    ) -> Result<PipelineHandle, DriverError>;

    /// Release a pipeline object.
    fn destroy_pipeline(&self, pipeline: PipelineHandle);

    /// Release a pipeline library object.
    fn destroy_library(&self, library: LibraryHandle);
}
