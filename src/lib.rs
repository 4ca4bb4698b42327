//! A concurrent pipeline cache for dynamic rendering.
//!
//! Maps a compact [`PipelineStateKey`] (shader combination + fixed-function
//! state) to a previously compiled pipeline handle, avoiding recompilation
//! on every draw. A secondary cache of per-shader pipeline *libraries* lets
//! a pipeline be relinked from reusable fragments when only one stage
//! changes, on drivers that support it; others get a monolithic fallback.
//!
//! The GPU driver is abstracted behind the [`Driver`] trait; shader objects
//! behind [`Shader`]. The cache owns every handle it stores and releases
//! them on eviction, cleanup and teardown.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod cache;
pub mod clock;
pub mod config;
pub mod descriptor;
pub mod driver;
pub mod entry;
pub mod key;
pub mod shader;

pub use cache::DynamicPipelineCache;
pub use clock::FrameClock;
pub use config::CacheConfig;
pub use descriptor::{
    FixedFunctionState, GraphicsPipelineDescriptor, LibraryDescriptor, LibraryInterface,
};
pub use driver::{
    CompilationCacheHandle, Driver, DriverError, LibraryHandle, PipelineHandle,
    PipelineLayoutHandle,
};
pub use entry::{CacheStats, LibraryCacheEntry, PipelineCacheEntry};
pub use key::{BlendComponentKey, DynamicStateFlags, PipelineStateKey, fx_hash_key};
pub use shader::{
    BindingLayout, ModuleOptions, Shader, ShaderSet, ShaderStage, ShaderStages, StageCode,
};
