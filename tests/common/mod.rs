//! Shared test harness: a synthetic driver that hands out unique handles and
//! records every create/destroy call, plus simple content-hashed shaders.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use xxhash_rust::xxh3::xxh3_64;

use pipecache::{
    BindingLayout, CompilationCacheHandle, Driver, DriverError, FixedFunctionState,
    GraphicsPipelineDescriptor, LibraryDescriptor, LibraryHandle, LibraryInterface, ModuleOptions,
    PipelineHandle, PipelineLayoutHandle, PipelineStateKey, Shader, ShaderSet, ShaderStage,
    StageCode,
};

/// Route cache diagnostics through `env_logger` when `RUST_LOG` is set.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Mock driver
// ============================================================================

#[derive(Default)]
pub struct MockDriver {
    supports_libraries: bool,
    next_handle: AtomicU64,

    pub pipeline_creations: AtomicU64,
    pub library_creations: AtomicU64,
    pub link_calls: AtomicU64,
    pub compilation_caches_created: AtomicU64,
    pub compilation_caches_destroyed: AtomicU64,

    pub destroyed_pipelines: Mutex<Vec<PipelineHandle>>,
    pub destroyed_libraries: Mutex<Vec<LibraryHandle>>,

    pub fail_pipelines: AtomicBool,
    pub fail_links: AtomicBool,
    pub fail_fragment_libraries: AtomicBool,
}

impl MockDriver {
    pub fn new(supports_libraries: bool) -> Arc<Self> {
        Arc::new(Self {
            supports_libraries,
            next_handle: AtomicU64::new(1),
            ..Self::default()
        })
    }

    fn next(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    /// Total create calls that produced an executable pipeline.
    pub fn total_creations(&self) -> u64 {
        self.pipeline_creations.load(Ordering::Relaxed) + self.link_calls.load(Ordering::Relaxed)
    }
}

impl Driver for MockDriver {
    fn supports_pipeline_libraries(&self) -> bool {
        self.supports_libraries
    }

    fn empty_pipeline_layout(&self) -> PipelineLayoutHandle {
        PipelineLayoutHandle(0)
    }

    fn create_compilation_cache(&self) -> Result<CompilationCacheHandle, DriverError> {
        self.compilation_caches_created.fetch_add(1, Ordering::Relaxed);
        Ok(CompilationCacheHandle(self.next()))
    }

    fn destroy_compilation_cache(&self, _cache: CompilationCacheHandle) {
        self.compilation_caches_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    fn create_graphics_pipeline(
        &self,
        _cache: Option<CompilationCacheHandle>,
        _descriptor: &GraphicsPipelineDescriptor,
    ) -> Result<PipelineHandle, DriverError> {
        if self.fail_pipelines.load(Ordering::Relaxed) {
            return Err(DriverError::CreationFailed(-13));
        }
        self.pipeline_creations.fetch_add(1, Ordering::Relaxed);
        Ok(PipelineHandle(self.next()))
    }

    fn create_pipeline_library(
        &self,
        _cache: Option<CompilationCacheHandle>,
        descriptor: &LibraryDescriptor,
    ) -> Result<LibraryHandle, DriverError> {
        if descriptor.interface == LibraryInterface::FragmentOutput
            && self.fail_fragment_libraries.load(Ordering::Relaxed)
        {
            return Err(DriverError::CreationFailed(-4));
        }
        self.library_creations.fetch_add(1, Ordering::Relaxed);
        Ok(LibraryHandle(self.next()))
    }

    fn link_pipeline_libraries(
        &self,
        _cache: Option<CompilationCacheHandle>,
        _libraries: &[LibraryHandle],
        _state: &FixedFunctionState,
        _layout: PipelineLayoutHandle,
    ) -> Result<PipelineHandle, DriverError> {
        if self.fail_links.load(Ordering::Relaxed) {
            return Err(DriverError::CreationFailed(-7));
        }
        self.link_calls.fetch_add(1, Ordering::Relaxed);
        Ok(PipelineHandle(self.next()))
    }

    fn destroy_pipeline(&self, pipeline: PipelineHandle) {
        self.destroyed_pipelines.lock().push(pipeline);
    }

    fn destroy_library(&self, library: LibraryHandle) {
        self.destroyed_libraries.lock().push(library);
    }
}

// ============================================================================
// Mock shaders
// ============================================================================

pub struct MockShader {
    stage: ShaderStage,
    hash: u64,
    words: Arc<[u32]>,
}

impl MockShader {
    pub fn new(stage: ShaderStage, source: &str) -> Arc<Self> {
        let words: Vec<u32> = source.bytes().map(u32::from).collect();
        Arc::new(Self {
            stage,
            hash: xxh3_64(source.as_bytes()),
            words: words.into(),
        })
    }
}

impl Shader for MockShader {
    fn hash(&self) -> u64 {
        self.hash
    }

    fn code(&self, _layout: &BindingLayout, _options: &ModuleOptions) -> StageCode {
        StageCode {
            stage: self.stage,
            entry_point: "main".to_owned(),
            words: Arc::clone(&self.words),
        }
    }
}

/// A vertex+fragment shader set with content-hashed identities.
pub fn shader_set(vs_source: &str, fs_source: &str) -> ShaderSet {
    ShaderSet {
        vs: Some(MockShader::new(ShaderStage::Vertex, vs_source)),
        fs: Some(MockShader::new(ShaderStage::Fragment, fs_source)),
        gs: None,
        ts: None,
    }
}

/// A typical draw key for the given shader set (opaque, depth-tested).
pub fn draw_key(shaders: &ShaderSet) -> PipelineStateKey {
    PipelineStateKey {
        vertex_shader_hash: ShaderSet::stage_hash(shaders.vs.as_ref()),
        fragment_shader_hash: ShaderSet::stage_hash(shaders.fs.as_ref()),
        color_format: Some(wgpu::TextureFormat::Rgba8Unorm),
        depth_format: Some(wgpu::TextureFormat::Depth24PlusStencil8),
        depth_test_enabled: true,
        depth_write_enabled: true,
        ..PipelineStateKey::default()
    }
}
