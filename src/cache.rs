//! Concurrent dynamic-rendering pipeline cache.
//!
//! Central owner of every compiled pipeline and pipeline-library handle.
//! Two tables live behind one lock:
//!
//! - the **pipeline table**, keyed by the full [`PipelineStateKey`], holding
//!   executable pipelines;
//! - the **library table**, keyed by shader content hash, holding reusable
//!   single-stage fragments that can be linked into many pipelines.
//!
//! On a miss the cache prefers the library path (get-or-create a fragment
//! per shader stage, then link them with the remaining fixed-function state
//! in one driver call) and falls back to a monolithic create when the driver
//! lacks library support or no fragment could be produced.
//!
//! # Locking
//!
//! A single `parking_lot::Mutex` serializes all table access, including
//! creation itself. This guarantees at most one creation per key and
//! trivially consistent statistics, at the cost of cross-key parallelism: a
//! slow driver compile for key A blocks a concurrent request for unrelated
//! key B. A sharded-lock design would relax that without changing the
//! external contract.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::clock::FrameClock;
use crate::config::CacheConfig;
use crate::descriptor::{
    FixedFunctionState, GraphicsPipelineDescriptor, LibraryDescriptor, LibraryInterface,
};
use crate::driver::{CompilationCacheHandle, Driver, LibraryHandle, PipelineHandle};
use crate::entry::{CacheStats, LibraryCacheEntry, PipelineCacheEntry};
use crate::key::{BlendComponentKey, PipelineStateKey};
use crate::shader::{BindingLayout, ModuleOptions, Shader, ShaderSet, ShaderStage};

/// Everything guarded by the cache lock.
struct Tables {
    pipelines: FxHashMap<PipelineStateKey, PipelineCacheEntry>,
    libraries: FxHashMap<u64, LibraryCacheEntry>,
    hits: u64,
    misses: u64,
    compilation_cache: Option<CompilationCacheHandle>,
}

/// Concurrent two-level pipeline cache.
///
/// The driver is shared, never owned; shader objects passed into lookups are
/// shared with the caller's render state and outlive the call. The frame
/// clock is an injected timestamp source advanced by the owning renderer.
pub struct DynamicPipelineCache<D: Driver> {
    device: Arc<D>,
    clock: FrameClock,
    config: CacheConfig,
    inner: Mutex<Tables>,
}

impl<D: Driver> DynamicPipelineCache<D> {
    /// Create a cache with default tuning.
    #[must_use]
    pub fn new(device: Arc<D>, clock: FrameClock) -> Self {
        Self::with_config(device, clock, CacheConfig::default())
    }

    /// Create a cache with explicit tuning parameters.
    #[must_use]
    pub fn with_config(device: Arc<D>, clock: FrameClock, config: CacheConfig) -> Self {
        let compilation_cache = match device.create_compilation_cache() {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("failed to create driver compilation cache: {err}");
                None
            }
        };

        log::info!("dynamic pipeline cache initialized");

        Self {
            device,
            clock,
            config,
            inner: Mutex::new(Tables {
                pipelines: FxHashMap::default(),
                libraries: FxHashMap::default(),
                hits: 0,
                misses: 0,
                compilation_cache,
            }),
        }
    }

    /// Tuning parameters this cache was built with.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    /// Get or create the pipeline for `key`.
    ///
    /// Hit: bumps the entry's usage stats and returns the stored handle.
    /// Miss: creates via the library-linking path or the monolithic fallback
    /// and inserts on success. Returns `None` when creation fails; the
    /// failure is never cached, so the same key is retryable on a later call.
    ///
    /// Lookup, creation and insertion form one critical section, so at most
    /// one creation happens per key even under concurrent callers.
    pub fn get_pipeline(
        &self,
        key: &PipelineStateKey,
        shaders: &ShaderSet,
    ) -> Option<PipelineHandle> {
        let now = self.clock.current();
        let mut guard = self.inner.lock();
        let tables = &mut *guard;

        if let Some(entry) = tables.pipelines.get_mut(key) {
            entry.touch(now);
            tables.hits += 1;
            return Some(entry.pipeline);
        }

        tables.misses += 1;

        let (pipeline, libraries) = self.create_pipeline(tables, key, shaders)?;
        tables.pipelines.insert(
            *key,
            PipelineCacheEntry {
                pipeline,
                libraries,
                last_used: now,
                use_count: 1,
            },
        );
        Some(pipeline)
    }

    // ── Precompilation ───────────────────────────────────────────────────────

    /// Warm the cache for a batch of shader sets, off the render's critical
    /// path (e.g. at load time).
    ///
    /// For each set this first forces creation of the per-stage libraries,
    /// then ensures a small number of common state variants (an opaque
    /// depth-tested one and an alpha-blended one derived from it) are present
    /// in the pipeline table, creating on miss exactly as [`Self::get_pipeline`]
    /// would. Hit/miss counters are not affected.
    pub fn precompile(&self, shader_sets: &[ShaderSet]) {
        let now = self.clock.current();
        let mut guard = self.inner.lock();
        let tables = &mut *guard;

        for shaders in shader_sets {
            self.create_pipeline_libraries(tables, shaders);

            let opaque = PipelineStateKey {
                vertex_shader_hash: ShaderSet::stage_hash(shaders.vs.as_ref()),
                fragment_shader_hash: ShaderSet::stage_hash(shaders.fs.as_ref()),
                color_format: Some(wgpu::TextureFormat::Rgba8Unorm),
                depth_format: Some(wgpu::TextureFormat::Depth24PlusStencil8),
                depth_test_enabled: true,
                depth_write_enabled: true,
                ..PipelineStateKey::default()
            };

            let blended = PipelineStateKey {
                blend: Some(BlendComponentKey::ALPHA_BLENDING),
                ..opaque
            };

            for key in [opaque, blended] {
                if tables.pipelines.contains_key(&key) {
                    continue;
                }
                if let Some((pipeline, libraries)) = self.create_pipeline(tables, &key, shaders) {
                    tables.pipelines.insert(
                        key,
                        PipelineCacheEntry {
                            pipeline,
                            libraries,
                            last_used: now,
                            use_count: 1,
                        },
                    );
                }
            }
        }
    }

    // ── Eviction ─────────────────────────────────────────────────────────────

    /// Shrink the pipeline table to at most `max_entries`, evicting the
    /// least-recently-used entries first.
    ///
    /// No-op when the table already fits. Afterwards the retained set is
    /// exactly the `max_entries` most recently used entries.
    pub fn optimize(&self, max_entries: usize) {
        let mut tables = self.inner.lock();

        if tables.pipelines.len() <= max_entries {
            return;
        }

        let mut by_age: Vec<(PipelineStateKey, u64)> = tables
            .pipelines
            .iter()
            .map(|(key, entry)| (*key, entry.last_used))
            .collect();
        by_age.sort_by_key(|&(_, last_used)| last_used);

        let to_remove = by_age.len() - max_entries;
        for (key, _) in by_age.into_iter().take(to_remove) {
            if let Some(entry) = tables.pipelines.remove(&key) {
                self.device.destroy_pipeline(entry.pipeline);
            }
        }

        log::info!("optimized pipeline cache, removed {to_remove} entries");
    }

    /// Remove entries that are both old and rarely used.
    ///
    /// An entry is removed when its age exceeds `max_entry_age` frames *and*
    /// its use count is below the table's popularity threshold. Entries that
    /// are young or heavily reused always survive, regardless of the other
    /// criterion. Applied to both tables.
    pub fn cleanup_unused(&self) {
        let now = self.clock.current();
        let config = self.config;
        let mut tables = self.inner.lock();

        let device = &self.device;
        tables.pipelines.retain(|_, entry| {
            let stale = now.saturating_sub(entry.last_used) > config.max_entry_age
                && entry.use_count < config.pipeline_min_use_count;
            if stale {
                device.destroy_pipeline(entry.pipeline);
            }
            !stale
        });

        tables.libraries.retain(|_, entry| {
            let stale = now.saturating_sub(entry.last_used) > config.max_entry_age
                && entry.use_count < config.library_min_use_count;
            if stale {
                device.destroy_library(entry.library);
            }
            !stale
        });
    }

    // ── Statistics ───────────────────────────────────────────────────────────

    /// Read-only snapshot of table sizes and hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let tables = self.inner.lock();
        let total_entries = (tables.pipelines.len() + tables.libraries.len()) as u64;
        CacheStats {
            pipeline_count: tables.pipelines.len(),
            library_count: tables.libraries.len(),
            hits: tables.hits,
            misses: tables.misses,
            estimated_memory: total_entries * self.config.bytes_per_entry,
        }
    }

    // ── Creation paths ───────────────────────────────────────────────────────

    /// Create a pipeline for `key`, choosing the strategy by driver
    /// capability: link per-stage libraries when supported and at least one
    /// fragment was produced, otherwise compile monolithically.
    fn create_pipeline(
        &self,
        tables: &mut Tables,
        key: &PipelineStateKey,
        shaders: &ShaderSet,
    ) -> Option<(PipelineHandle, SmallVec<[LibraryHandle; 4]>)> {
        let libraries = self.create_pipeline_libraries(tables, shaders);

        if !libraries.is_empty() && self.device.supports_pipeline_libraries() {
            let state = FixedFunctionState::from_key(key);
            return match self.device.link_pipeline_libraries(
                tables.compilation_cache,
                &libraries,
                &state,
                self.device.empty_pipeline_layout(),
            ) {
                Ok(pipeline) => Some((pipeline, libraries)),
                Err(err) => {
                    log::error!("failed to link pipeline libraries: {err}");
                    None
                }
            };
        }

        self.create_monolithic(tables.compilation_cache, key, shaders)
            .map(|pipeline| (pipeline, SmallVec::new()))
    }

    /// Monolithic fallback: compile all populated stages and the full
    /// fixed-function state in a single driver call.
    fn create_monolithic(
        &self,
        compilation_cache: Option<CompilationCacheHandle>,
        key: &PipelineStateKey,
        shaders: &ShaderSet,
    ) -> Option<PipelineHandle> {
        let layout = BindingLayout::default();
        let options = ModuleOptions::default();

        let mut stages = SmallVec::new();
        for shader in [&shaders.vs, &shaders.fs, &shaders.gs, &shaders.ts]
            .into_iter()
            .flatten()
        {
            stages.push(shader.code(&layout, &options));
        }

        let descriptor = GraphicsPipelineDescriptor {
            stages,
            state: FixedFunctionState::from_key(key),
            layout: self.device.empty_pipeline_layout(),
        };

        match self
            .device
            .create_graphics_pipeline(compilation_cache, &descriptor)
        {
            Ok(pipeline) => Some(pipeline),
            Err(err) => {
                log::error!("failed to create pipeline: {err}");
                None
            }
        }
    }

    /// Get or create the per-stage libraries for a shader set.
    ///
    /// Only vertex and fragment stages support fragment compilation; stages
    /// whose library creation fails are omitted from the result rather than
    /// treated as fatal.
    fn create_pipeline_libraries(
        &self,
        tables: &mut Tables,
        shaders: &ShaderSet,
    ) -> SmallVec<[LibraryHandle; 4]> {
        let mut libraries = SmallVec::new();

        if let Some(vs) = &shaders.vs
            && let Some(library) =
                self.get_pipeline_library(tables, vs.hash(), ShaderStage::Vertex, vs.as_ref())
        {
            libraries.push(library);
        }

        if let Some(fs) = &shaders.fs
            && let Some(library) =
                self.get_pipeline_library(tables, fs.hash(), ShaderStage::Fragment, fs.as_ref())
        {
            libraries.push(library);
        }

        libraries
    }

    /// Library-table lookup by shader hash, creating a single-stage library
    /// on miss.
    ///
    /// Always `None` when the driver does not advertise library support or
    /// when the stage has no matching library interface.
    fn get_pipeline_library(
        &self,
        tables: &mut Tables,
        shader_hash: u64,
        stage: ShaderStage,
        shader: &dyn Shader,
    ) -> Option<LibraryHandle> {
        let now = self.clock.current();

        if let Some(entry) = tables.libraries.get_mut(&shader_hash) {
            entry.touch(now);
            return Some(entry.library);
        }

        if !self.device.supports_pipeline_libraries() {
            return None;
        }

        let interface = match stage {
            ShaderStage::Vertex => LibraryInterface::VertexInput,
            ShaderStage::Fragment => LibraryInterface::FragmentOutput,
            _ => return None,
        };

        let descriptor = LibraryDescriptor {
            interface,
            code: shader.code(&BindingLayout::default(), &ModuleOptions::default()),
            layout: self.device.empty_pipeline_layout(),
        };

        match self
            .device
            .create_pipeline_library(tables.compilation_cache, &descriptor)
        {
            Ok(library) => {
                tables.libraries.insert(
                    shader_hash,
                    LibraryCacheEntry {
                        library,
                        stages: stage.into(),
                        shader_hash,
                        last_used: now,
                        use_count: 1,
                    },
                );
                Some(library)
            }
            Err(err) => {
                log::error!("failed to create pipeline library: {err}");
                None
            }
        }
    }
}

impl<D: Driver> Drop for DynamicPipelineCache<D> {
    fn drop(&mut self) {
        let mut tables = self.inner.lock();

        for (_, entry) in tables.pipelines.drain() {
            self.device.destroy_pipeline(entry.pipeline);
        }
        for (_, entry) in tables.libraries.drain() {
            self.device.destroy_library(entry.library);
        }
        if let Some(cache) = tables.compilation_cache.take() {
            self.device.destroy_compilation_cache(cache);
        }
    }
}
