//! Shader collaborator interface.
//!
//! Shader objects are owned by the caller's render state and merely borrowed
//! by the cache (shared via `Arc`, lifetime governed by whichever holder
//! releases last). The cache only needs two things from a shader: a stable
//! 64-bit content hash for keying, and compiled stage code for the driver.

use std::sync::Arc;

use bitflags::bitflags;

/// A single programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    Tessellation,
}

bitflags! {
    /// Set of stages covered by a pipeline library.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStages: u32 {
        const VERTEX       = 1 << 0;
        const FRAGMENT     = 1 << 1;
        const GEOMETRY     = 1 << 2;
        const TESSELLATION = 1 << 3;
    }
}

impl From<ShaderStage> for ShaderStages {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStages::VERTEX,
            ShaderStage::Fragment => ShaderStages::FRAGMENT,
            ShaderStage::Geometry => ShaderStages::GEOMETRY,
            ShaderStage::Tessellation => ShaderStages::TESSELLATION,
        }
    }
}

/// Resource binding layout handed to shader code generation.
///
/// The cache always compiles against an empty layout: dynamic-rendering
/// pipelines in this cache are state/shader-combination probes, not
/// draw-ready pipelines with descriptor bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingLayout {
    pub uniform_count: u32,
    pub sampler_count: u32,
    pub texture_count: u32,
}

/// Module-creation options for shader code generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleOptions {
    pub robust_access: bool,
    pub invariant_position: bool,
}

/// Compiled code for one shader stage, ready for a driver create call.
#[derive(Debug, Clone)]
pub struct StageCode {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub words: Arc<[u32]>,
}

/// Externally-owned shader object.
///
/// Implementations must return the same hash for the same shader contents
/// across calls; the hash is the identity used by the library cache.
pub trait Shader: Send + Sync {
    /// Stable 64-bit content hash.
    fn hash(&self) -> u64;

    /// Produce compiled stage code for the given binding layout and options.
    fn code(&self, layout: &BindingLayout, options: &ModuleOptions) -> StageCode;
}

/// The set of shader objects for one draw, shared with the caller.
#[derive(Clone, Default)]
pub struct ShaderSet {
    pub vs: Option<Arc<dyn Shader>>,
    pub fs: Option<Arc<dyn Shader>>,
    pub gs: Option<Arc<dyn Shader>>,
    pub ts: Option<Arc<dyn Shader>>,
}

impl ShaderSet {
    /// Hash of a stage, or 0 when the stage is absent.
    #[must_use]
    pub fn stage_hash(shader: Option<&Arc<dyn Shader>>) -> u64 {
        shader.map_or(0, |s| s.hash())
    }
}

impl std::fmt::Debug for ShaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderSet")
            .field("vs", &self.vs.as_ref().map(|s| s.hash()))
            .field("fs", &self.fs.as_ref().map(|s| s.hash()))
            .field("gs", &self.gs.as_ref().map(|s| s.hash()))
            .field("ts", &self.ts.as_ref().map(|s| s.hash()))
            .finish()
    }
}
