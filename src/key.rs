//! Strongly-typed pipeline cache keys.
//!
//! A [`PipelineStateKey`] is the compact, structurally-comparable description
//! of one dynamic-rendering pipeline configuration: which shaders are bound
//! (by content hash) plus every piece of fixed-function state that affects
//! compilation. Two keys are equal iff every field matches, so the key can be
//! used directly as a hash-map key.
//!
//! `wgpu` descriptor types (`BlendComponent`, …) do not all implement
//! `Hash` / `Eq`, so this module defines *mirror* types that carry the fields
//! relevant for pipeline identity and derive the correct trait impls.

use std::hash::{Hash, Hasher};

use bitflags::bitflags;

bitflags! {
    /// Which pieces of pipeline state are left dynamic (supplied at draw
    /// time rather than baked into the compiled pipeline).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DynamicStateFlags: u32 {
        const VIEWPORT     = 1 << 0;
        const SCISSOR      = 1 << 1;
        const LINE_WIDTH   = 1 << 2;
        const DEPTH_BIAS   = 1 << 3;
        const BLEND_CONST  = 1 << 4;
        const STENCIL_REF  = 1 << 5;
    }
}

/// Hashable mirror of `wgpu::BlendComponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponentKey {
    pub src_factor: wgpu::BlendFactor,
    pub dst_factor: wgpu::BlendFactor,
    pub operation: wgpu::BlendOperation,
}

impl From<wgpu::BlendComponent> for BlendComponentKey {
    fn from(b: wgpu::BlendComponent) -> Self {
        Self {
            src_factor: b.src_factor,
            dst_factor: b.dst_factor,
            operation: b.operation,
        }
    }
}

impl BlendComponentKey {
    /// Standard `SrcAlpha / OneMinusSrcAlpha` alpha blending.
    pub const ALPHA_BLENDING: Self = Self {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
}

/// Full-state cache key for a dynamic-rendering pipeline.
///
/// Shader stages are identified by their 64-bit content hash; a hash of `0`
/// means the stage is absent. Target formats are `None` when the attachment
/// is absent. Blending is `None` when disabled.
///
/// Pure data: `Copy`-cheap scalars, no ownership, no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineStateKey {
    // Shader stages
    pub vertex_shader_hash: u64,
    pub fragment_shader_hash: u64,
    pub geometry_shader_hash: u64,
    pub tessellation_shader_hash: u64,

    // Render targets
    pub color_format: Option<wgpu::TextureFormat>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub sample_count: u32,

    // Primitive / rasterization state
    pub topology: wgpu::PrimitiveTopology,
    pub polygon_mode: wgpu::PolygonMode,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,

    // Blend state (`None` = blending disabled)
    pub blend: Option<BlendComponentKey>,

    // Depth state
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_compare: wgpu::CompareFunction,

    // Dynamic state
    pub dynamic_state: DynamicStateFlags,
}

impl Default for PipelineStateKey {
    fn default() -> Self {
        Self {
            vertex_shader_hash: 0,
            fragment_shader_hash: 0,
            geometry_shader_hash: 0,
            tessellation_shader_hash: 0,
            color_format: None,
            depth_format: None,
            sample_count: 1,
            topology: wgpu::PrimitiveTopology::TriangleList,
            polygon_mode: wgpu::PolygonMode::Fill,
            cull_mode: None,
            front_face: wgpu::FrontFace::Ccw,
            blend: None,
            depth_test_enabled: false,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            dynamic_state: DynamicStateFlags::empty(),
        }
    }
}

/// Compute a `u64` hash of any `Hash`-able value using `FxHasher`.
#[inline]
#[must_use]
pub fn fx_hash_key<K: Hash>(key: &K) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}
