//! Pipeline descriptors handed to the driver.
//!
//! Both creation strategies — library linking and the monolithic fallback —
//! share the same fixed-function state, assembled in exactly one place:
//! [`FixedFunctionState::from_key`]. The strategies differ only in how the
//! programmable stages reach the driver (pre-compiled library handles vs.
//! inline stage code).

use smallvec::SmallVec;

use crate::driver::PipelineLayoutHandle;
use crate::key::{BlendComponentKey, DynamicStateFlags, PipelineStateKey};
use crate::shader::StageCode;

/// Which pipeline interface a single-stage library covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryInterface {
    /// Vertex-input interface (vertex stage libraries).
    VertexInput,
    /// Fragment-output interface (fragment stage libraries).
    FragmentOutput,
}

/// All fixed-function state of a pipeline, decoded from a
/// [`PipelineStateKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFunctionState {
    pub topology: wgpu::PrimitiveTopology,
    pub polygon_mode: wgpu::PolygonMode,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
    pub sample_count: u32,
    pub blend: Option<BlendComponentKey>,
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_compare: wgpu::CompareFunction,
    pub color_format: Option<wgpu::TextureFormat>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub dynamic_state: DynamicStateFlags,
}

impl FixedFunctionState {
    /// Decode the fixed-function portion of a state key.
    ///
    /// Single source of truth for descriptor assembly; used by both the
    /// link path and the monolithic path.
    #[must_use]
    pub fn from_key(key: &PipelineStateKey) -> Self {
        Self {
            topology: key.topology,
            polygon_mode: key.polygon_mode,
            cull_mode: key.cull_mode,
            front_face: key.front_face,
            sample_count: key.sample_count,
            blend: key.blend,
            depth_test_enabled: key.depth_test_enabled,
            depth_write_enabled: key.depth_write_enabled,
            depth_compare: key.depth_compare,
            color_format: key.color_format,
            depth_format: key.depth_format,
            dynamic_state: key.dynamic_state,
        }
    }
}

/// Descriptor for a self-contained (monolithic) pipeline create call.
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDescriptor {
    pub stages: SmallVec<[StageCode; 4]>,
    pub state: FixedFunctionState,
    pub layout: PipelineLayoutHandle,
}

/// Descriptor for a single-stage pipeline library create call.
#[derive(Debug, Clone)]
pub struct LibraryDescriptor {
    pub interface: LibraryInterface,
    pub code: StageCode,
    pub layout: PipelineLayoutHandle,
}
