//! Pipeline descriptions and the binding layout of a built pipeline.

use std::num::NonZeroU64;

use bitflags::bitflags;

use crate::name::FixedName;

/// Maximum shader-resource (sampled) bindings per pipeline.
pub const MAX_NUM_SRVS: usize = 16;
/// Maximum unordered-access (storage) bindings per pipeline.
pub const MAX_NUM_UAVS: usize = 8;
/// Maximum constant buffers per pipeline.
pub const MAX_NUM_CONST_BUFFERS: usize = 2;
/// Maximum size of one constant buffer, in 32-bit words.
pub const MAX_CONST_SIZE: usize = 64;

bitflags! {
    /// Upscaler context options that influence permutation selection.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u32 {
        const ENABLE_HIGH_DYNAMIC_RANGE = 1 << 0;
        const ENABLE_DISPLAY_RESOLUTION_MOTION_VECTORS = 1 << 1;
        const ENABLE_MOTION_VECTORS_JITTER_CANCELLATION = 1 << 2;
        const ENABLE_DEPTH_INVERTED = 1 << 3;
        const ENABLE_DEPTH_INFINITE = 1 << 4;
        const ENABLE_AUTO_EXPOSURE = 1 << 5;
        const ENABLE_DYNAMIC_RESOLUTION = 1 << 6;
        const ENABLE_TEXTURE1D_USAGE = 1 << 7;
    }
}

/// Input to pipeline creation.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineDescription {
    pub context_flags: ContextFlags,
}

/// Opaque backend pipeline object (a GL program name, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(NonZeroU64);

impl PipelineHandle {
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// A named binding slot declared by a shader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBinding {
    pub slot_index: u32,
    pub name: FixedName,
}

/// A built pipeline and its binding layout.
///
/// Plain data so the job queue can copy it by value.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineState {
    pub pipeline: Option<PipelineHandle>,
    pub srv_count: u32,
    pub uav_count: u32,
    pub const_count: u32,
    pub srv_bindings: [ResourceBinding; MAX_NUM_SRVS],
    pub uav_bindings: [ResourceBinding; MAX_NUM_UAVS],
    pub cb_bindings: [ResourceBinding; MAX_NUM_CONST_BUFFERS],
}

impl PipelineState {
    pub fn srvs(&self) -> &[ResourceBinding] {
        &self.srv_bindings[..self.srv_count as usize]
    }

    pub fn uavs(&self) -> &[ResourceBinding] {
        &self.uav_bindings[..self.uav_count as usize]
    }

    pub fn cbs(&self) -> &[ResourceBinding] {
        &self.cb_bindings[..self.const_count as usize]
    }
}
