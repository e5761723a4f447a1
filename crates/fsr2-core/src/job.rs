//! Descriptions of deferred GPU work.
//!
//! A description may borrow caller memory (constant payloads on the stack,
//! for example). Backends copy everything they need when the job is
//! scheduled.

use num_derive::FromPrimitive;

use crate::pipeline::{PipelineState, MAX_NUM_CONST_BUFFERS, MAX_NUM_SRVS, MAX_NUM_UAVS};
use crate::types::ResourceHandle;

/// Discriminant of a [`GpuJobDescription`], numbered as on the C interface.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum GpuJobKind {
    ClearFloat = 0,
    Copy,
    Compute,
}

/// Fill every mip of a texture with a constant colour.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClearFloatJobDescription {
    pub color: [f32; 4],
    pub target: ResourceHandle,
}

/// Copy one resource into another.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyJobDescription {
    pub src: ResourceHandle,
    pub dst: ResourceHandle,
}

/// A compute dispatch with its bindings.
///
/// Only the first `pipeline.srv_count` / `uav_count` / `const_count` entries of
/// the binding arrays are read.
#[derive(Debug, Clone, Copy)]
pub struct ComputeJobDescription<'a> {
    pub pipeline: &'a PipelineState,
    /// Work-group counts in x, y and z.
    pub dimensions: [u32; 3],
    pub srvs: [ResourceHandle; MAX_NUM_SRVS],
    pub uavs: [ResourceHandle; MAX_NUM_UAVS],
    /// Mip level bound for each UAV.
    pub uav_mips: [u32; MAX_NUM_UAVS],
    /// Constant buffer payloads in 32-bit words.
    pub cbs: [&'a [u32]; MAX_NUM_CONST_BUFFERS],
}

impl<'a> ComputeJobDescription<'a> {
    /// A dispatch with every binding set to the null handle.
    pub fn new(pipeline: &'a PipelineState, dimensions: [u32; 3]) -> Self {
        Self {
            pipeline,
            dimensions,
            srvs: [ResourceHandle::NULL; MAX_NUM_SRVS],
            uavs: [ResourceHandle::NULL; MAX_NUM_UAVS],
            uav_mips: [0; MAX_NUM_UAVS],
            cbs: [&[] as &[u32]; MAX_NUM_CONST_BUFFERS],
        }
    }
}

/// One unit of deferred GPU work.
#[derive(Debug, Clone, Copy)]
pub enum GpuJobDescription<'a> {
    ClearFloat(ClearFloatJobDescription),
    Copy(CopyJobDescription),
    Compute(ComputeJobDescription<'a>),
}

impl GpuJobDescription<'_> {
    pub fn kind(&self) -> GpuJobKind {
        match self {
            Self::ClearFloat(_) => GpuJobKind::ClearFloat,
            Self::Copy(_) => GpuJobKind::Copy,
            Self::Compute(_) => GpuJobKind::Compute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn job_kinds_convert_from_raw_codes() {
        assert_eq!(GpuJobKind::from_u32(0), Some(GpuJobKind::ClearFloat));
        assert_eq!(GpuJobKind::from_u32(2), Some(GpuJobKind::Compute));
        assert_eq!(GpuJobKind::from_u32(3), None);
    }

    #[test]
    fn kind_matches_variant() {
        let pipeline = PipelineState::default();
        let compute = GpuJobDescription::Compute(ComputeJobDescription::new(&pipeline, [1, 1, 1]));
        assert_eq!(compute.kind(), GpuJobKind::Compute);
        assert_eq!(
            GpuJobDescription::Copy(CopyJobDescription::default()).kind(),
            GpuJobKind::Copy
        );
    }
}
