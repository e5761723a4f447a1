//! Backend-facing interface types for the FSR2 upscaler.
//!
//! The upscaler talks to a graphics API exclusively through the
//! [`Fsr2Backend`] trait and the plain-data types in this crate. Backends
//! (see the `fsr2-gl` crate) translate them into concrete GPU objects.
//!
//! # Overview
//!
//! - [`ResourceDescription`] / [`CreateResourceDescription`] /
//!   [`ExternalResource`] describe textures and buffers.
//! - [`ResourceHandle`] indexes a backend's resource table; the null handle
//!   short-circuits every operation.
//! - [`PipelineDescription`] / [`PipelineState`] describe compute pipelines
//!   and their binding layout.
//! - [`GpuJobDescription`] is a unit of deferred GPU work.
//! - [`Fsr2Error`] is the flat error taxonomy shared by every backend.

pub mod error;
pub mod interface;
pub mod job;
pub mod name;
pub mod pass;
pub mod pipeline;
pub mod types;

// Re-export primary types at crate root for convenience.
pub use error::{Fsr2Error, Result};
pub use interface::{DeviceCapabilities, Fsr2Backend, ShaderModel};
pub use job::{
    ClearFloatJobDescription, ComputeJobDescription, CopyJobDescription, GpuJobDescription,
    GpuJobKind,
};
pub use name::FixedName;
pub use pass::{Fsr2Pass, PASS_COUNT};
pub use pipeline::{
    ContextFlags, PipelineDescription, PipelineHandle, PipelineState, ResourceBinding,
    MAX_CONST_SIZE, MAX_NUM_CONST_BUFFERS, MAX_NUM_SRVS, MAX_NUM_UAVS,
};
pub use types::{
    CreateResourceDescription, ExternalResource, NativeResource, ResourceDescription,
    ResourceFlags, ResourceHandle, ResourceStates, ResourceType, SurfaceFormat,
};
