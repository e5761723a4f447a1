//! OpenGL 4.6 backend for the FSR2 upscaler.
//!
//! This crate implements [`fsr2_core::Fsr2Backend`] on top of a host-supplied
//! [`GlDevice`] function table. All GPU work goes through compute programs
//! built from precompiled SPIR-V permutations.
//!
//! # Overview
//!
//! - [`BackendContext`] owns every GL object the backend creates and
//!   implements the backend trait.
//! - [`ResourceTable`] holds static (backend-owned) and dynamic (registered,
//!   per-frame) resources in one fixed array.
//! - [`UniformRing`] recycles persistently mapped uniform buffers.
//! - [`JobQueue`] buffers jobs until [`execute_gpu_jobs`] flushes them with
//!   the memory barriers each binding needs.
//! - [`PermutationSource`] / [`PermutationTable`] supply the shader blobs.
//! - [`interop`] wraps host textures and buffers for registration.
//!
//! [`execute_gpu_jobs`]: fsr2_core::Fsr2Backend::execute_gpu_jobs

mod bytes;
pub mod capabilities;
pub mod context;
pub mod device;
pub mod execute;
pub mod format;
pub mod interop;
pub mod jobs;
pub mod limits;
pub mod pipeline;
pub mod resources;
pub mod shaders;
pub mod uniform_ring;

// Re-export primary types at crate root for convenience.
pub use capabilities::probe_capabilities;
pub use context::{BackendContext, PlacedContext};
pub use device::{
    GlBuffer, GlDevice, GlProgram, GlSampler, GlShader, GlTexture, TextureExtent, LABELS_ENABLED,
};
pub use execute::barrier_bits;
pub use format::{gl_internal_format, gl_upload_format, gl_upload_type, is_depth_format, surface_format};
pub use interop::{buffer_resource, texture_resource};
pub use jobs::{ComputeJob, ConstantBuffer, JobQueue, QueuedJob};
pub use pipeline::permutation_flags;
pub use resources::{Aspect, Ownership, Resource, ResourceStorage, ResourceTable};
pub use shaders::{BlobBinding, PermutationFlags, PermutationSource, PermutationTable, ShaderBlob};
pub use uniform_ring::{UniformRing, UniformSlot};
