//! The contract between the upscaler and a graphics backend.

use crate::error::Result;
use crate::job::GpuJobDescription;
use crate::pass::Fsr2Pass;
use crate::pipeline::{PipelineDescription, PipelineState};
use crate::types::{CreateResourceDescription, ExternalResource, ResourceDescription, ResourceHandle};

/// Shader model tiers, lowest first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderModel {
    #[default]
    Sm5_1,
    Sm6_0,
    Sm6_1,
    Sm6_2,
    Sm6_3,
    Sm6_4,
    Sm6_5,
    Sm6_6,
}

/// Snapshot of what the device can do.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub minimum_supported_shader_model: ShaderModel,
    pub wave_lane_count_min: u32,
    pub wave_lane_count_max: u32,
    pub fp16_supported: bool,
    pub raytracing_supported: bool,
}

/// Operations the upscaler needs from a graphics backend.
///
/// All calls are synchronous and must come from one thread at a time.
pub trait Fsr2Backend {
    /// Query the device's feature support.
    fn device_capabilities(&self) -> Result<DeviceCapabilities>;

    /// Create a resource that lives until destroyed or until the backend is
    /// torn down.
    fn create_resource(&mut self, desc: &CreateResourceDescription<'_>) -> Result<ResourceHandle>;

    /// Wrap a host-owned resource for the current frame.
    fn register_resource(&mut self, resource: &ExternalResource) -> Result<ResourceHandle>;

    /// Forget every resource registered this frame.
    fn unregister_resources(&mut self) -> Result<()>;

    /// Description of a resource; all zero for the null handle.
    fn resource_description(&self, handle: ResourceHandle) -> ResourceDescription;

    fn destroy_resource(&mut self, handle: ResourceHandle) -> Result<()>;

    fn create_pipeline(
        &mut self,
        pass: Fsr2Pass,
        desc: &PipelineDescription,
    ) -> Result<PipelineState>;

    fn destroy_pipeline(&mut self, pipeline: &mut PipelineState) -> Result<()>;

    /// Queue a job. Nothing is submitted until [`execute_gpu_jobs`](Self::execute_gpu_jobs).
    fn schedule_gpu_job(&mut self, job: &GpuJobDescription<'_>) -> Result<()>;

    /// Run every queued job in schedule order and empty the queue.
    fn execute_gpu_jobs(&mut self) -> Result<()>;
}
