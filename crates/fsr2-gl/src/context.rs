//! The OpenGL backend context.
//!
//! [`BackendContext`] owns every GL object the backend creates: samplers, the
//! uniform ring, backend-owned resources and their views. It implements
//! [`Fsr2Backend`] on top of a [`GlDevice`].
//!
//! The context never allocates after creation. Hosts that manage memory
//! themselves can place it in caller-provided scratch bytes with
//! [`BackendContext::create_in`].

use std::mem::{align_of, size_of};
use std::ops::{Deref, DerefMut};

use fsr2_core::{
    CreateResourceDescription, DeviceCapabilities, ExternalResource, Fsr2Backend, Fsr2Error,
    Fsr2Pass, GpuJobDescription, PipelineDescription, PipelineState, ResourceDescription,
    ResourceHandle, Result,
};
use gl::types::{GLenum, GLuint};
use tracing::{debug, error};

use crate::capabilities::probe_capabilities;
use crate::device::{GlDevice, GlSampler};
use crate::execute::Executor;
use crate::jobs::JobQueue;
use crate::pipeline;
use crate::resources::ResourceTable;
use crate::shaders::PermutationSource;
use crate::uniform_ring::UniformRing;

const TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FE;

/// Backend state for one upscaling context.
///
/// Not `Send` or `Sync`: it holds pointers into persistently mapped GL
/// memory and must stay on the thread that owns the GL context.
pub struct BackendContext<D: GlDevice, P: PermutationSource> {
    device: D,
    permutations: P,
    capabilities: DeviceCapabilities,
    resources: ResourceTable,
    ring: UniformRing,
    jobs: JobQueue,
    point_sampler: GlSampler,
    linear_sampler: GlSampler,
    released: bool,
}

impl<D: GlDevice, P: PermutationSource> BackendContext<D, P> {
    /// Probe the device and create samplers and the uniform ring.
    ///
    /// Fails if the device lacks compute subgroup support or a uniform
    /// buffer cannot be persistently mapped. Nothing is leaked on failure.
    pub fn new(device: D, permutations: P) -> Result<Self> {
        let capabilities = probe_capabilities(&device)?;

        let point_sampler = create_sampler(&device, gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST)?;
        let linear_sampler = match create_sampler(&device, gl::LINEAR_MIPMAP_NEAREST, gl::LINEAR) {
            Ok(sampler) => sampler,
            Err(err) => {
                device.delete_sampler(point_sampler);
                return Err(err);
            }
        };
        let ring = match UniformRing::create(&device) {
            Ok(ring) => ring,
            Err(err) => {
                device.delete_sampler(point_sampler);
                device.delete_sampler(linear_sampler);
                return Err(err);
            }
        };

        debug!(?capabilities, "created OpenGL backend context");
        Ok(Self {
            device,
            permutations,
            capabilities,
            resources: ResourceTable::new(),
            ring,
            jobs: JobQueue::new(),
            point_sampler,
            linear_sampler,
            released: false,
        })
    }

    /// Bytes of scratch memory [`create_in`](Self::create_in) needs,
    /// including worst-case alignment padding.
    pub fn scratch_memory_size() -> usize {
        size_of::<Self>() + align_of::<Self>() - 1
    }

    /// Create a context inside `scratch`.
    ///
    /// The context is destroyed when the returned guard is dropped or passed
    /// to [`destroy_context`](Self::destroy_context).
    pub fn create_in(
        scratch: &mut [u8],
        device: D,
        permutations: P,
    ) -> Result<PlacedContext<'_, D, P>> {
        let provided = scratch.len();
        let offset = scratch.as_mut_ptr().align_offset(align_of::<Self>());
        let fits = offset
            .checked_add(size_of::<Self>())
            .is_some_and(|end| end <= provided);
        if !fits {
            error!(
                required = Self::scratch_memory_size(),
                provided, "scratch memory too small for backend context"
            );
            return Err(Fsr2Error::InsufficientMemory {
                required: Self::scratch_memory_size(),
                provided,
            });
        }

        let context = Self::new(device, permutations)?;
        // SAFETY: `offset` aligns the pointer for `Self` and the checks above
        // keep `size_of::<Self>()` bytes in bounds. The slice is borrowed
        // mutably for the guard's lifetime, so nothing else can touch it.
        let context = unsafe {
            let slot = scratch.as_mut_ptr().add(offset).cast::<Self>();
            slot.write(context);
            &mut *slot
        };
        Ok(PlacedContext { context })
    }

    /// Destroy a context placed with [`create_in`](Self::create_in).
    pub fn destroy_context(context: PlacedContext<'_, D, P>) {
        drop(context);
    }

    /// Release every GL object the context owns. Called by `Drop`; calling it
    /// again is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        self.jobs.drain().for_each(drop);
        self.resources.destroy_all_owned(&self.device);
        self.ring.destroy(&self.device);
        self.device.delete_sampler(self.point_sampler);
        self.device.delete_sampler(self.linear_sampler);
        self.point_sampler = GlSampler::NULL;
        self.linear_sampler = GlSampler::NULL;
        debug!("destroyed OpenGL backend context");
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Capabilities probed at creation.
    pub fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn jobs(&self) -> &JobQueue {
        &self.jobs
    }

    /// Slot the next uniform upload will use.
    pub fn ring_index(&self) -> usize {
        self.ring.index()
    }

    pub fn point_sampler(&self) -> GlSampler {
        self.point_sampler
    }

    pub fn linear_sampler(&self) -> GlSampler {
        self.linear_sampler
    }

    /// GL name of the all-mips view of `handle`, or 0 for the null handle.
    pub fn gl_image(&self, handle: ResourceHandle) -> GLuint {
        self.resources
            .get(handle)
            .and_then(|resource| resource.storage.all_mips())
            .map_or(0, |texture| texture.id())
    }
}

impl<D: GlDevice, P: PermutationSource> Drop for BackendContext<D, P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: GlDevice, P: PermutationSource> Fsr2Backend for BackendContext<D, P> {
    fn device_capabilities(&self) -> Result<DeviceCapabilities> {
        Ok(self.capabilities)
    }

    fn create_resource(&mut self, desc: &CreateResourceDescription<'_>) -> Result<ResourceHandle> {
        self.resources.create(&self.device, desc)
    }

    fn register_resource(&mut self, resource: &ExternalResource) -> Result<ResourceHandle> {
        self.resources.register(resource)
    }

    fn unregister_resources(&mut self) -> Result<()> {
        self.resources.unregister_frame();
        Ok(())
    }

    fn resource_description(&self, handle: ResourceHandle) -> ResourceDescription {
        self.resources.description(handle)
    }

    fn destroy_resource(&mut self, handle: ResourceHandle) -> Result<()> {
        self.resources.destroy(&self.device, handle);
        Ok(())
    }

    fn create_pipeline(
        &mut self,
        pass: Fsr2Pass,
        desc: &PipelineDescription,
    ) -> Result<PipelineState> {
        pipeline::create_pipeline(&self.device, &self.permutations, pass, desc)
    }

    fn destroy_pipeline(&mut self, pipeline: &mut PipelineState) -> Result<()> {
        pipeline::destroy_pipeline(&self.device, pipeline);
        Ok(())
    }

    fn schedule_gpu_job(&mut self, job: &GpuJobDescription<'_>) -> Result<()> {
        self.jobs.schedule(job)
    }

    fn execute_gpu_jobs(&mut self) -> Result<()> {
        let mut executor = Executor {
            device: &self.device,
            resources: &self.resources,
            ring: &mut self.ring,
            linear_sampler: self.linear_sampler,
        };
        executor.run_all(self.jobs.drain())
    }
}

/// A [`BackendContext`] living in caller-provided scratch memory.
///
/// Dropping the guard destroys the context in place; the scratch bytes can
/// be reused afterwards.
pub struct PlacedContext<'s, D: GlDevice, P: PermutationSource> {
    context: &'s mut BackendContext<D, P>,
}

impl<D: GlDevice, P: PermutationSource> Deref for PlacedContext<'_, D, P> {
    type Target = BackendContext<D, P>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<D: GlDevice, P: PermutationSource> DerefMut for PlacedContext<'_, D, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<D: GlDevice, P: PermutationSource> Drop for PlacedContext<'_, D, P> {
    fn drop(&mut self) {
        // SAFETY: the context was written by `create_in` and is dropped
        // exactly once, here.
        unsafe { std::ptr::drop_in_place(self.context as *mut BackendContext<D, P>) };
    }
}

fn create_sampler<D: GlDevice>(device: &D, min_filter: GLenum, mag_filter: GLenum) -> Result<GlSampler> {
    let sampler = device.create_sampler();
    if sampler.is_null() {
        error!("glCreateSamplers failed");
        return Err(Fsr2Error::BackendApi("sampler creation failed"));
    }
    device.sampler_parameter_i(sampler, gl::TEXTURE_MIN_FILTER, min_filter as i32);
    device.sampler_parameter_i(sampler, gl::TEXTURE_MAG_FILTER, mag_filter as i32);
    for wrap in [gl::TEXTURE_WRAP_S, gl::TEXTURE_WRAP_T, gl::TEXTURE_WRAP_R] {
        device.sampler_parameter_i(sampler, wrap, gl::CLAMP_TO_EDGE as i32);
    }
    device.sampler_parameter_f(sampler, gl::TEXTURE_MIN_LOD, -1000.0);
    device.sampler_parameter_f(sampler, gl::TEXTURE_MAX_LOD, 1000.0);
    device.sampler_parameter_f(sampler, TEXTURE_MAX_ANISOTROPY, 1.0);
    Ok(sampler)
}
