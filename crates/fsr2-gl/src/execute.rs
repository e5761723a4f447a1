//! Execution of queued jobs.

use fsr2_core::{
    ClearFloatJobDescription, CopyJobDescription, Fsr2Error, ResourceHandle, ResourceStates,
    Result,
};
use gl::types::GLbitfield;
use tracing::{error, trace};

use crate::bytes::words_as_bytes;
use crate::device::{GlDevice, GlProgram, GlSampler};
use crate::format::gl_internal_format;
use crate::jobs::{ComputeJob, QueuedJob};
use crate::limits::UBO_SIZE;
use crate::resources::{Resource, ResourceStorage, ResourceTable};
use crate::uniform_ring::UniformRing;

/// Memory barrier bits that make prior writes visible to an access in
/// `state`.
pub fn barrier_bits(is_buffer: bool, state: ResourceStates) -> GLbitfield {
    let mut bits = 0;
    if is_buffer {
        if state.contains(ResourceStates::UNORDERED_ACCESS) {
            bits |= gl::SHADER_STORAGE_BARRIER_BIT;
        }
        // Buffer shader resources are bound as storage buffers.
        if state.contains(ResourceStates::COMPUTE_READ) {
            bits |= gl::SHADER_STORAGE_BARRIER_BIT | gl::UNIFORM_BARRIER_BIT;
        }
        if state.intersects(ResourceStates::COPY_SRC | ResourceStates::COPY_DEST) {
            bits |= gl::BUFFER_UPDATE_BARRIER_BIT | gl::PIXEL_BUFFER_BARRIER_BIT;
        }
    } else {
        if state.contains(ResourceStates::UNORDERED_ACCESS) {
            bits |= gl::SHADER_IMAGE_ACCESS_BARRIER_BIT;
        }
        if state.contains(ResourceStates::COMPUTE_READ) {
            bits |= gl::SHADER_IMAGE_ACCESS_BARRIER_BIT | gl::TEXTURE_FETCH_BARRIER_BIT;
        }
        if state.intersects(ResourceStates::COPY_SRC | ResourceStates::COPY_DEST) {
            bits |= gl::TEXTURE_UPDATE_BARRIER_BIT;
        }
    }
    bits
}

/// Everything a job needs from the context while it runs.
pub(crate) struct Executor<'a, D> {
    pub device: &'a D,
    pub resources: &'a ResourceTable,
    pub ring: &'a mut UniformRing,
    pub linear_sampler: GlSampler,
}

impl<D: GlDevice> Executor<'_, D> {
    /// Run `jobs` in order. Every job runs even if an earlier one failed;
    /// failures are reported as one error at the end.
    pub fn run_all(&mut self, jobs: impl IntoIterator<Item = QueuedJob>) -> Result<()> {
        let mut failed = 0usize;
        for job in jobs {
            if self.run(&job).is_err() {
                failed += 1;
            }
        }
        if failed > 0 {
            error!(failed, "gpu jobs failed");
            return Err(Fsr2Error::BackendApi("gpu job execution failed"));
        }
        Ok(())
    }

    pub fn run(&mut self, job: &QueuedJob) -> Result<()> {
        match job {
            QueuedJob::Compute(compute) => self.compute(compute),
            QueuedJob::ClearFloat(clear) => self.clear(clear),
            QueuedJob::Copy(copy) => copy_unsupported(copy),
        }
    }

    fn bound(&self, handle: ResourceHandle, what: &str, slot: u32) -> Result<&Resource> {
        match self.resources.get(handle) {
            Some(resource) if resource.storage != ResourceStorage::Empty => Ok(resource),
            _ => {
                error!(handle = handle.raw(), slot, "{what} binding has no resource");
                Err(Fsr2Error::BackendApi("bound resource is missing"))
            }
        }
    }

    fn compute(&mut self, job: &ComputeJob) -> Result<()> {
        let pipeline = &job.pipeline;
        let Some(program) = pipeline.pipeline else {
            error!("compute job without a pipeline");
            return Err(Fsr2Error::BackendApi("compute job without a pipeline"));
        };

        if pipeline.uav_count > 0 {
            let mut barriers = 0;
            for handle in &job.uavs[..pipeline.uav_count as usize] {
                let is_buffer = self.resources.description(*handle).resource_type.is_buffer();
                barriers |= barrier_bits(is_buffer, ResourceStates::UNORDERED_ACCESS);
            }
            self.device.memory_barrier(barriers);

            for (i, binding) in pipeline.uavs().iter().enumerate() {
                let resource = self.bound(job.uavs[i], "uav", binding.slot_index)?;
                match resource.storage {
                    ResourceStorage::Buffer(buffer) => self.device.bind_buffer_range(
                        gl::SHADER_STORAGE_BUFFER,
                        binding.slot_index,
                        buffer,
                        0,
                        resource.description.width as usize,
                    ),
                    _ => {
                        let mip = job.uav_mips[i];
                        let view = resource.storage.mip_view(mip).ok_or_else(|| {
                            error!(slot = binding.slot_index, mip, "uav mip has no view");
                            Fsr2Error::BackendApi("uav mip has no view")
                        })?;
                        self.device.bind_image_texture(
                            binding.slot_index,
                            view,
                            0,
                            true,
                            0,
                            gl::READ_WRITE,
                            gl_internal_format(resource.description.format),
                        );
                    }
                }
            }
        }

        if pipeline.srv_count > 0 {
            let mut barriers = 0;
            for handle in &job.srvs[..pipeline.srv_count as usize] {
                let is_buffer = self.resources.description(*handle).resource_type.is_buffer();
                barriers |= barrier_bits(is_buffer, ResourceStates::COMPUTE_READ);
            }
            self.device.memory_barrier(barriers);

            for (i, binding) in pipeline.srvs().iter().enumerate() {
                let resource = self.bound(job.srvs[i], "srv", binding.slot_index)?;
                match resource.storage {
                    ResourceStorage::Buffer(buffer) => self.device.bind_buffer_range(
                        gl::SHADER_STORAGE_BUFFER,
                        binding.slot_index,
                        buffer,
                        0,
                        resource.description.width as usize,
                    ),
                    _ => {
                        let Some(texture) = resource.storage.all_mips() else {
                            return Err(Fsr2Error::BackendApi("srv has no texture"));
                        };
                        self.device.bind_texture_unit(binding.slot_index, texture);
                        self.device.bind_sampler(binding.slot_index, self.linear_sampler);
                    }
                }
            }
        }

        for (binding, cb) in pipeline.cbs().iter().zip(&job.cbs) {
            let words = cb.words();
            let slot = self
                .ring
                .acquire(std::mem::size_of_val(words), Some(words_as_bytes(words)));
            self.device.bind_buffer_range(
                gl::UNIFORM_BUFFER,
                binding.slot_index,
                slot.buffer(),
                0,
                UBO_SIZE,
            );
        }

        self.device.use_program(GlProgram(program.raw() as u32));
        let [x, y, z] = job.dimensions;
        self.device.dispatch_compute(x, y, z);
        Ok(())
    }

    fn clear(&mut self, job: &ClearFloatJobDescription) -> Result<()> {
        if job.target.is_null() {
            trace!("clear of the null resource skipped");
            return Ok(());
        }
        let resource = self.bound(job.target, "clear", 0)?;
        let texture = match resource.storage {
            ResourceStorage::Buffer(_) => {
                trace!(handle = job.target.raw(), "clear of a buffer skipped");
                return Ok(());
            }
            storage => storage
                .all_mips()
                .ok_or(Fsr2Error::BackendApi("clear target has no texture"))?,
        };

        self.device
            .memory_barrier(barrier_bits(false, ResourceStates::COPY_DEST));
        for mip in 0..resource.description.mip_count.max(1) {
            self.device
                .clear_tex_image(texture, mip, gl::RGBA, gl::FLOAT, &job.color);
        }
        Ok(())
    }
}

fn copy_unsupported(job: &CopyJobDescription) -> Result<()> {
    panic!(
        "copy jobs are not supported by the OpenGL backend (src {}, dst {})",
        job.src.raw(),
        job.dst.raw()
    );
}
