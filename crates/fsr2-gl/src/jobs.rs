//! The deferred GPU job queue.
//!
//! Jobs are copied by value when scheduled, constant payloads included, so a
//! description may borrow caller memory that is gone by execution time.

use fsr2_core::{
    ClearFloatJobDescription, ComputeJobDescription, CopyJobDescription, Fsr2Error,
    GpuJobDescription, PipelineState, ResourceHandle, Result, MAX_CONST_SIZE,
    MAX_NUM_CONST_BUFFERS, MAX_NUM_SRVS, MAX_NUM_UAVS,
};
use tracing::error;

use crate::limits::MAX_GPU_JOBS;

/// An inline copy of one constant buffer payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBuffer {
    pub uint32_size: u32,
    pub data: [u32; MAX_CONST_SIZE],
}

impl ConstantBuffer {
    pub const EMPTY: Self = Self {
        uint32_size: 0,
        data: [0; MAX_CONST_SIZE],
    };

    /// Copy `words` into a new buffer.
    ///
    /// # Panics
    ///
    /// If `words` is longer than [`MAX_CONST_SIZE`].
    pub fn from_words(words: &[u32]) -> Self {
        assert!(
            words.len() <= MAX_CONST_SIZE,
            "constant buffer of {} words exceeds {MAX_CONST_SIZE}",
            words.len()
        );
        let mut cb = Self::EMPTY;
        cb.data[..words.len()].copy_from_slice(words);
        cb.uint32_size = words.len() as u32;
        cb
    }

    pub fn words(&self) -> &[u32] {
        &self.data[..self.uint32_size as usize]
    }
}

/// A compute dispatch that owns everything it needs.
#[derive(Debug, Clone, Copy)]
pub struct ComputeJob {
    pub pipeline: PipelineState,
    pub dimensions: [u32; 3],
    pub srvs: [ResourceHandle; MAX_NUM_SRVS],
    pub uavs: [ResourceHandle; MAX_NUM_UAVS],
    pub uav_mips: [u32; MAX_NUM_UAVS],
    pub cbs: [ConstantBuffer; MAX_NUM_CONST_BUFFERS],
}

impl ComputeJob {
    fn copy_from(desc: &ComputeJobDescription<'_>) -> Self {
        let pipeline = *desc.pipeline;
        let mut cbs = [ConstantBuffer::EMPTY; MAX_NUM_CONST_BUFFERS];
        for (cb, payload) in cbs
            .iter_mut()
            .zip(desc.cbs)
            .take(pipeline.const_count as usize)
        {
            *cb = ConstantBuffer::from_words(payload);
        }
        Self {
            pipeline,
            dimensions: desc.dimensions,
            srvs: desc.srvs,
            uavs: desc.uavs,
            uav_mips: desc.uav_mips,
            cbs,
        }
    }
}

/// A job as stored in the queue.
#[derive(Debug, Clone, Copy)]
pub enum QueuedJob {
    ClearFloat(ClearFloatJobDescription),
    Copy(CopyJobDescription),
    Compute(ComputeJob),
}

impl From<&GpuJobDescription<'_>> for QueuedJob {
    fn from(desc: &GpuJobDescription<'_>) -> Self {
        match desc {
            GpuJobDescription::ClearFloat(clear) => Self::ClearFloat(*clear),
            GpuJobDescription::Copy(copy) => Self::Copy(*copy),
            GpuJobDescription::Compute(compute) => Self::Compute(ComputeJob::copy_from(compute)),
        }
    }
}

/// Fixed-capacity FIFO of jobs awaiting execution.
#[derive(Debug)]
pub struct JobQueue {
    jobs: [Option<QueuedJob>; MAX_GPU_JOBS],
    count: usize,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            jobs: [None; MAX_GPU_JOBS],
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append a copy of `desc`.
    pub fn schedule(&mut self, desc: &GpuJobDescription<'_>) -> Result<()> {
        if self.count == MAX_GPU_JOBS {
            error!(kind = ?desc.kind(), "gpu job queue is full");
            return Err(Fsr2Error::CapacityExceeded {
                container: "gpu job queue",
                capacity: MAX_GPU_JOBS,
            });
        }
        self.jobs[self.count] = Some(QueuedJob::from(desc));
        self.count += 1;
        Ok(())
    }

    /// Jobs waiting for execution, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &QueuedJob> {
        self.jobs[..self.count].iter().flatten()
    }

    /// Empty the queue and hand out the jobs it held, oldest first.
    ///
    /// The queue is already empty when this returns, so an aborted
    /// execution leaves nothing behind.
    pub fn drain(&mut self) -> impl Iterator<Item = QueuedJob> + '_ {
        let count = std::mem::take(&mut self.count);
        self.jobs[..count].iter_mut().filter_map(Option::take)
    }
}
