//! Fixed capacities of the backend's containers.
//!
//! Everything is sized up front so steady-state frames never allocate.

use fsr2_core::PASS_COUNT;

/// Frames the host may have in flight at once.
pub const MAX_QUEUED_FRAMES: usize = 4;
/// Slots in the resource table (static and dynamic regions combined).
pub const MAX_RESOURCE_COUNT: usize = 64;
/// Jobs that can be queued between two executions.
pub const MAX_GPU_JOBS: usize = 32;
/// Constant buffers a single pass may bind.
pub const MAX_UNIFORM_BUFFERS: usize = 4;
/// Single-mip views per texture; enough for any 32-bit extent.
pub const MAX_IMAGE_VIEWS: usize = 32;
pub const MAX_BUFFERED_DESCRIPTORS: usize = PASS_COUNT * MAX_QUEUED_FRAMES;
/// Uniform buffers in the ring.
pub const UBO_RING_BUFFER_SIZE: usize = MAX_BUFFERED_DESCRIPTORS * MAX_UNIFORM_BUFFERS;
/// Size of every uniform buffer in the ring, in bytes.
pub const UBO_SIZE: usize = 256;
