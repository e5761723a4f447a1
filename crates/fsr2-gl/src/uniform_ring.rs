//! Ring of persistently mapped uniform buffers.
//!
//! Every buffer is allocated and mapped once at context creation. Acquiring a
//! slot copies the payload straight into coherent mapped memory, so frames
//! never create buffers. Slots are reused round-robin; the ring is sized for
//! every pass of every frame in flight, so a slot is not overwritten while
//! the GPU may still read it.

use std::ptr::NonNull;

use fsr2_core::{Fsr2Error, Result};
use gl::types::GLbitfield;
use tracing::error;

use crate::device::{GlBuffer, GlDevice};
use crate::limits::{UBO_RING_BUFFER_SIZE, UBO_SIZE};

const MAP_FLAGS: GLbitfield = gl::MAP_WRITE_BIT | gl::MAP_PERSISTENT_BIT | gl::MAP_COHERENT_BIT;

/// One uniform buffer and its mapping.
#[derive(Debug, Clone, Copy)]
pub struct UniformSlot {
    buffer: GlBuffer,
    mapped: Option<NonNull<u8>>,
}

impl UniformSlot {
    const EMPTY: Self = Self {
        buffer: GlBuffer::NULL,
        mapped: None,
    };

    pub fn buffer(&self) -> GlBuffer {
        self.buffer
    }
}

#[derive(Debug)]
pub struct UniformRing {
    slots: [UniformSlot; UBO_RING_BUFFER_SIZE],
    index: usize,
}

impl UniformRing {
    /// Allocate and map every slot. On failure the buffers created so far
    /// are deleted.
    pub fn create<D: GlDevice>(device: &D) -> Result<Self> {
        let mut ring = Self {
            slots: [UniformSlot::EMPTY; UBO_RING_BUFFER_SIZE],
            index: 0,
        };

        for i in 0..UBO_RING_BUFFER_SIZE {
            let buffer = device.create_buffer();
            if buffer.is_null() {
                error!(slot = i, "glCreateBuffers failed for uniform ring");
                ring.destroy(device);
                return Err(Fsr2Error::BackendApi("uniform buffer creation failed"));
            }
            ring.slots[i].buffer = buffer;

            device.named_buffer_storage(buffer, UBO_SIZE, None, MAP_FLAGS);
            let Some(mapped) = device.map_named_buffer_range(buffer, 0, UBO_SIZE, MAP_FLAGS) else {
                error!(slot = i, buffer = buffer.id(), "persistent map of uniform buffer failed");
                ring.destroy(device);
                return Err(Fsr2Error::BackendApi("uniform buffer mapping failed"));
            };
            ring.slots[i].mapped = Some(mapped);
        }

        Ok(ring)
    }

    /// Index of the slot the next [`acquire`](Self::acquire) returns.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Take the next slot, copying `data` into it when given.
    ///
    /// # Panics
    ///
    /// If `size` exceeds [`UBO_SIZE`] or is smaller than `data`.
    pub fn acquire(&mut self, size: usize, data: Option<&[u8]>) -> UniformSlot {
        assert!(size <= UBO_SIZE, "uniform payload of {size} bytes exceeds {UBO_SIZE}");

        let slot = self.slots[self.index];
        if let (Some(data), Some(mapped)) = (data, slot.mapped) {
            let data = &data[..size];
            // SAFETY: the mapping covers UBO_SIZE writable bytes for as long
            // as the buffer lives (GlDevice contract) and size <= UBO_SIZE.
            unsafe {
                std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.as_ptr(), data.len());
            }
        }

        self.index = (self.index + 1) % UBO_RING_BUFFER_SIZE;
        slot
    }

    /// Delete every buffer. Deleting a buffer also unmaps it.
    pub fn destroy<D: GlDevice>(&mut self, device: &D) {
        for slot in &mut self.slots {
            if !slot.buffer.is_null() {
                device.delete_buffer(slot.buffer);
            }
            *slot = UniformSlot::EMPTY;
        }
        self.index = 0;
    }
}
