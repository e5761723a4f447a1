//! The fixed-capacity resource table.
//!
//! Static resources (created by the backend) are allocated upward from slot
//! 0 and live until destroyed. Dynamic resources (registered host objects)
//! are allocated downward from the last slot and are forgotten wholesale at
//! the end of every frame. The two regions share [`MAX_RESOURCE_COUNT`]
//! slots.

use fsr2_core::{
    CreateResourceDescription, ExternalResource, FixedName, Fsr2Error, ResourceDescription,
    ResourceHandle, ResourceType, Result,
};
use gl::types::GLenum;
use tracing::{error, trace};

use crate::device::{label_object, GlBuffer, GlDevice, GlTexture, TextureExtent};
use crate::format::{gl_internal_format, gl_upload_format, gl_upload_type};
use crate::limits::{MAX_IMAGE_VIEWS, MAX_RESOURCE_COUNT};

/// Who deletes the GL objects of a slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Created by the backend; deleted on destroy or teardown.
    #[default]
    Owned,
    /// Registered host object; never deleted by the backend.
    Borrowed,
}

/// Which planes of a texture shaders access.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    #[default]
    Undefined,
    Color,
    Depth,
}

/// GL objects backing a slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStorage {
    #[default]
    Empty,
    Buffer(GlBuffer),
    Texture {
        /// View over every mip level; the texture itself for owned resources.
        all_mips: GlTexture,
        /// One view per mip level, for image bindings.
        single_mips: [GlTexture; MAX_IMAGE_VIEWS],
    },
}

impl ResourceStorage {
    pub fn buffer(&self) -> Option<GlBuffer> {
        match *self {
            Self::Buffer(buffer) if !buffer.is_null() => Some(buffer),
            _ => None,
        }
    }

    pub fn all_mips(&self) -> Option<GlTexture> {
        match *self {
            Self::Texture { all_mips, .. } if !all_mips.is_null() => Some(all_mips),
            _ => None,
        }
    }

    pub fn mip_view(&self, mip: u32) -> Option<GlTexture> {
        match self {
            Self::Texture { single_mips, .. } => single_mips
                .get(mip as usize)
                .copied()
                .filter(|view| !view.is_null()),
            _ => None,
        }
    }
}

/// One slot of the table.
#[derive(Debug, Default, Clone, Copy)]
pub struct Resource {
    pub description: ResourceDescription,
    pub storage: ResourceStorage,
    pub ownership: Ownership,
    pub aspect: Aspect,
    #[cfg(any(debug_assertions, feature = "debug-labels"))]
    name: FixedName,
}

impl Resource {
    /// Debug name; empty when labels are compiled out.
    pub fn name(&self) -> &str {
        #[cfg(any(debug_assertions, feature = "debug-labels"))]
        {
            self.name.as_str()
        }
        #[cfg(not(any(debug_assertions, feature = "debug-labels")))]
        {
            ""
        }
    }

    #[allow(unused_variables)]
    fn set_name(&mut self, name: &FixedName) {
        #[cfg(any(debug_assertions, feature = "debug-labels"))]
        {
            self.name = *name;
        }
    }
}

/// GL texture target for a texture resource type.
pub fn texture_target(resource_type: ResourceType) -> Option<GLenum> {
    match resource_type {
        ResourceType::Buffer => None,
        ResourceType::Texture1D => Some(gl::TEXTURE_1D),
        ResourceType::Texture2D => Some(gl::TEXTURE_2D),
        ResourceType::Texture3D => Some(gl::TEXTURE_3D),
    }
}

fn texture_extent(desc: &ResourceDescription) -> TextureExtent {
    match desc.resource_type {
        ResourceType::Texture1D | ResourceType::Buffer => TextureExtent::D1 { width: desc.width },
        ResourceType::Texture2D => TextureExtent::D2 {
            width: desc.width,
            height: desc.height,
        },
        ResourceType::Texture3D => TextureExtent::D3 {
            width: desc.width,
            height: desc.height,
            depth: desc.depth,
        },
    }
}

/// Slots plus the two allocation boundaries.
#[derive(Debug)]
pub struct ResourceTable {
    slots: [Resource; MAX_RESOURCE_COUNT],
    next_static: usize,
    dynamic_count: usize,
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTable {
    pub fn new() -> Self {
        Self {
            slots: [Resource::default(); MAX_RESOURCE_COUNT],
            next_static: 0,
            dynamic_count: 0,
        }
    }

    /// Index the next static resource will get.
    pub fn next_static(&self) -> usize {
        self.next_static
    }

    /// Index the next dynamic resource will get, or `None` when the dynamic
    /// region has reached slot 0.
    pub fn next_dynamic(&self) -> Option<usize> {
        (MAX_RESOURCE_COUNT - 1).checked_sub(self.dynamic_count)
    }

    fn has_free_slot(&self) -> bool {
        self.next_static + self.dynamic_count < MAX_RESOURCE_COUNT
    }

    fn capacity_error() -> Fsr2Error {
        Fsr2Error::CapacityExceeded {
            container: "resource table",
            capacity: MAX_RESOURCE_COUNT,
        }
    }

    /// Create a backend-owned buffer or texture in the static region.
    pub fn create<D: GlDevice>(
        &mut self,
        device: &D,
        create: &CreateResourceDescription<'_>,
    ) -> Result<ResourceHandle> {
        if !self.has_free_slot() {
            error!(name = create.name, "resource table is full");
            return Err(Self::capacity_error());
        }

        let mut description = create.description;
        if description.mip_count == 0 {
            description.mip_count = description.full_mip_count();
        }
        let name = FixedName::new(create.name);

        let mut resource = Resource {
            description,
            ownership: Ownership::Owned,
            ..Default::default()
        };
        resource.set_name(&name);

        match texture_target(description.resource_type) {
            None => resource.storage = ResourceStorage::Buffer(create_buffer(device, create, &name)?),
            Some(target) => {
                assert!(
                    description.mip_count as usize <= MAX_IMAGE_VIEWS,
                    "mip count {} exceeds {MAX_IMAGE_VIEWS} views",
                    description.mip_count
                );
                resource.storage = create_texture(device, target, &description, create.init_data, &name)?;
                resource.aspect = Aspect::Color;
            }
        }

        let index = self.next_static;
        self.next_static += 1;
        self.slots[index] = resource;
        Ok(ResourceHandle::from_index(index))
    }

    /// Wrap a host object in the dynamic region. A null native handle yields
    /// the null handle without consuming a slot.
    pub fn register(&mut self, external: &ExternalResource) -> Result<ResourceHandle> {
        let Some(native) = external.native else {
            return Ok(ResourceHandle::NULL);
        };
        if !self.has_free_slot() {
            error!(name = external.name.as_str(), "resource table is full");
            return Err(Self::capacity_error());
        }

        let Ok(id) = u32::try_from(native.raw()) else {
            error!(native = native.raw(), "native handle is not a GL object name");
            return Err(Fsr2Error::InvalidPointer);
        };
        let (storage, aspect) = if external.description.resource_type.is_buffer() {
            (ResourceStorage::Buffer(GlBuffer(id)), Aspect::Undefined)
        } else {
            let mut single_mips = [GlTexture::NULL; MAX_IMAGE_VIEWS];
            single_mips[0] = GlTexture(id);
            let aspect = if external.is_depth {
                Aspect::Depth
            } else {
                Aspect::Color
            };
            (
                ResourceStorage::Texture {
                    all_mips: GlTexture(id),
                    single_mips,
                },
                aspect,
            )
        };

        let mut resource = Resource {
            description: external.description,
            storage,
            ownership: Ownership::Borrowed,
            aspect,
            ..Default::default()
        };
        resource.set_name(&external.name);

        let index = MAX_RESOURCE_COUNT - 1 - self.dynamic_count;
        self.dynamic_count += 1;
        self.slots[index] = resource;
        Ok(ResourceHandle::from_index(index))
    }

    /// Rewind the dynamic region. Registered objects are left untouched.
    pub fn unregister_frame(&mut self) {
        self.dynamic_count = 0;
    }

    /// Slot index of `handle` if it lies in the allocated static or dynamic
    /// region.
    fn live_index(&self, handle: ResourceHandle) -> Option<usize> {
        let index = handle.index()?;
        let dynamic_start = MAX_RESOURCE_COUNT - self.dynamic_count;
        (index < self.next_static || (dynamic_start..MAX_RESOURCE_COUNT).contains(&index))
            .then_some(index)
    }

    /// Allocated slot for `handle`. `None` for the null handle, an
    /// out-of-range handle, the unallocated gap, and dynamic slots released
    /// by [`unregister_frame`](Self::unregister_frame).
    pub fn get(&self, handle: ResourceHandle) -> Option<&Resource> {
        self.live_index(handle).map(|index| &self.slots[index])
    }

    /// Description of `handle`; all zero for the null handle.
    pub fn description(&self, handle: ResourceHandle) -> ResourceDescription {
        self.get(handle)
            .map(|resource| resource.description)
            .unwrap_or_default()
    }

    /// Release the GL objects of a slot. Destroying twice is a no-op.
    pub fn destroy<D: GlDevice>(&mut self, device: &D, handle: ResourceHandle) {
        let Some(index) = self.live_index(handle) else {
            return;
        };
        let resource = &mut self.slots[index];
        let storage = std::mem::take(&mut resource.storage);
        if resource.ownership == Ownership::Borrowed {
            return;
        }
        match storage {
            ResourceStorage::Empty => {}
            ResourceStorage::Buffer(buffer) => {
                if !buffer.is_null() {
                    device.delete_buffer(buffer);
                }
            }
            ResourceStorage::Texture {
                all_mips,
                single_mips,
            } => {
                if !all_mips.is_null() {
                    device.delete_texture(all_mips);
                }
                for view in single_mips.into_iter().filter(|view| !view.is_null()) {
                    device.delete_texture(view);
                }
            }
        }
        trace!(index = handle.raw(), "destroyed resource");
    }

    /// Destroy every static resource that is still alive.
    pub fn destroy_all_owned<D: GlDevice>(&mut self, device: &D) {
        for index in 0..self.next_static {
            self.destroy(device, ResourceHandle::from_index(index));
        }
        self.next_static = 0;
        self.dynamic_count = 0;
    }
}

fn create_buffer<D: GlDevice>(
    device: &D,
    create: &CreateResourceDescription<'_>,
    name: &FixedName,
) -> Result<GlBuffer> {
    let size = create.description.width as usize;
    if let Some(data) = create.init_data {
        assert_eq!(data.len(), size, "buffer init data must match its width");
    }

    let buffer = device.create_buffer();
    if buffer.is_null() {
        error!(name = name.as_str(), "glCreateBuffers failed");
        return Err(Fsr2Error::BackendApi("buffer creation failed"));
    }
    device.named_buffer_storage(buffer, size, create.init_data, 0);
    label_object(device, gl::BUFFER, buffer.id(), name);
    Ok(buffer)
}

fn create_texture<D: GlDevice>(
    device: &D,
    target: GLenum,
    description: &ResourceDescription,
    init_data: Option<&[u8]>,
    name: &FixedName,
) -> Result<ResourceStorage> {
    let internal_format = gl_internal_format(description.format);
    let extent = texture_extent(description);

    let texture = device.create_texture(target);
    if texture.is_null() {
        error!(name = name.as_str(), "glCreateTextures failed");
        return Err(Fsr2Error::BackendApi("texture creation failed"));
    }
    device.texture_storage(texture, description.mip_count, internal_format, extent);

    if let Some(data) = init_data {
        device.texture_sub_image(
            texture,
            0,
            extent,
            gl_upload_format(description.format),
            gl_upload_type(description.format),
            data,
        );
    }

    let mut single_mips = [GlTexture::NULL; MAX_IMAGE_VIEWS];
    for (level, view) in single_mips
        .iter_mut()
        .take(description.mip_count as usize)
        .enumerate()
    {
        *view = device.gen_texture();
        device.texture_view(*view, target, texture, internal_format, level as u32, 1, 0, 1);
        label_object(device, gl::TEXTURE, view.id(), name);
    }
    label_object(device, gl::TEXTURE, texture.id(), name);

    Ok(ResourceStorage::Texture {
        all_mips: texture,
        single_mips,
    })
}
