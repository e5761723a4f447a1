//! Wrapping host GL objects for registration.
//!
//! The returned [`ExternalResource`] only names the host object; the backend
//! never takes ownership of it.

use fsr2_core::{
    ExternalResource, FixedName, NativeResource, ResourceDescription, ResourceFlags,
    ResourceStates, ResourceType, SurfaceFormat,
};
use gl::types::{GLenum, GLuint};

use crate::format::{is_depth_format, surface_format};

/// Describe a host 2D texture with a single mip level.
///
/// Depth and depth-stencil formats set [`ExternalResource::is_depth`].
pub fn texture_resource(
    texture: GLuint,
    width: u32,
    height: u32,
    internal_format: GLenum,
    name: Option<&str>,
    state: ResourceStates,
) -> ExternalResource {
    ExternalResource {
        native: NativeResource::new(u64::from(texture)),
        description: ResourceDescription {
            resource_type: ResourceType::Texture2D,
            format: surface_format(internal_format),
            width,
            height,
            depth: 1,
            mip_count: 1,
            flags: ResourceFlags::empty(),
        },
        state,
        is_depth: is_depth_format(internal_format),
        name: name.map(FixedName::new).unwrap_or_default(),
    }
}

/// Describe a host buffer of `size` bytes.
pub fn buffer_resource(
    buffer: GLuint,
    size: u32,
    name: Option<&str>,
    state: ResourceStates,
) -> ExternalResource {
    ExternalResource {
        native: NativeResource::new(u64::from(buffer)),
        description: ResourceDescription {
            resource_type: ResourceType::Buffer,
            format: SurfaceFormat::Unknown,
            width: size,
            height: 1,
            depth: 1,
            mip_count: 1,
            flags: ResourceFlags::empty(),
        },
        state,
        is_depth: false,
        name: name.map(FixedName::new).unwrap_or_default(),
    }
}
