//! Conversions between [`SurfaceFormat`] and GL format tokens.

use fsr2_core::SurfaceFormat;
use gl::types::GLenum;

/// GL sized internal format for `format`, or 0 if it has none.
pub fn gl_internal_format(format: SurfaceFormat) -> GLenum {
    match format {
        SurfaceFormat::R32G32B32A32Typeless | SurfaceFormat::R32G32B32A32Float => gl::RGBA32F,
        SurfaceFormat::R16G16B16A16Float => gl::RGBA16F,
        SurfaceFormat::R16G16B16A16Unorm => gl::RGBA16,
        SurfaceFormat::R32G32Float => gl::RG32F,
        SurfaceFormat::R32Uint => gl::R32UI,
        SurfaceFormat::R8G8B8A8Typeless | SurfaceFormat::R8G8B8A8Unorm => gl::RGBA8,
        SurfaceFormat::R11G11B10Float => gl::R11F_G11F_B10F,
        SurfaceFormat::R16G16Float => gl::RG16F,
        SurfaceFormat::R16G16Uint => gl::RG16UI,
        SurfaceFormat::R16Float => gl::R16F,
        SurfaceFormat::R16Uint => gl::R16UI,
        SurfaceFormat::R16Unorm => gl::R16,
        SurfaceFormat::R16Snorm => gl::R16_SNORM,
        SurfaceFormat::R8Unorm => gl::R8,
        SurfaceFormat::R8Uint => gl::R8UI,
        SurfaceFormat::R8G8Unorm => gl::RG8,
        SurfaceFormat::R32Float => gl::R32F,
        SurfaceFormat::Unknown => 0,
    }
}

/// Surface format for a GL sized internal format; [`SurfaceFormat::Unknown`]
/// for anything unmapped.
pub fn surface_format(internal_format: GLenum) -> SurfaceFormat {
    match internal_format {
        gl::RGBA32F => SurfaceFormat::R32G32B32A32Float,
        gl::RGBA16F => SurfaceFormat::R16G16B16A16Float,
        gl::RGBA16 => SurfaceFormat::R16G16B16A16Unorm,
        gl::RG32F => SurfaceFormat::R32G32Float,
        gl::R32UI => SurfaceFormat::R32Uint,
        gl::RGBA8 => SurfaceFormat::R8G8B8A8Unorm,
        gl::R11F_G11F_B10F => SurfaceFormat::R11G11B10Float,
        gl::RG16F => SurfaceFormat::R16G16Float,
        gl::RG16UI => SurfaceFormat::R16G16Uint,
        gl::R16F => SurfaceFormat::R16Float,
        gl::R16UI => SurfaceFormat::R16Uint,
        gl::R16 => SurfaceFormat::R16Unorm,
        gl::R16_SNORM => SurfaceFormat::R16Snorm,
        gl::R8 => SurfaceFormat::R8Unorm,
        gl::R8UI => SurfaceFormat::R8Uint,
        gl::RG8 => SurfaceFormat::R8G8Unorm,
        gl::R32F => SurfaceFormat::R32Float,
        _ => SurfaceFormat::Unknown,
    }
}

/// Pixel format of client data uploaded into a texture of `format`.
pub fn gl_upload_format(format: SurfaceFormat) -> GLenum {
    match format {
        SurfaceFormat::R32G32B32A32Typeless
        | SurfaceFormat::R32G32B32A32Float
        | SurfaceFormat::R16G16B16A16Float
        | SurfaceFormat::R16G16B16A16Unorm
        | SurfaceFormat::R8G8B8A8Typeless
        | SurfaceFormat::R8G8B8A8Unorm => gl::RGBA,
        SurfaceFormat::R11G11B10Float => gl::RGB,
        SurfaceFormat::R32G32Float
        | SurfaceFormat::R16G16Float
        | SurfaceFormat::R8G8Unorm => gl::RG,
        SurfaceFormat::R16G16Uint => gl::RG_INTEGER,
        SurfaceFormat::R16Float
        | SurfaceFormat::R16Unorm
        | SurfaceFormat::R16Snorm
        | SurfaceFormat::R8Unorm
        | SurfaceFormat::R32Float => gl::RED,
        SurfaceFormat::R8Uint | SurfaceFormat::R16Uint | SurfaceFormat::R32Uint => {
            gl::RED_INTEGER
        }
        SurfaceFormat::Unknown => 0,
    }
}

/// Component type of client data uploaded into a texture of `format`.
pub fn gl_upload_type(format: SurfaceFormat) -> GLenum {
    match format {
        SurfaceFormat::R32G32B32A32Typeless
        | SurfaceFormat::R32G32B32A32Float
        | SurfaceFormat::R16G16B16A16Float
        | SurfaceFormat::R32G32Float
        | SurfaceFormat::R11G11B10Float
        | SurfaceFormat::R16G16Float
        | SurfaceFormat::R16Float
        | SurfaceFormat::R32Float => gl::FLOAT,
        SurfaceFormat::R8G8B8A8Unorm
        | SurfaceFormat::R8G8B8A8Typeless
        | SurfaceFormat::R8G8Unorm
        | SurfaceFormat::R8Unorm
        | SurfaceFormat::R8Uint => gl::UNSIGNED_BYTE,
        SurfaceFormat::R32Uint => gl::UNSIGNED_INT,
        SurfaceFormat::R16G16B16A16Unorm
        | SurfaceFormat::R16Unorm
        | SurfaceFormat::R16G16Uint
        | SurfaceFormat::R16Uint => gl::UNSIGNED_SHORT,
        SurfaceFormat::R16Snorm => gl::SHORT,
        SurfaceFormat::Unknown => 0,
    }
}

/// Depth and depth-stencil internal formats.
pub fn is_depth_format(internal_format: GLenum) -> bool {
    matches!(
        internal_format,
        gl::DEPTH_COMPONENT16 | gl::DEPTH_COMPONENT32F | gl::DEPTH24_STENCIL8 | gl::DEPTH32F_STENCIL8
    )
}
