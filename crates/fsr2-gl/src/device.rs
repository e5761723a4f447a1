//! The driver function table the backend is written against.
//!
//! [`GlDevice`] mirrors the handful of OpenGL 4.6 entry points the backend
//! calls. The host supplies an implementation at context creation, usually
//! `fsr2_gl_loader::GlFunctions`, which forwards to entry points resolved by
//! name. The backend never loads functions itself.

use std::ffi::CStr;
use std::ptr::NonNull;

use gl::types::{GLbitfield, GLenum, GLint, GLuint};

macro_rules! gl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub GLuint);

        impl $name {
            pub const NULL: Self = Self(0);

            pub fn is_null(self) -> bool {
                self.0 == 0
            }

            pub fn id(self) -> GLuint {
                self.0
            }
        }
    };
}

gl_handle!(
    /// A GL buffer object name.
    GlBuffer
);
gl_handle!(
    /// A GL texture object name (also used for texture views).
    GlTexture
);
gl_handle!(
    /// A GL sampler object name.
    GlSampler
);
gl_handle!(
    /// A GL program object name.
    GlProgram
);
gl_handle!(
    /// A GL shader object name.
    GlShader
);

/// Extent of a texture allocation or upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureExtent {
    D1 { width: u32 },
    D2 { width: u32, height: u32 },
    D3 { width: u32, height: u32, depth: u32 },
}

/// OpenGL entry points used by the backend.
///
/// Object-creating calls return the null handle on failure. Getters return
/// zero for unknown queries.
///
/// # Safety
///
/// Implementors must guarantee that a pointer returned by
/// [`map_named_buffer_range`](Self::map_named_buffer_range) stays valid for
/// writes of `length` bytes until the buffer is deleted. The backend writes
/// through it without further checks.
pub unsafe trait GlDevice {
    fn get_integer(&self, pname: GLenum) -> GLint;
    fn get_string(&self, name: GLenum) -> Option<String>;
    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String>;
    fn object_label(&self, identifier: GLenum, name: GLuint, label: &CStr);

    fn create_sampler(&self) -> GlSampler;
    fn sampler_parameter_i(&self, sampler: GlSampler, pname: GLenum, param: GLint);
    fn sampler_parameter_f(&self, sampler: GlSampler, pname: GLenum, param: f32);
    fn delete_sampler(&self, sampler: GlSampler);

    fn create_buffer(&self) -> GlBuffer;
    fn named_buffer_storage(
        &self,
        buffer: GlBuffer,
        size: usize,
        data: Option<&[u8]>,
        flags: GLbitfield,
    );
    fn map_named_buffer_range(
        &self,
        buffer: GlBuffer,
        offset: usize,
        length: usize,
        access: GLbitfield,
    ) -> Option<NonNull<u8>>;
    fn delete_buffer(&self, buffer: GlBuffer);

    fn create_texture(&self, target: GLenum) -> GlTexture;
    /// Reserve a name without an object, as texture views require.
    fn gen_texture(&self) -> GlTexture;
    fn texture_storage(
        &self,
        texture: GlTexture,
        levels: u32,
        internal_format: GLenum,
        extent: TextureExtent,
    );
    fn texture_sub_image(
        &self,
        texture: GlTexture,
        level: u32,
        extent: TextureExtent,
        format: GLenum,
        ty: GLenum,
        data: &[u8],
    );
    #[allow(clippy::too_many_arguments)]
    fn texture_view(
        &self,
        view: GlTexture,
        target: GLenum,
        original: GlTexture,
        internal_format: GLenum,
        min_level: u32,
        num_levels: u32,
        min_layer: u32,
        num_layers: u32,
    );
    fn clear_tex_image(
        &self,
        texture: GlTexture,
        level: u32,
        format: GLenum,
        ty: GLenum,
        color: &[f32; 4],
    );
    fn delete_texture(&self, texture: GlTexture);

    fn create_shader(&self, kind: GLenum) -> GlShader;
    fn shader_binary(&self, shader: GlShader, binary_format: GLenum, binary: &[u8]);
    fn specialize_shader(&self, shader: GlShader, entry_point: &CStr);
    fn get_shader_iv(&self, shader: GlShader, pname: GLenum) -> GLint;
    fn delete_shader(&self, shader: GlShader);

    fn create_program(&self) -> GlProgram;
    fn attach_shader(&self, program: GlProgram, shader: GlShader);
    fn link_program(&self, program: GlProgram);
    fn get_program_iv(&self, program: GlProgram, pname: GLenum) -> GLint;
    fn use_program(&self, program: GlProgram);
    fn delete_program(&self, program: GlProgram);

    fn memory_barrier(&self, barriers: GLbitfield);
    fn bind_texture_unit(&self, unit: u32, texture: GlTexture);
    fn bind_sampler(&self, unit: u32, sampler: GlSampler);
    fn bind_buffer_range(
        &self,
        target: GLenum,
        index: u32,
        buffer: GlBuffer,
        offset: usize,
        size: usize,
    );
    #[allow(clippy::too_many_arguments)]
    fn bind_image_texture(
        &self,
        unit: u32,
        texture: GlTexture,
        level: u32,
        layered: bool,
        layer: u32,
        access: GLenum,
        format: GLenum,
    );
    fn dispatch_compute(&self, groups_x: u32, groups_y: u32, groups_z: u32);
}

/// Whether created objects get `glObjectLabel` names.
pub const LABELS_ENABLED: bool = cfg!(any(debug_assertions, feature = "debug-labels"));

/// Attach a debug name to a GL object when labels are enabled.
pub(crate) fn label_object<D: GlDevice>(
    device: &D,
    identifier: GLenum,
    name: GLuint,
    label: &fsr2_core::FixedName,
) {
    if !LABELS_ENABLED || label.is_empty() || name == 0 {
        return;
    }
    if let Ok(label) = CStr::from_bytes_with_nul(label.as_bytes_with_nul()) {
        device.object_label(identifier, name, label);
    }
}
