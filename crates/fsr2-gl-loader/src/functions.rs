use std::ffi::{c_void, CStr};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use fsr2_core::{Fsr2Error, Result};
use fsr2_gl::{GlBuffer, GlDevice, GlProgram, GlSampler, GlShader, GlTexture, TextureExtent};
use gl::types::{
    GLbitfield, GLboolean, GLchar, GLenum, GLint, GLintptr, GLsizei, GLsizeiptr, GLuint,
};
use once_cell::sync::OnceCell;
use tracing::{debug, error};

/// `glSpecializeShader` (GL 4.6), which the `gl` bindings do not generate.
type SpecializeShaderFn =
    unsafe extern "system" fn(GLuint, *const GLchar, GLuint, *const GLuint, *const GLuint);

const SPECIALIZE_SHADER: &str = "glSpecializeShader";

static SYSTEM_LOADER: OnceCell<Option<SpecializeShaderFn>> = OnceCell::new();

macro_rules! entry_points {
    ($($name:ident),* $(,)? ; by_address: $($extra:ident),* $(,)?) => {
        /// GL functions the backend cannot run without.
        pub const REQUIRED_ENTRY_POINTS: &[&str] = &[
            $(concat!("gl", stringify!($name)),)*
            $(concat!("gl", stringify!($extra)),)*
        ];

        /// Required functions the `gl` crate failed to load.
        fn missing_entry_points() -> Vec<&'static str> {
            let mut missing = Vec::new();
            $(
                if !gl::$name::is_loaded() {
                    missing.push(concat!("gl", stringify!($name)));
                }
            )*
            missing
        }
    };
}

entry_points!(
    GetIntegerv,
    GetString,
    GetStringi,
    GetShaderiv,
    GetProgramiv,
    ObjectLabel,
    CreateSamplers,
    SamplerParameteri,
    SamplerParameterf,
    DeleteSamplers,
    CreateBuffers,
    NamedBufferStorage,
    MapNamedBufferRange,
    DeleteBuffers,
    CreateTextures,
    GenTextures,
    TextureStorage1D,
    TextureStorage2D,
    TextureStorage3D,
    TextureSubImage1D,
    TextureSubImage2D,
    TextureSubImage3D,
    TextureView,
    ClearTexImage,
    DeleteTextures,
    CreateShader,
    ShaderBinary,
    DeleteShader,
    CreateProgram,
    AttachShader,
    LinkProgram,
    UseProgram,
    DeleteProgram,
    MemoryBarrier,
    BindTextureUnit,
    BindSampler,
    BindBufferRange,
    BindImageTexture,
    DispatchCompute;
    by_address: SpecializeShader
);

fn resolve_specialize_shader(address: *const c_void) -> Option<SpecializeShaderFn> {
    if address.is_null() {
        return None;
    }
    // SAFETY: a non-null address returned for `glSpecializeShader` points at
    // a function with the GL 4.6 signature.
    Some(unsafe { mem::transmute::<*const c_void, SpecializeShaderFn>(address) })
}

/// The loaded OpenGL entry points.
///
/// Not `Send`: GL calls must come from the thread whose context is current.
#[derive(Debug, Clone, Copy)]
pub struct GlFunctions {
    specialize_shader: SpecializeShaderFn,
    _not_send: PhantomData<*const ()>,
}

impl GlFunctions {
    /// Load entry points through a host lookup-by-name function.
    ///
    /// A missing loader is an invalid-pointer error; a loader that cannot
    /// resolve every required function is a backend API error.
    pub fn load_with(loader: Option<&dyn Fn(&str) -> *const c_void>) -> Result<Self> {
        let Some(loader) = loader else {
            error!("no GL function loader supplied");
            return Err(Fsr2Error::InvalidPointer);
        };
        gl::load_with(|symbol| loader(symbol));
        Self::verify(resolve_specialize_shader(loader(SPECIALIZE_SHADER)))
    }

    /// Load entry points through `gl_loader`, once per process.
    pub fn from_system_loader() -> Result<Self> {
        let specialize_shader = *SYSTEM_LOADER.get_or_init(|| {
            gl_loader::init_gl();
            gl::load_with(|symbol| gl_loader::get_proc_address(symbol).cast());
            debug!("loaded GL entry points through gl_loader");
            resolve_specialize_shader(gl_loader::get_proc_address(SPECIALIZE_SHADER).cast())
        });
        Self::verify(specialize_shader)
    }

    fn verify(specialize_shader: Option<SpecializeShaderFn>) -> Result<Self> {
        let mut missing = missing_entry_points();
        match specialize_shader {
            Some(specialize_shader) if missing.is_empty() => Ok(Self {
                specialize_shader,
                _not_send: PhantomData,
            }),
            specialize_shader => {
                if specialize_shader.is_none() {
                    missing.push(SPECIALIZE_SHADER);
                }
                error!(?missing, "required GL entry points are not available");
                Err(Fsr2Error::BackendApi("required GL entry points missing"))
            }
        }
    }
}

unsafe fn owned_string(ptr: *const u8) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr.cast()).to_string_lossy().into_owned())
}

// SAFETY: a persistent mapping stays valid until its buffer is deleted, as
// the GL spec guarantees for MAP_PERSISTENT_BIT storage. Every other call
// only requires the entry points checked in `verify` and a current context.
unsafe impl GlDevice for GlFunctions {
    fn get_integer(&self, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { gl::GetIntegerv(pname, &mut value) };
        value
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        unsafe { owned_string(gl::GetString(name)) }
    }

    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String> {
        unsafe { owned_string(gl::GetStringi(name, index)) }
    }

    fn object_label(&self, identifier: GLenum, name: GLuint, label: &CStr) {
        unsafe { gl::ObjectLabel(identifier, name, -1, label.as_ptr()) };
    }

    fn create_sampler(&self) -> GlSampler {
        let mut sampler = 0;
        unsafe { gl::CreateSamplers(1, &mut sampler) };
        GlSampler(sampler)
    }

    fn sampler_parameter_i(&self, sampler: GlSampler, pname: GLenum, param: GLint) {
        unsafe { gl::SamplerParameteri(sampler.id(), pname, param) };
    }

    fn sampler_parameter_f(&self, sampler: GlSampler, pname: GLenum, param: f32) {
        unsafe { gl::SamplerParameterf(sampler.id(), pname, param) };
    }

    fn delete_sampler(&self, sampler: GlSampler) {
        unsafe { gl::DeleteSamplers(1, &sampler.0) };
    }

    fn create_buffer(&self) -> GlBuffer {
        let mut buffer = 0;
        unsafe { gl::CreateBuffers(1, &mut buffer) };
        GlBuffer(buffer)
    }

    fn named_buffer_storage(
        &self,
        buffer: GlBuffer,
        size: usize,
        data: Option<&[u8]>,
        flags: GLbitfield,
    ) {
        let data = data.map_or(ptr::null(), |data| data.as_ptr().cast());
        unsafe { gl::NamedBufferStorage(buffer.id(), size as GLsizeiptr, data, flags) };
    }

    fn map_named_buffer_range(
        &self,
        buffer: GlBuffer,
        offset: usize,
        length: usize,
        access: GLbitfield,
    ) -> Option<NonNull<u8>> {
        let mapped = unsafe {
            gl::MapNamedBufferRange(
                buffer.id(),
                offset as GLintptr,
                length as GLsizeiptr,
                access,
            )
        };
        NonNull::new(mapped.cast::<u8>())
    }

    fn delete_buffer(&self, buffer: GlBuffer) {
        unsafe { gl::DeleteBuffers(1, &buffer.0) };
    }

    fn create_texture(&self, target: GLenum) -> GlTexture {
        let mut texture = 0;
        unsafe { gl::CreateTextures(target, 1, &mut texture) };
        GlTexture(texture)
    }

    fn gen_texture(&self) -> GlTexture {
        let mut texture = 0;
        unsafe { gl::GenTextures(1, &mut texture) };
        GlTexture(texture)
    }

    fn texture_storage(
        &self,
        texture: GlTexture,
        levels: u32,
        internal_format: GLenum,
        extent: TextureExtent,
    ) {
        let levels = levels as GLsizei;
        unsafe {
            match extent {
                TextureExtent::D1 { width } => {
                    gl::TextureStorage1D(texture.id(), levels, internal_format, width as GLsizei)
                }
                TextureExtent::D2 { width, height } => gl::TextureStorage2D(
                    texture.id(),
                    levels,
                    internal_format,
                    width as GLsizei,
                    height as GLsizei,
                ),
                TextureExtent::D3 {
                    width,
                    height,
                    depth,
                } => gl::TextureStorage3D(
                    texture.id(),
                    levels,
                    internal_format,
                    width as GLsizei,
                    height as GLsizei,
                    depth as GLsizei,
                ),
            }
        }
    }

    fn texture_sub_image(
        &self,
        texture: GlTexture,
        level: u32,
        extent: TextureExtent,
        format: GLenum,
        ty: GLenum,
        data: &[u8],
    ) {
        let level = level as GLint;
        let pixels = data.as_ptr().cast::<c_void>();
        unsafe {
            match extent {
                TextureExtent::D1 { width } => gl::TextureSubImage1D(
                    texture.id(),
                    level,
                    0,
                    width as GLsizei,
                    format,
                    ty,
                    pixels,
                ),
                TextureExtent::D2 { width, height } => gl::TextureSubImage2D(
                    texture.id(),
                    level,
                    0,
                    0,
                    width as GLsizei,
                    height as GLsizei,
                    format,
                    ty,
                    pixels,
                ),
                TextureExtent::D3 {
                    width,
                    height,
                    depth,
                } => gl::TextureSubImage3D(
                    texture.id(),
                    level,
                    0,
                    0,
                    0,
                    width as GLsizei,
                    height as GLsizei,
                    depth as GLsizei,
                    format,
                    ty,
                    pixels,
                ),
            }
        }
    }

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
    ) {
        unsafe {
            gl::TextureView(
                view.id(),
                target,
                original.id(),
                internal_format,
                min_level,
                num_levels,
                min_layer,
                num_layers,
            )
        };
    }

    fn clear_tex_image(
        &self,
        texture: GlTexture,
        level: u32,
        format: GLenum,
        ty: GLenum,
        color: &[f32; 4],
    ) {
        unsafe {
            gl::ClearTexImage(
                texture.id(),
                level as GLint,
                format,
                ty,
                color.as_ptr().cast(),
            )
        };
    }

    fn delete_texture(&self, texture: GlTexture) {
        unsafe { gl::DeleteTextures(1, &texture.0) };
    }

    fn create_shader(&self, kind: GLenum) -> GlShader {
        GlShader(unsafe { gl::CreateShader(kind) })
    }

    fn shader_binary(&self, shader: GlShader, binary_format: GLenum, binary: &[u8]) {
        unsafe {
            gl::ShaderBinary(
                1,
                &shader.0,
                binary_format,
                binary.as_ptr().cast(),
                binary.len() as GLsizei,
            )
        };
    }

    fn specialize_shader(&self, shader: GlShader, entry_point: &CStr) {
        unsafe {
            (self.specialize_shader)(
                shader.id(),
                entry_point.as_ptr(),
                0,
                ptr::null(),
                ptr::null(),
            )
        };
    }

    fn get_shader_iv(&self, shader: GlShader, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { gl::GetShaderiv(shader.id(), pname, &mut value) };
        value
    }

    fn delete_shader(&self, shader: GlShader) {
        unsafe { gl::DeleteShader(shader.id()) };
    }

    fn create_program(&self) -> GlProgram {
        GlProgram(unsafe { gl::CreateProgram() })
    }

    fn attach_shader(&self, program: GlProgram, shader: GlShader) {
        unsafe { gl::AttachShader(program.id(), shader.id()) };
    }

    fn link_program(&self, program: GlProgram) {
        unsafe { gl::LinkProgram(program.id()) };
    }

    fn get_program_iv(&self, program: GlProgram, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { gl::GetProgramiv(program.id(), pname, &mut value) };
        value
    }

    fn use_program(&self, program: GlProgram) {
        unsafe { gl::UseProgram(program.id()) };
    }

    fn delete_program(&self, program: GlProgram) {
        unsafe { gl::DeleteProgram(program.id()) };
    }

    fn memory_barrier(&self, barriers: GLbitfield) {
        unsafe { gl::MemoryBarrier(barriers) };
    }

    fn bind_texture_unit(&self, unit: u32, texture: GlTexture) {
        unsafe { gl::BindTextureUnit(unit, texture.id()) };
    }

    fn bind_sampler(&self, unit: u32, sampler: GlSampler) {
        unsafe { gl::BindSampler(unit, sampler.id()) };
    }

    fn bind_buffer_range(
        &self,
        target: GLenum,
        index: u32,
        buffer: GlBuffer,
        offset: usize,
        size: usize,
    ) {
        unsafe {
            gl::BindBufferRange(
                target,
                index,
                buffer.id(),
                offset as GLintptr,
                size as GLsizeiptr,
            )
        };
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        texture: GlTexture,
        level: u32,
        layered: bool,
        layer: u32,
        access: GLenum,
        format: GLenum,
    ) {
        unsafe {
            gl::BindImageTexture(
                unit,
                texture.id(),
                level as GLint,
                layered as GLboolean,
                layer as GLint,
                access,
                format,
            )
        };
    }

    fn dispatch_compute(&self, groups_x: u32, groups_y: u32, groups_z: u32) {
        unsafe { gl::DispatchCompute(groups_x, groups_y, groups_z) };
    }
}
