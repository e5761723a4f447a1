//! Shared helpers for `fsr2-gl` integration tests.
//!
//! [`MockDevice`] is a recording [`GlDevice`]: it hands out object names,
//! tracks which objects are alive, logs every state-changing call and backs
//! persistent buffer mappings with real memory so uploads can be read back.

#![allow(dead_code)]

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeSet, HashMap};
use std::ffi::CStr;
use std::ptr::NonNull;
use std::rc::Rc;

use fsr2_core::Fsr2Pass;
use fsr2_gl::capabilities::{SUBGROUP_SIZE_KHR, SUBGROUP_SUPPORTED_STAGES_KHR};
use fsr2_gl::{
    BackendContext, BlobBinding, GlBuffer, GlDevice, GlProgram, GlSampler, GlShader, GlTexture,
    PermutationFlags, PermutationTable, ShaderBlob, TextureExtent,
};
use gl::types::{GLbitfield, GLenum, GLint, GLuint};

/// A state-changing call seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BufferStorage {
        buffer: GLuint,
        size: usize,
        flags: GLbitfield,
        data: Option<Vec<u8>>,
    },
    TextureStorage {
        texture: GLuint,
        levels: u32,
        internal_format: GLenum,
        extent: TextureExtent,
    },
    TextureSubImage {
        texture: GLuint,
        format: GLenum,
        ty: GLenum,
        len: usize,
    },
    TextureView {
        view: GLuint,
        target: GLenum,
        original: GLuint,
        min_level: u32,
        num_levels: u32,
    },
    ObjectLabel {
        name: GLuint,
        label: String,
    },
    ShaderBinary {
        shader: GLuint,
        format: GLenum,
        len: usize,
    },
    SpecializeShader {
        shader: GLuint,
        entry_point: String,
    },
    MemoryBarrier(GLbitfield),
    BindImage {
        unit: u32,
        texture: GLuint,
        level: u32,
        layered: bool,
        access: GLenum,
        format: GLenum,
    },
    BindTextureUnit {
        unit: u32,
        texture: GLuint,
    },
    BindSampler {
        unit: u32,
        sampler: GLuint,
    },
    BindBufferRange {
        target: GLenum,
        index: u32,
        buffer: GLuint,
        size: usize,
    },
    UseProgram(GLuint),
    Dispatch([u32; 3]),
    ClearTexImage {
        texture: GLuint,
        level: u32,
        format: GLenum,
        ty: GLenum,
        color: [f32; 4],
    },
}

/// Objects alive in the mock, by kind.
#[derive(Debug, Default)]
pub struct LiveObjects {
    pub buffers: BTreeSet<GLuint>,
    pub textures: BTreeSet<GLuint>,
    pub samplers: BTreeSet<GLuint>,
    pub shaders: BTreeSet<GLuint>,
    pub programs: BTreeSet<GLuint>,
}

impl LiveObjects {
    pub fn total(&self) -> usize {
        self.buffers.len()
            + self.textures.len()
            + self.samplers.len()
            + self.shaders.len()
            + self.programs.len()
    }
}

#[derive(Debug)]
pub struct MockState {
    next_id: GLuint,
    maps: usize,
    pub live: LiveObjects,
    pub calls: Vec<Call>,
    pub mapped: HashMap<GLuint, Box<[u8]>>,
    pub sampler_params: Vec<(GLuint, GLenum, f32)>,
    pub extensions: Vec<String>,
    pub subgroup_stages: GLint,
    pub subgroup_size: GLint,
    pub vendor: String,
    pub compile_ok: bool,
    pub link_ok: bool,
    /// Fail the persistent mapping once this many maps have succeeded.
    pub fail_map_after: Option<usize>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            next_id: 1,
            maps: 0,
            live: LiveObjects::default(),
            calls: Vec::new(),
            mapped: HashMap::new(),
            sampler_params: Vec::new(),
            extensions: vec![
                "GL_ARB_gl_spirv".to_owned(),
                "GL_KHR_shader_subgroup".to_owned(),
            ],
            subgroup_stages: gl::COMPUTE_SHADER_BIT as GLint,
            subgroup_size: 32,
            vendor: "ATI Technologies Inc.".to_owned(),
            compile_ok: true,
            link_ok: true,
            fail_map_after: None,
        }
    }
}

impl MockState {
    fn next_name(&mut self) -> GLuint {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockDevice(Rc<RefCell<MockState>>);

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device configured by `configure`.
    pub fn with(configure: impl FnOnce(&mut MockState)) -> Self {
        let device = Self::new();
        configure(&mut device.state_mut());
        device
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, MockState> {
        self.0.borrow_mut()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state_mut().calls.clear();
    }

    pub fn live_total(&self) -> usize {
        self.state().live.total()
    }

    /// Current contents of a mapped buffer.
    pub fn buffer_contents(&self, buffer: GlBuffer) -> Vec<u8> {
        self.state()
            .mapped
            .get(&buffer.id())
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.state_mut().calls.push(call);
    }
}

unsafe impl GlDevice for MockDevice {
    fn get_integer(&self, pname: GLenum) -> GLint {
        let state = self.state();
        match pname {
            gl::NUM_EXTENSIONS => state.extensions.len() as GLint,
            SUBGROUP_SUPPORTED_STAGES_KHR => state.subgroup_stages,
            SUBGROUP_SIZE_KHR => state.subgroup_size,
            _ => 0,
        }
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        match name {
            gl::VENDOR => Some(self.state().vendor.clone()),
            _ => None,
        }
    }

    fn get_string_i(&self, name: GLenum, index: GLuint) -> Option<String> {
        match name {
            gl::EXTENSIONS => self.state().extensions.get(index as usize).cloned(),
            _ => None,
        }
    }

    fn object_label(&self, _identifier: GLenum, name: GLuint, label: &CStr) {
        self.record(Call::ObjectLabel {
            name,
            label: label.to_string_lossy().into_owned(),
        });
    }

    fn create_sampler(&self) -> GlSampler {
        let mut state = self.state_mut();
        let id = state.next_name();
        state.live.samplers.insert(id);
        GlSampler(id)
    }

    fn sampler_parameter_i(&self, sampler: GlSampler, pname: GLenum, param: GLint) {
        self.state_mut()
            .sampler_params
            .push((sampler.id(), pname, param as f32));
    }

    fn sampler_parameter_f(&self, sampler: GlSampler, pname: GLenum, param: f32) {
        self.state_mut().sampler_params.push((sampler.id(), pname, param));
    }

    fn delete_sampler(&self, sampler: GlSampler) {
        self.state_mut().live.samplers.remove(&sampler.id());
    }

    fn create_buffer(&self) -> GlBuffer {
        let mut state = self.state_mut();
        let id = state.next_name();
        state.live.buffers.insert(id);
        GlBuffer(id)
    }

    fn named_buffer_storage(
        &self,
        buffer: GlBuffer,
        size: usize,
        data: Option<&[u8]>,
        flags: GLbitfield,
    ) {
        self.record(Call::BufferStorage {
            buffer: buffer.id(),
            size,
            flags,
            data: data.map(<[u8]>::to_vec),
        });
    }

    fn map_named_buffer_range(
        &self,
        buffer: GlBuffer,
        _offset: usize,
        length: usize,
        _access: GLbitfield,
    ) -> Option<NonNull<u8>> {
        let mut state = self.state_mut();
        if state.fail_map_after == Some(state.maps) {
            return None;
        }
        state.maps += 1;
        let mut memory = vec![0u8; length].into_boxed_slice();
        let ptr = NonNull::new(memory.as_mut_ptr());
        state.mapped.insert(buffer.id(), memory);
        ptr
    }

    fn delete_buffer(&self, buffer: GlBuffer) {
        let mut state = self.state_mut();
        state.live.buffers.remove(&buffer.id());
        state.mapped.remove(&buffer.id());
    }

    fn create_texture(&self, _target: GLenum) -> GlTexture {
        let mut state = self.state_mut();
        let id = state.next_name();
        state.live.textures.insert(id);
        GlTexture(id)
    }

    fn gen_texture(&self) -> GlTexture {
        self.create_texture(0)
    }

    fn texture_storage(
        &self,
        texture: GlTexture,
        levels: u32,
        internal_format: GLenum,
        extent: TextureExtent,
    ) {
        self.record(Call::TextureStorage {
            texture: texture.id(),
            levels,
            internal_format,
            extent,
        });
    }

    fn texture_sub_image(
        &self,
        texture: GlTexture,
        _level: u32,
        _extent: TextureExtent,
        format: GLenum,
        ty: GLenum,
        data: &[u8],
    ) {
        self.record(Call::TextureSubImage {
            texture: texture.id(),
            format,
            ty,
            len: data.len(),
        });
    }

    fn texture_view(
        &self,
        view: GlTexture,
        target: GLenum,
        original: GlTexture,
        _internal_format: GLenum,
        min_level: u32,
        num_levels: u32,
        _min_layer: u32,
        _num_layers: u32,
    ) {
        self.record(Call::TextureView {
            view: view.id(),
            target,
            original: original.id(),
            min_level,
            num_levels,
        });
    }

    fn clear_tex_image(
        &self,
        texture: GlTexture,
        level: u32,
        format: GLenum,
        ty: GLenum,
        color: &[f32; 4],
    ) {
        self.record(Call::ClearTexImage {
            texture: texture.id(),
            level,
            format,
            ty,
            color: *color,
        });
    }

    fn delete_texture(&self, texture: GlTexture) {
        self.state_mut().live.textures.remove(&texture.id());
    }

    fn create_shader(&self, _kind: GLenum) -> GlShader {
        let mut state = self.state_mut();
        let id = state.next_name();
        state.live.shaders.insert(id);
        GlShader(id)
    }

    fn shader_binary(&self, shader: GlShader, binary_format: GLenum, binary: &[u8]) {
        self.record(Call::ShaderBinary {
            shader: shader.id(),
            format: binary_format,
            len: binary.len(),
        });
    }

    fn specialize_shader(&self, shader: GlShader, entry_point: &CStr) {
        self.record(Call::SpecializeShader {
            shader: shader.id(),
            entry_point: entry_point.to_string_lossy().into_owned(),
        });
    }

    fn get_shader_iv(&self, _shader: GlShader, pname: GLenum) -> GLint {
        match pname {
            gl::COMPILE_STATUS => GLint::from(self.state().compile_ok),
            _ => 0,
        }
    }

    fn delete_shader(&self, shader: GlShader) {
        self.state_mut().live.shaders.remove(&shader.id());
    }

    fn create_program(&self) -> GlProgram {
        let mut state = self.state_mut();
        let id = state.next_name();
        state.live.programs.insert(id);
        GlProgram(id)
    }

    fn attach_shader(&self, _program: GlProgram, _shader: GlShader) {}

    fn link_program(&self, _program: GlProgram) {}

    fn get_program_iv(&self, _program: GlProgram, pname: GLenum) -> GLint {
        match pname {
            gl::LINK_STATUS => GLint::from(self.state().link_ok),
            _ => 0,
        }
    }

    fn use_program(&self, program: GlProgram) {
        self.record(Call::UseProgram(program.id()));
    }

    fn delete_program(&self, program: GlProgram) {
        self.state_mut().live.programs.remove(&program.id());
    }

    fn memory_barrier(&self, barriers: GLbitfield) {
        self.record(Call::MemoryBarrier(barriers));
    }

    fn bind_texture_unit(&self, unit: u32, texture: GlTexture) {
        self.record(Call::BindTextureUnit {
            unit,
            texture: texture.id(),
        });
    }

    fn bind_sampler(&self, unit: u32, sampler: GlSampler) {
        self.record(Call::BindSampler {
            unit,
            sampler: sampler.id(),
        });
    }

    fn bind_buffer_range(
        &self,
        target: GLenum,
        index: u32,
        buffer: GlBuffer,
        _offset: usize,
        size: usize,
    ) {
        self.record(Call::BindBufferRange {
            target,
            index,
            buffer: buffer.id(),
            size,
        });
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        texture: GlTexture,
        level: u32,
        layered: bool,
        _layer: u32,
        access: GLenum,
        format: GLenum,
    ) {
        self.record(Call::BindImage {
            unit,
            texture: texture.id(),
            level,
            layered,
            access,
            format,
        });
    }

    fn dispatch_compute(&self, groups_x: u32, groups_y: u32, groups_z: u32) {
        self.record(Call::Dispatch([groups_x, groups_y, groups_z]));
    }
}

pub static SPIRV: [u8; 8] = [0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00];

pub static SRVS: [BlobBinding<'static>; 2] = [
    BlobBinding {
        name: "r_input_color_jittered",
        binding: 0,
    },
    BlobBinding {
        name: "r_dilated_depth",
        binding: 1,
    },
];

pub static UAVS: [BlobBinding<'static>; 1] = [BlobBinding {
    name: "rw_reconstructed_previous_nearest_depth",
    binding: 2,
}];

pub static CBS: [BlobBinding<'static>; 1] = [BlobBinding {
    name: "cbFSR2",
    binding: 3,
}];

/// Two sampled textures, one storage image and one constant buffer.
pub fn blob() -> ShaderBlob<'static> {
    ShaderBlob {
        data: &SPIRV,
        storage_images: &UAVS,
        combined_samplers: &SRVS,
        uniform_buffers: &CBS,
    }
}

/// A table with [`blob`] registered for every pass and permutation.
pub fn full_table() -> PermutationTable<'static> {
    let mut table = PermutationTable::new();
    for pass in Fsr2Pass::ALL {
        for bits in 0..=u8::MAX {
            let flags = PermutationFlags::from_bits_truncate(u32::from(bits));
            table.insert(pass, flags, blob());
        }
    }
    table
}

pub type TestContext = BackendContext<MockDevice, PermutationTable<'static>>;

pub fn context(device: &MockDevice) -> anyhow::Result<TestContext> {
    Ok(BackendContext::new(device.clone(), full_table())?)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
