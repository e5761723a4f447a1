//! Compute pipeline creation.

use fsr2_core::{
    ContextFlags, DeviceCapabilities, FixedName, Fsr2Error, Fsr2Pass, PipelineDescription,
    PipelineHandle, PipelineState, ResourceBinding, Result,
};
use gl::types::GLenum;
use tracing::{debug, error};

use crate::capabilities::{probe_capabilities, vendor_is_nvidia};
use crate::device::{GlDevice, GlProgram};
use crate::shaders::{BlobBinding, PermutationFlags, PermutationSource, ShaderBlob};

const ENTRY_POINT: &std::ffi::CStr = c"main";

/// `GL_SHADER_BINARY_FORMAT_SPIR_V`; GL 4.6, absent from the `gl` bindings.
pub const SHADER_BINARY_FORMAT_SPIR_V: GLenum = 0x9551;

/// Permutation to load for `pass`.
///
/// `fp16_blocked` force-disables half precision, used for the accumulate
/// passes on NVIDIA drivers where the fp16 path loses occupancy.
pub fn permutation_flags(
    pass: Fsr2Pass,
    desc: &PipelineDescription,
    caps: &DeviceCapabilities,
    fp16_blocked: bool,
) -> PermutationFlags {
    let context = desc.context_flags;
    let mut flags = PermutationFlags::empty();

    flags.set(
        PermutationFlags::HDR_COLOR_INPUT,
        context.contains(ContextFlags::ENABLE_HIGH_DYNAMIC_RANGE),
    );
    flags.set(
        PermutationFlags::LOW_RES_MOTION_VECTORS,
        !context.contains(ContextFlags::ENABLE_DISPLAY_RESOLUTION_MOTION_VECTORS),
    );
    flags.set(
        PermutationFlags::JITTER_MOTION_VECTORS,
        context.contains(ContextFlags::ENABLE_MOTION_VECTORS_JITTER_CANCELLATION),
    );
    flags.set(
        PermutationFlags::DEPTH_INVERTED,
        context.contains(ContextFlags::ENABLE_DEPTH_INVERTED),
    );
    flags.set(
        PermutationFlags::ENABLE_SHARPENING,
        pass == Fsr2Pass::AccumulateSharpen,
    );
    flags.set(
        PermutationFlags::REPROJECT_USE_LANCZOS_TYPE,
        caps.wave_lane_count_max == 64,
    );
    flags.set(
        PermutationFlags::ALLOW_FP16,
        caps.fp16_supported && !fp16_blocked && pass != Fsr2Pass::Rcas,
    );
    flags
}

/// Select, build and reflect the pipeline for `pass`.
pub fn create_pipeline<D: GlDevice, P: PermutationSource + ?Sized>(
    device: &D,
    permutations: &P,
    pass: Fsr2Pass,
    desc: &PipelineDescription,
) -> Result<PipelineState> {
    let caps = probe_capabilities(device)?;
    let fp16_blocked = pass.is_accumulate() && vendor_is_nvidia(device);
    let flags = permutation_flags(pass, desc, &caps, fp16_blocked);

    let blob = permutations
        .blob(pass, flags)
        .filter(|blob| !blob.data.is_empty())
        .ok_or_else(|| {
            error!(?pass, ?flags, "no shader permutation available");
            Fsr2Error::BackendApi("missing shader permutation")
        })?;

    let mut state = binding_layout(&blob);
    let program = build_program(device, blob.data)?;
    state.pipeline = PipelineHandle::new(u64::from(program.id()));

    debug!(?pass, ?flags, program = program.id(), "created pipeline");
    Ok(state)
}

/// Binding tables of a pipeline built from `blob`.
///
/// # Panics
///
/// If the blob declares more bindings than a pipeline can hold.
pub fn binding_layout(blob: &ShaderBlob<'_>) -> PipelineState {
    let mut state = PipelineState::default();
    state.srv_count = fill_bindings(&mut state.srv_bindings, blob.combined_samplers, "srv");
    state.uav_count = fill_bindings(&mut state.uav_bindings, blob.storage_images, "uav");
    state.const_count = fill_bindings(&mut state.cb_bindings, blob.uniform_buffers, "cb");
    state
}

fn fill_bindings(dst: &mut [ResourceBinding], src: &[BlobBinding<'_>], kind: &str) -> u32 {
    assert!(
        src.len() <= dst.len(),
        "{} {kind} bindings exceed the limit of {}",
        src.len(),
        dst.len()
    );
    for (slot, binding) in dst.iter_mut().zip(src) {
        *slot = ResourceBinding {
            slot_index: binding.binding,
            name: FixedName::new(binding.name),
        };
    }
    src.len() as u32
}

/// Load a SPIR-V compute shader and link it into a program.
///
/// Every object created along the way is deleted if a step fails.
pub fn build_program<D: GlDevice>(device: &D, spirv: &[u8]) -> Result<GlProgram> {
    let shader = device.create_shader(gl::COMPUTE_SHADER);
    if shader.is_null() {
        error!("glCreateShader failed");
        return Err(Fsr2Error::BackendApi("shader creation failed"));
    }

    device.shader_binary(shader, SHADER_BINARY_FORMAT_SPIR_V, spirv);
    device.specialize_shader(shader, ENTRY_POINT);
    if device.get_shader_iv(shader, gl::COMPILE_STATUS) == gl::FALSE as i32 {
        error!(shader = shader.id(), "SPIR-V specialization failed");
        device.delete_shader(shader);
        return Err(Fsr2Error::BackendApi("shader compilation failed"));
    }

    let program = device.create_program();
    if program.is_null() {
        error!("glCreateProgram failed");
        device.delete_shader(shader);
        return Err(Fsr2Error::BackendApi("program creation failed"));
    }
    device.attach_shader(program, shader);
    device.link_program(program);
    let linked = device.get_program_iv(program, gl::LINK_STATUS) != gl::FALSE as i32;

    // Attached, so this only flags it; it goes away with the program.
    device.delete_shader(shader);
    if !linked {
        error!(program = program.id(), "program link failed");
        device.delete_program(program);
        return Err(Fsr2Error::BackendApi("program link failed"));
    }
    Ok(program)
}

/// Delete the program of `state`. A pipeline without a program is left as is.
pub fn destroy_pipeline<D: GlDevice>(device: &D, state: &mut PipelineState) {
    if let Some(handle) = state.pipeline.take() {
        device.delete_program(GlProgram(handle.raw() as u32));
    }
}
