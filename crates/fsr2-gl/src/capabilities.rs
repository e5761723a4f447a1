//! Device capability probing.

use fsr2_core::{DeviceCapabilities, Fsr2Error, Result, ShaderModel};
use gl::types::GLenum;
use tracing::{debug, error};

use crate::device::GlDevice;

// GL_KHR_shader_subgroup tokens; not part of the core 4.6 bindings.
pub const SUBGROUP_SIZE_KHR: GLenum = 0x9532;
pub const SUBGROUP_SUPPORTED_STAGES_KHR: GLenum = 0x9533;

const SUBGROUP_EXTENSION: &str = "GL_KHR_shader_subgroup";
const FP16_EXTENSIONS: [&str; 2] = ["GL_NV_gpu_shader5", "GL_AMD_gpu_shader_half_float"];

/// Names of every extension the driver reports.
pub fn extensions<D: GlDevice>(device: &D) -> Vec<String> {
    let count = device.get_integer(gl::NUM_EXTENSIONS).max(0) as u32;
    (0..count)
        .filter_map(|i| device.get_string_i(gl::EXTENSIONS, i))
        .collect()
}

/// Query subgroup and half-precision support.
///
/// Compute-stage subgroup operations are required; without them the device
/// cannot run the upscaler and a backend API error is returned.
pub fn probe_capabilities<D: GlDevice>(device: &D) -> Result<DeviceCapabilities> {
    let extensions = extensions(device);
    let has = |name: &str| extensions.iter().any(|ext| ext == name);

    if !has(SUBGROUP_EXTENSION) {
        error!("{SUBGROUP_EXTENSION} is not supported");
        return Err(Fsr2Error::BackendApi("GL_KHR_shader_subgroup unsupported"));
    }
    let stages = device.get_integer(SUBGROUP_SUPPORTED_STAGES_KHR) as u32;
    if stages & gl::COMPUTE_SHADER_BIT == 0 {
        error!(stages, "subgroup operations unavailable in compute shaders");
        return Err(Fsr2Error::BackendApi("compute subgroups unsupported"));
    }

    let subgroup_size = device.get_integer(SUBGROUP_SIZE_KHR).max(0) as u32;
    let caps = DeviceCapabilities {
        minimum_supported_shader_model: ShaderModel::Sm5_1,
        wave_lane_count_min: subgroup_size,
        wave_lane_count_max: subgroup_size,
        fp16_supported: FP16_EXTENSIONS.iter().any(|ext| has(ext)),
        raytracing_supported: false,
    };
    debug!(?caps, "probed device capabilities");
    Ok(caps)
}

/// Whether `GL_VENDOR` names NVIDIA.
pub fn vendor_is_nvidia<D: GlDevice>(device: &D) -> bool {
    device
        .get_string(gl::VENDOR)
        .is_some_and(|vendor| vendor.contains("NVIDIA"))
}
