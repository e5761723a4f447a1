mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{blob, context, full_table, init_tracing, Call, MockDevice};
use fsr2_core::{ContextFlags, Fsr2Backend, Fsr2Error, Fsr2Pass, PipelineDescription};
use fsr2_gl::pipeline::{create_pipeline, SHADER_BINARY_FORMAT_SPIR_V};
use fsr2_gl::{BackendContext, PermutationFlags, PermutationTable, ShaderBlob};

fn description() -> PipelineDescription {
    PipelineDescription {
        context_flags: ContextFlags::ENABLE_HIGH_DYNAMIC_RANGE
            | ContextFlags::ENABLE_DISPLAY_RESOLUTION_MOTION_VECTORS,
    }
}

fn fp16_device(vendor: &str) -> MockDevice {
    MockDevice::with(|state| {
        state.vendor = vendor.to_owned();
        state.extensions.push("GL_NV_gpu_shader5".to_owned());
    })
}

/// Flags requested for `pass`, captured through a recording permutation source.
fn requested_flags(device: &MockDevice, pass: Fsr2Pass) -> anyhow::Result<PermutationFlags> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder = {
        let seen = Rc::clone(&seen);
        move |pass: Fsr2Pass, flags: PermutationFlags| -> Option<ShaderBlob<'static>> {
            seen.borrow_mut().push((pass, flags));
            Some(blob())
        }
    };

    create_pipeline(device, &recorder, pass, &description())?;
    let flags = seen.borrow().last().map(|(_, flags)| *flags);
    flags.ok_or_else(|| anyhow::anyhow!("no permutation requested"))
}

#[test]
fn pipeline_reflects_the_blob_layout() -> anyhow::Result<()> {
    init_tracing();
    let device = MockDevice::new();
    let mut ctx = context(&device)?;

    let state = ctx.create_pipeline(Fsr2Pass::DepthClip, &description())?;

    assert_eq!((state.srv_count, state.uav_count, state.const_count), (2, 1, 1));
    assert_eq!(state.srvs()[1].name.as_str(), "r_dilated_depth");
    assert_eq!(state.uavs()[0].slot_index, 2);
    assert_eq!(state.cbs()[0].name.as_str(), "cbFSR2");

    let program = state.pipeline.map(|handle| handle.raw() as u32);
    assert_eq!(
        program,
        device.state().live.programs.iter().next().copied()
    );
    assert!(device.state().live.shaders.is_empty());
    Ok(())
}

#[test]
fn shader_is_specialized_from_spirv() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let mut ctx = context(&device)?;
    device.clear_calls();

    ctx.create_pipeline(Fsr2Pass::Rcas, &description())?;

    let calls = device.calls();
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::ShaderBinary { format, len: 8, .. } if *format == SHADER_BINARY_FORMAT_SPIR_V
    )));
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::SpecializeShader { entry_point, .. } if entry_point == "main"
    )));
    Ok(())
}

#[test]
fn compile_failure_leaves_no_objects() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let mut ctx = context(&device)?;
    device.state_mut().compile_ok = false;

    let err = ctx
        .create_pipeline(Fsr2Pass::Lock, &description())
        .unwrap_err();

    assert_eq!(err, Fsr2Error::BackendApi("shader compilation failed"));
    assert!(device.state().live.shaders.is_empty());
    assert!(device.state().live.programs.is_empty());
    Ok(())
}

#[test]
fn link_failure_deletes_the_program() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let mut ctx = context(&device)?;
    device.state_mut().link_ok = false;

    let err = ctx
        .create_pipeline(Fsr2Pass::Lock, &description())
        .unwrap_err();

    assert_eq!(err, Fsr2Error::BackendApi("program link failed"));
    assert!(device.state().live.shaders.is_empty());
    assert!(device.state().live.programs.is_empty());
    Ok(())
}

#[test]
fn missing_permutation_is_an_api_error() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let mut ctx = BackendContext::new(device.clone(), PermutationTable::new())?;

    let err = ctx
        .create_pipeline(Fsr2Pass::Accumulate, &description())
        .unwrap_err();
    assert_eq!(err, Fsr2Error::BackendApi("missing shader permutation"));

    let mut empty = full_table();
    empty.insert(
        Fsr2Pass::TcrAutogenerate,
        PermutationFlags::HDR_COLOR_INPUT,
        ShaderBlob { data: &[], ..blob() },
    );
    let err = create_pipeline(&device, &empty, Fsr2Pass::TcrAutogenerate, &description())
        .unwrap_err();
    assert_eq!(err, Fsr2Error::BackendApi("missing shader permutation"));
    Ok(())
}

#[test]
fn accumulate_avoids_fp16_on_nvidia() -> anyhow::Result<()> {
    let nvidia = fp16_device("NVIDIA Corporation");
    assert!(!requested_flags(&nvidia, Fsr2Pass::Accumulate)?.contains(PermutationFlags::ALLOW_FP16));
    assert!(!requested_flags(&nvidia, Fsr2Pass::AccumulateSharpen)?
        .contains(PermutationFlags::ALLOW_FP16));
    assert!(requested_flags(&nvidia, Fsr2Pass::Lock)?.contains(PermutationFlags::ALLOW_FP16));

    let amd = fp16_device("ATI Technologies Inc.");
    assert!(requested_flags(&amd, Fsr2Pass::Accumulate)?.contains(PermutationFlags::ALLOW_FP16));
    Ok(())
}

#[test]
fn requested_flags_follow_the_context() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let flags = requested_flags(&device, Fsr2Pass::AccumulateSharpen)?;
    assert_eq!(
        flags,
        PermutationFlags::HDR_COLOR_INPUT | PermutationFlags::ENABLE_SHARPENING
    );

    let wave64 = MockDevice::with(|state| state.subgroup_size = 64);
    let flags = requested_flags(&wave64, Fsr2Pass::Lock)?;
    assert!(flags.contains(PermutationFlags::REPROJECT_USE_LANCZOS_TYPE));
    assert!(!flags.contains(PermutationFlags::FORCE_WAVE64));
    Ok(())
}

#[test]
fn destroying_a_pipeline_twice_is_a_no_op() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let mut ctx = context(&device)?;

    let mut state = ctx.create_pipeline(Fsr2Pass::GenerateReactive, &description())?;
    assert_eq!(device.state().live.programs.len(), 1);

    ctx.destroy_pipeline(&mut state)?;
    assert!(state.pipeline.is_none());
    assert!(device.state().live.programs.is_empty());
    ctx.destroy_pipeline(&mut state)?;
    Ok(())
}
