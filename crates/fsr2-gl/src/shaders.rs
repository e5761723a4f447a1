//! Precompiled shader permutations.
//!
//! The SPIR-V blobs are generated offline, one set per pass. The backend only
//! asks a [`PermutationSource`] for the blob matching a pass and a set of
//! [`PermutationFlags`]; how the blobs are stored is up to the host.

use std::collections::HashMap;

use bitflags::bitflags;
use fsr2_core::Fsr2Pass;

bitflags! {
    /// Compile-time options baked into a shader permutation.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct PermutationFlags: u32 {
        const REPROJECT_USE_LANCZOS_TYPE = 1 << 0;
        const HDR_COLOR_INPUT = 1 << 1;
        const LOW_RES_MOTION_VECTORS = 1 << 2;
        const JITTER_MOTION_VECTORS = 1 << 3;
        const DEPTH_INVERTED = 1 << 4;
        const ENABLE_SHARPENING = 1 << 5;
        /// Never selected on OpenGL, which cannot force a subgroup size.
        const FORCE_WAVE64 = 1 << 6;
        const ALLOW_FP16 = 1 << 7;
    }
}

/// A named binding declared by a shader blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobBinding<'a> {
    pub name: &'a str,
    pub binding: u32,
}

/// One SPIR-V permutation and its reflected binding layout.
#[derive(Debug, Clone, Copy)]
pub struct ShaderBlob<'a> {
    pub data: &'a [u8],
    /// Unordered-access images.
    pub storage_images: &'a [BlobBinding<'a>],
    /// Sampled textures.
    pub combined_samplers: &'a [BlobBinding<'a>],
    pub uniform_buffers: &'a [BlobBinding<'a>],
}

/// Lookup of precompiled permutations.
pub trait PermutationSource {
    /// Blob for `pass` compiled with `flags`, or `None` if there is none.
    fn blob(&self, pass: Fsr2Pass, flags: PermutationFlags) -> Option<ShaderBlob<'_>>;
}

impl<F> PermutationSource for F
where
    F: Fn(Fsr2Pass, PermutationFlags) -> Option<ShaderBlob<'static>>,
{
    fn blob(&self, pass: Fsr2Pass, flags: PermutationFlags) -> Option<ShaderBlob<'_>> {
        self(pass, flags)
    }
}

/// Pass whose blob table serves `pass`. Both accumulate variants share one.
pub fn table_pass(pass: Fsr2Pass) -> Fsr2Pass {
    match pass {
        Fsr2Pass::AccumulateSharpen => Fsr2Pass::Accumulate,
        other => other,
    }
}

/// The flags a pass's blob table is actually keyed on.
///
/// Wave64 forcing is never part of a key, and the luminance pyramid has no
/// half-precision variants.
pub fn permutation_key(pass: Fsr2Pass, flags: PermutationFlags) -> PermutationFlags {
    let mut key = flags - PermutationFlags::FORCE_WAVE64;
    if pass == Fsr2Pass::ComputeLuminancePyramid {
        key -= PermutationFlags::ALLOW_FP16;
    }
    key
}

/// In-memory permutation table the host fills from its generated blobs.
#[derive(Debug, Default)]
pub struct PermutationTable<'a> {
    blobs: HashMap<(Fsr2Pass, PermutationFlags), ShaderBlob<'a>>,
}

impl<'a> PermutationTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` for `pass` under `flags`. Returns the blob it replaced.
    pub fn insert(
        &mut self,
        pass: Fsr2Pass,
        flags: PermutationFlags,
        blob: ShaderBlob<'a>,
    ) -> Option<ShaderBlob<'a>> {
        self.blobs
            .insert((table_pass(pass), permutation_key(pass, flags)), blob)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl PermutationSource for PermutationTable<'_> {
    fn blob(&self, pass: Fsr2Pass, flags: PermutationFlags) -> Option<ShaderBlob<'_>> {
        self.blobs
            .get(&(table_pass(pass), permutation_key(pass, flags)))
            .copied()
    }
}
