//! The compute passes the upscaler schedules.

use num_derive::FromPrimitive;

/// One logical FSR2 compute pass.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Fsr2Pass {
    DepthClip = 0,
    ReconstructPreviousDepth,
    Lock,
    Accumulate,
    AccumulateSharpen,
    Rcas,
    ComputeLuminancePyramid,
    GenerateReactive,
    TcrAutogenerate,
}

/// Number of distinct passes.
pub const PASS_COUNT: usize = 9;

impl Fsr2Pass {
    pub const ALL: [Fsr2Pass; PASS_COUNT] = [
        Self::DepthClip,
        Self::ReconstructPreviousDepth,
        Self::Lock,
        Self::Accumulate,
        Self::AccumulateSharpen,
        Self::Rcas,
        Self::ComputeLuminancePyramid,
        Self::GenerateReactive,
        Self::TcrAutogenerate,
    ];

    /// Both accumulate variants share one shader.
    pub fn is_accumulate(self) -> bool {
        matches!(self, Self::Accumulate | Self::AccumulateSharpen)
    }
}
