//! Flat error taxonomy shared by every backend.
//!
//! Recoverable driver conditions (missing extension, shader compile/link
//! failure, unmappable buffer) and fixed-capacity overflows are reported as
//! [`Fsr2Error`]. Misuse that indicates a configuration bug (a constant
//! payload larger than a uniform slot, a binding table overflow, a copy job
//! on a backend without copy support) panics instead.

use thiserror::Error;

/// Result alias used throughout the backend interface.
pub type Result<T> = std::result::Result<T, Fsr2Error>;

/// Errors reported by backend operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fsr2Error {
    /// A required argument was missing.
    #[error("required pointer argument was null")]
    InvalidPointer,

    /// The caller-provided scratch memory cannot hold the backend context.
    #[error("scratch memory too small: need {required} bytes, got {provided}")]
    InsufficientMemory { required: usize, provided: usize },

    /// A graphics driver call failed.
    #[error("backend API error: {0}")]
    BackendApi(&'static str),

    /// A fixed-capacity container is full.
    #[error("{container} capacity of {capacity} exceeded")]
    CapacityExceeded {
        container: &'static str,
        capacity: usize,
    },
}

impl Fsr2Error {
    pub const CODE_INVALID_POINTER: u32 = 0x8000_0000;
    pub const CODE_OUT_OF_MEMORY: u32 = 0x8000_0007;
    pub const CODE_BACKEND_API_ERROR: u32 = 0x8000_000d;
    pub const CODE_INSUFFICIENT_MEMORY: u32 = 0x8000_000e;

    /// Numeric FFX error code for hosts speaking the C interface.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidPointer => Self::CODE_INVALID_POINTER,
            Self::InsufficientMemory { .. } => Self::CODE_INSUFFICIENT_MEMORY,
            Self::BackendApi(_) => Self::CODE_BACKEND_API_ERROR,
            Self::CapacityExceeded { .. } => Self::CODE_OUT_OF_MEMORY,
        }
    }
}
