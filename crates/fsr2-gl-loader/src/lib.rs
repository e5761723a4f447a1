//! [`GlDevice`](fsr2_gl::GlDevice) implementation on top of the `gl` crate.
//!
//! The `gl` crate keeps its entry points in process-wide statics, so loading
//! happens once per process. [`GlFunctions`] is a token proving the required
//! entry points are present; it forwards every call to them.

mod functions;

pub use functions::{GlFunctions, REQUIRED_ENTRY_POINTS};
