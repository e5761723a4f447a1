//! Resource descriptions and handles.

use std::num::NonZeroU64;

use bitflags::bitflags;
use num_derive::FromPrimitive;

use crate::name::FixedName;

/// Abstract pixel formats understood by the upscaler.
#[repr(u32)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum SurfaceFormat {
    #[default]
    Unknown = 0,
    R32G32B32A32Typeless,
    R32G32B32A32Float,
    R16G16B16A16Float,
    R16G16B16A16Unorm,
    R32G32Float,
    R32Uint,
    R8G8B8A8Typeless,
    R8G8B8A8Unorm,
    R11G11B10Float,
    R16G16Float,
    R16G16Uint,
    R16Float,
    R16Uint,
    R16Unorm,
    R16Snorm,
    R8Unorm,
    R8Uint,
    R8G8Unorm,
    R32Float,
}

/// Dimensionality of a resource.
#[repr(u32)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum ResourceType {
    #[default]
    Buffer = 0,
    Texture1D,
    Texture2D,
    Texture3D,
}

impl ResourceType {
    pub fn is_buffer(self) -> bool {
        self == Self::Buffer
    }
}

bitflags! {
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ResourceFlags: u32 {
        const ALIASABLE = 1 << 0;
    }
}

bitflags! {
    /// Logical access state a resource is transitioned into before use.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ResourceStates: u32 {
        const UNORDERED_ACCESS = 1 << 0;
        const COMPUTE_READ = 1 << 1;
        const COPY_SRC = 1 << 2;
        const COPY_DEST = 1 << 3;
        const GENERIC_READ = Self::COPY_SRC.bits() | Self::COMPUTE_READ.bits();
    }
}

/// Shape and format of a resource.
///
/// For buffers `width` is the size in bytes. The all-zero value is what a
/// backend reports for the null handle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescription {
    pub resource_type: ResourceType,
    pub format: SurfaceFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Zero asks the backend to compute a full mip chain.
    pub mip_count: u32,
    pub flags: ResourceFlags,
}

impl ResourceDescription {
    /// Number of levels in a full mip chain: `1 + floor(log2(max(w, h, d)))`.
    pub fn full_mip_count(&self) -> u32 {
        let largest = self.width.max(self.height).max(self.depth).max(1);
        largest.ilog2() + 1
    }
}

/// Everything needed to create a backend-owned resource.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateResourceDescription<'a> {
    pub description: ResourceDescription,
    pub initial_state: ResourceStates,
    /// Contents of mip 0. For buffers the length must equal `width`.
    pub init_data: Option<&'a [u8]>,
    pub name: &'a str,
}

/// A native API object handle owned by the host, e.g. a GL texture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeResource(NonZeroU64);

impl NativeResource {
    /// `None` for the null object.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// A host-owned resource handed to the backend for the current frame.
///
/// The backend never takes ownership of `native`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalResource {
    pub native: Option<NativeResource>,
    pub description: ResourceDescription,
    pub state: ResourceStates,
    pub is_depth: bool,
    pub name: FixedName,
}

/// Index of a slot in a backend's resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(i32);

impl ResourceHandle {
    /// The "no resource" sentinel.
    pub const NULL: Self = Self(-1);

    pub fn from_index(index: usize) -> Self {
        Self(index as i32)
    }

    pub fn is_null(self) -> bool {
        self.0 < 0
    }

    /// Slot index, or `None` for the null handle.
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl Default for ResourceHandle {
    fn default() -> Self {
        Self::NULL
    }
}
