//! Inline, fixed-size names for resources and shader bindings.

use std::fmt;

/// Size of a name buffer in bytes, including room for a C terminator.
pub const NAME_SIZE: usize = 64;

/// A UTF-8 name stored inline so descriptions stay `Copy` and allocation-free.
///
/// Names longer than 63 bytes are truncated at the last character boundary
/// that fits, leaving the final byte free for a NUL terminator when the name
/// is handed to the driver.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedName {
    bytes: [u8; NAME_SIZE],
    len: u8,
}

impl FixedName {
    pub const EMPTY: Self = Self {
        bytes: [0; NAME_SIZE],
        len: 0,
    };

    /// Longest name that can be stored, in bytes.
    pub const MAX_LEN: usize = NAME_SIZE - 1;

    /// Copy `name`, truncating it to [`MAX_LEN`](Self::MAX_LEN) bytes.
    pub fn new(name: &str) -> Self {
        let mut len = name.len().min(Self::MAX_LEN);
        while !name.is_char_boundary(len) {
            len -= 1;
        }

        let mut bytes = [0; NAME_SIZE];
        bytes[..len].copy_from_slice(&name.as_bytes()[..len]);

        Self {
            bytes,
            len: len as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        // Only whole characters are ever copied in.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    /// The name followed by a NUL terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes[..self.len as usize + 1]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for FixedName {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<&str> for FixedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
