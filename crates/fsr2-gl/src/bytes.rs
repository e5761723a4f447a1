//! Byte views of constant-buffer payloads.

/// View 32-bit constant words as the bytes uploaded to a uniform buffer.
pub(crate) fn words_as_bytes(words: &[u32]) -> &[u8] {
    // SAFETY: `u32` has no padding and every bit pattern is a valid `u8`
    // sequence; the byte slice covers exactly the same memory.
    unsafe { std::slice::from_raw_parts(words.as_ptr().cast::<u8>(), std::mem::size_of_val(words)) }
}
