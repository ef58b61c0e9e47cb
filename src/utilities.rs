/// Views a slice of plain data (`u32`, `f32`, `#[repr(C)]` vertices) as bytes.
#[inline(always)]
pub fn typed_to_bytes<T: Copy>(typed: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(typed.as_ptr().cast(), std::mem::size_of_val(typed)) }
}

/// Reads `N` native-endian floats starting at `offset`.
///
/// Panics if `bytes` is too short, which would mean the caller computed a
/// stride or offset that does not match the buffer.
#[inline(always)]
pub fn read_f32s<const N: usize>(bytes: &[u8], offset: usize) -> [f32; N] {
    let mut out = [0f32; N];
    for (i, value) in out.iter_mut().enumerate() {
        let start = offset + i * 4;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[start..start + 4]);
        *value = f32::from_ne_bytes(raw);
    }
    out
}

#[inline(always)]
pub fn write_u16s(bytes: &mut [u8], offset: usize, values: &[u16]) {
    for (i, value) in values.iter().enumerate() {
        let start = offset + i * 2;
        bytes[start..start + 2].copy_from_slice(&value.to_ne_bytes());
    }
}

#[inline(always)]
pub fn read_u16s<const N: usize>(bytes: &[u8], offset: usize) -> [u16; N] {
    let mut out = [0u16; N];
    for (i, value) in out.iter_mut().enumerate() {
        let start = offset + i * 2;
        *value = u16::from_ne_bytes([bytes[start], bytes[start + 1]]);
    }
    out
}

/// Rounds `v` to the nearest integer and converts to 16 bits.
///
/// Values outside `[0, 65535]` saturate rather than wrap; non-unit input to the
/// direction codec therefore loses precision silently instead of aliasing.
#[inline(always)]
pub fn quantize_u16(v: f32) -> u16 {
    v.round() as u16
}
