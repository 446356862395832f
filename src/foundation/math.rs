/// FNV-1a 64-bit hash over a sequence of byte slices.
///
/// Used to derive opaque identity tokens; not a cryptographic hash.
pub(crate) fn fnv1a64(parts: &[&[u8]]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut h = OFFSET_BASIS;
    for part in parts {
        for &b in *part {
            h ^= u64::from(b);
            h = h.wrapping_mul(PRIME);
        }
        // Separator keeps ("ab","c") and ("a","bc") distinct.
        h ^= 0xff;
        h = h.wrapping_mul(PRIME);
    }
    h
}

/// Linear blend of two channel values with `t` in `[0, 1]`.
pub(crate) fn mix_u8(dst: u8, src: u8, t: f64) -> u8 {
    let v = f64::from(dst) + (f64::from(src) - f64::from(dst)) * t;
    v.round().clamp(0.0, 255.0) as u8
}

/// Clamp a float channel value to the u8 range.
pub(crate) fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
