//! Legacy rolling checksum.
//!
//! A 32-bit `h = h * 31 + c` fold over UTF-16 code units, rendered as the
//! lowercase hex of its absolute value. Not collision resistant. Offered as a
//! cheaper alternative to SHA-256; block preimages differ from any other
//! system's, so it does not verify chains written elsewhere.

/// Compute the rolling checksum of `data`.
pub fn rolling_checksum(data: &str) -> String {
    let hash = data
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32));

    // i32::MIN has no positive i32 counterpart
    format!("{:x}", (hash as i64).abs())
}
