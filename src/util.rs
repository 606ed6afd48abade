use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps a key to a deterministic pair in `[-1, 1]²`.
pub fn stable_pair(key: &str) -> (f32, f32) {
    stable_pair_salted(key, 0)
}

pub fn stable_pair_salted(key: &str, salt: u64) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Rolling string hash over UTF-16 code units, `h = c + ((h << 5) - h)`.
///
/// Only the shift wraps to 32 bits; the sum and difference are carried in `f64`,
/// so the accumulator may leave the `i32` range between steps.
pub fn rolling_hash(key: &str) -> f64 {
    key.encode_utf16().fold(0.0f64, |hash, unit| {
        let shifted = wrap_i32(hash).wrapping_shl(5);
        f64::from(unit) + (f64::from(shifted) - hash)
    })
}

/// Truncates toward zero and wraps modulo 2³² into the signed 32-bit range.
fn wrap_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    (value.trunc().rem_euclid(4_294_967_296.0) as u32) as i32
}
