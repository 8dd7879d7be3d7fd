//! Deterministic per-asset RNG.
//!
//! The seed is a BLAKE3 hash of the canonical asset id, so the synthetic
//! series for a given asset is reproducible across runs and threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Derive a seed from an asset id.
pub fn asset_seed(asset_id: &str) -> u64 {
    let hash = blake3::hash(asset_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

pub fn rng_for(asset_id: &str) -> StdRng {
    StdRng::seed_from_u64(asset_seed(asset_id))
}

/// Sample N(mean, std_dev) via Box-Muller.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // u1 in (0, 1] keeps ln finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}
