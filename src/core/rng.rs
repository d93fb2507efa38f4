//! Request-scoped randomness.
//!
//! Every request owns exactly one [`RequestRng`], seeded once and then
//! threaded by `&mut` through the sweep and every pipeline step. Nothing in
//! the crate touches a global or thread-local generator.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generator type used for all augmentation randomness.
pub type RequestRng = ChaCha8Rng;

/// Seed used when a request does not supply one.
pub const DEFAULT_SEED: u64 = 0;

/// Build the generator for one request.
///
/// Absent seeds fall back to [`DEFAULT_SEED`], so unseeded requests are
/// still reproducible. Negative seeds keep their bit pattern.
pub fn request_rng(seed: Option<i64>) -> RequestRng {
    let seed = seed.map_or(DEFAULT_SEED, |s| s as u64);
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform draw from the closed range `[low, high]`.
///
/// A degenerate range returns `low` but still advances the generator so the
/// draw order does not depend on parameter values.
pub fn uniform(rng: &mut RequestRng, (low, high): (f64, f64)) -> f64 {
    let u: f64 = rng.gen();
    if high <= low {
        low
    } else {
        low + (high - low) * u
    }
}

/// Uniform integer from the closed range `[low, high]`.
pub fn uniform_int(rng: &mut RequestRng, low: i64, high: i64) -> i64 {
    if high <= low {
        let _: u32 = rng.gen();
        low
    } else {
        rng.gen_range(low..=high)
    }
}

/// Bernoulli gate: true with probability `p`.
///
/// Always consumes one draw, including for `p = 1.0`.
pub fn chance(rng: &mut RequestRng, p: f64) -> bool {
    let u: f64 = rng.gen();
    u < p
}
