//! Seed handling for reproducible estimator calls.
//!
//! Every estimator call owns its random stream. When subjects and permutations
//! are evaluated in parallel, give each call its own seed from [`derive_seed`]
//! instead of sharing one generator.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Derive the seed of one (subject, permutation) call from a base seed.
///
/// Uses SplitMix64 finalization over a counter built from both indices, so
/// neighbouring indices give unrelated streams.
pub fn derive_seed(base_seed: u64, subject: u64, permutation: u64) -> u64 {
    let counter = subject
        .wrapping_mul(0xd1b5_4a32_d192_ed03)
        .wrapping_add(permutation);
    splitmix64(base_seed.wrapping_add(counter.wrapping_mul(0x9e37_79b9_7f4a_7c15)))
}

/// Portable generator for a given seed; identical streams on every platform.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn splitmix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
