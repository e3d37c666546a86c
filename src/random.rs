//! Seeded random number generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates an RNG from an optional seed, drawing a fresh seed when `None`.
pub fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Uniform draw in the half-open interval `(0, 1]`.
///
/// The roulette wheel partitions `(0, 1]` into left-open intervals, so the
/// draw must never be exactly zero.
pub fn unit_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = create_rng(7);
        let mut b = create_rng(7);
        for _ in 0..16 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn test_unit_draw_range() {
        let mut rng = create_rng(42);
        for _ in 0..10_000 {
            let d = unit_draw(&mut rng);
            assert!(d > 0.0 && d <= 1.0, "draw out of (0, 1]: {d}");
        }
    }
}
