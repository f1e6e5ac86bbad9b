//! Seeded random source for the simulation.

/// Xorshift64 generator; the same seed always yields the same flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a generator. Xorshift is stuck at zero, so a zero seed is
    /// replaced by a fixed non-zero constant.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// Next raw value
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / ((1u64 << 53) as f64)
    }

    /// Uniform integer in `[0, bound)`; zero when `bound` is zero
    pub fn bounded(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(bound)) as u32
    }

    /// Integer variation in `-amplitude..=amplitude`, truncated towards zero
    pub fn variation(&mut self, amplitude: f64) -> i32 {
        ((self.next_f64() * 2.0 - 1.0) * amplitude) as i32
    }

    /// True with the given probability
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DeterministicRng::new(7);
        let mut b = DeterministicRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_zero_seed_is_not_stuck() {
        let mut rng = DeterministicRng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_bounded_zero() {
        assert_eq!(DeterministicRng::default().bounded(0), 0);
    }

    proptest! {
        #[test]
        fn prop_unit_interval(seed in any::<u64>()) {
            let mut rng = DeterministicRng::new(seed);
            for _ in 0..32 {
                let v = rng.next_f64();
                prop_assert!((0.0..1.0).contains(&v));
            }
        }

        #[test]
        fn prop_variation_within_amplitude(seed in any::<u64>(), amplitude in 0u8..5) {
            let mut rng = DeterministicRng::new(seed);
            let a = i32::from(amplitude);
            for _ in 0..32 {
                let v = rng.variation(f64::from(amplitude));
                prop_assert!((-a..=a).contains(&v));
            }
        }

        #[test]
        fn prop_bounded_below_bound(seed in any::<u64>(), bound in 1u32..1000) {
            let mut rng = DeterministicRng::new(seed);
            prop_assert!(rng.bounded(bound) < bound);
        }
    }
}
