// Seedable pseudo-random source for the jazz-hop composition engine.
//
// xoshiro256++ (Blackman & Vigna, 2019) expanded from a single `u64` seed via
// SplitMix64. Hand-rolled rather than pulled from `rand` so that a seed
// reproduces the same arrangement on every platform and toolchain: pattern
// picks, movement picks, tempo/key picks and every humanization jitter all
// come from one stream, in call order.
//
// The engine never reads process-wide randomness. Callers create one
// `SeededRng` per generation run and thread it by `&mut` through every
// component that makes a choice. Re-creating the generator from the same seed
// and replaying the same calls reproduces the run bit for bit.

use serde::{Deserialize, Serialize};

/// xoshiro256++ generator; the only randomness the engine consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    state: [u64; 4],
}

impl SeededRng {
    /// Seed a generator. Equal seeds yield equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let mut state = [0u64; 4];
        for word in &mut state {
            *word = splitmix64(&mut sm);
        }
        Self { state }
    }

    /// Next raw 64-bit output.
    pub fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[0].wrapping_add(s[3]).rotate_left(23).wrapping_add(s[0]);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1), built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform `f64` in `[low, high)`. A degenerate range (`low >= high`)
    /// returns `low` without consuming state.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        low + self.next_f64() * (high - low)
    }

    /// Uniform symmetric jitter in `[-amount, amount)`; zero amount is a no-op.
    pub fn jitter(&mut self, amount: f64) -> f64 {
        self.range_f64(-amount, amount)
    }

    /// Uniform integer in `[low, high)` without modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: empty range {low}..{high}");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        let threshold = span.wrapping_neg() % span;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + r % span;
            }
        }
    }

    /// Uniform index in `[0, len)`.
    ///
    /// Panics if `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        self.range_u64(0, len as u64) as usize
    }

    /// Uniform integer in `[low, high]`, both ends inclusive.
    ///
    /// Panics if `low > high`.
    pub fn range_i32_inclusive(&mut self, low: i32, high: i32) -> i32 {
        assert!(low <= high, "range_i32_inclusive: {low} > {high}");
        let span = (high as i64 - low as i64 + 1) as u64;
        (low as i64 + self.range_u64(0, span) as i64) as i32
    }

    /// Pick one element uniformly; `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.index(items.len())])
        }
    }

    /// `true` with probability `p`. `p <= 0` never fires, `p >= 1` always does.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// SplitMix64 step, used only to expand the seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_same_stream() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(43);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn unit_float_stays_in_range() {
        let mut rng = SeededRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "next_f64 out of range: {v}");
        }
    }

    #[test]
    fn jitter_is_symmetric_and_bounded() {
        let mut rng = SeededRng::new(7);
        let mut below = 0;
        for _ in 0..10_000 {
            let j = rng.jitter(0.01);
            assert!((-0.01..0.01).contains(&j), "jitter out of range: {j}");
            if j < 0.0 {
                below += 1;
            }
        }
        assert!((4_000..6_000).contains(&below), "jitter skewed: {below}");
    }

    #[test]
    fn zero_jitter_consumes_nothing() {
        let mut a = SeededRng::new(9);
        let b = a.clone();
        assert_eq!(a.jitter(0.0), -0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn inclusive_range_hits_both_ends() {
        let mut rng = SeededRng::new(666);
        let mut saw_low = false;
        let mut saw_high = false;
        for _ in 0..10_000 {
            let v = rng.range_i32_inclusive(-15, 15);
            assert!((-15..=15).contains(&v));
            saw_low |= v == -15;
            saw_high |= v == 15;
        }
        assert!(saw_low && saw_high, "inclusive range should reach both bounds");
    }

    #[test]
    fn choose_handles_empty_and_single() {
        let mut rng = SeededRng::new(1);
        let empty: [u8; 0] = [];
        assert_eq!(rng.choose(&empty), None);
        assert_eq!(rng.choose(&[5]), Some(&5));
    }

    #[test]
    fn chance_extremes() {
        let mut rng = SeededRng::new(42);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn chance_distribution() {
        let mut rng = SeededRng::new(42);
        let hits = (0..10_000).filter(|_| rng.chance(0.2)).count();
        assert!((1_800..2_200).contains(&hits), "chance(0.2) fired {hits} times");
    }

    #[test]
    fn serialized_state_resumes_stream() {
        let mut rng = SeededRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SeededRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
