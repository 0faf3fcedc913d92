// Seedable random source for poem requests.
//
// `PoemRng` is xoshiro256++ with its state expanded from one `u64` by
// SplitMix64. On top of it sit the two things the poet needs: a weighted
// pick over integer counts (Markov transitions) and the seed trajectory used
// by seeded requests, where each random step first moves the seed along
// (`evolve_seed`) and then restarts the stream from the new value.
//
// Generators are owned by the request that created them. Nothing here is
// global, so two requests never consume from each other's streams.
//
// Output depends on the seed alone. Keep floats, std hashing and OS entropy
// out of this crate; callers wanting an unpredictable poem pass in a seed
// drawn from entropy.

use serde::{Deserialize, Serialize};

/// Seeds above this value are halved instead of tripled.
pub const SEED_HALVING_THRESHOLD: u64 = 1_000_000_000;

/// Xoshiro256++ generator behind every random choice in a poem.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoemRng {
    s: [u64; 4],
}

impl PoemRng {
    /// Generator whose whole output is fixed by `seed`.
    pub fn new(seed: u64) -> Self {
        let mut expander = seed;
        let mut s = [0u64; 4];
        for word in &mut s {
            *word = splitmix64(&mut expander);
        }
        Self { s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = self.s;
        let out = s0.wrapping_add(s3).rotate_left(23).wrapping_add(s0);

        let s2 = s2 ^ s0;
        let s3 = s3 ^ s1;
        let s1 = s1 ^ s2;
        let s0 = s0 ^ s3;
        self.s = [s0, s1, s2 ^ (self.s[1] << 17), s3.rotate_left(45)];

        out
    }

    /// Uniform draw from `low..high`, without modulo bias.
    ///
    /// # Panics
    /// When the range is empty.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "empty range {low}..{high}");
        let span = high - low;
        if span.is_power_of_two() {
            return low + (self.next_u64() & (span - 1));
        }
        // Values below `zone` would favour the low residues.
        let zone = span.wrapping_neg() % span;
        let draw = std::iter::repeat_with(|| self.next_u64())
            .find(|&r| r >= zone)
            .unwrap_or_default();
        low + draw % span
    }

    /// `range_u64` for indices.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Pick an index with probability proportional to its integer weight.
    ///
    /// Draws a point in `[0, total)` and returns the first index whose
    /// cumulative weight exceeds it. Returns `None` if the slice is empty or
    /// every weight is zero. Integer-only, so the choice is exact on every
    /// platform.
    pub fn weighted_index(&mut self, weights: &[u64]) -> Option<usize> {
        let total = weights
            .iter()
            .try_fold(0u64, |acc, &w| acc.checked_add(w))?;
        if total == 0 {
            return None;
        }
        let target = self.range_u64(0, total);
        let mut cumulative = 0u64;
        for (idx, &weight) in weights.iter().enumerate() {
            cumulative += weight;
            if cumulative > target {
                return Some(idx);
            }
        }
        None
    }
}

/// Advance a seed one step along its trajectory.
///
/// Seeds above one billion are halved (integer division); all others are
/// tripled. Starting below the threshold, tripling can reach at most three
/// billion, so the result always fits in a `u64`.
pub fn evolve_seed(seed: u64) -> u64 {
    if seed > SEED_HALVING_THRESHOLD {
        seed / 2
    } else {
        seed * 3
    }
}

/// A generator whose stream can be restarted from an evolving seed.
///
/// With a seed, every `advance()` moves the seed one step with
/// `evolve_seed` and reseeds the inner generator from the new value, so the
/// draw that follows depends only on the seed's trajectory. Without a seed,
/// `advance()` is a no-op and draws keep flowing from the initial stream.
#[derive(Clone, Debug)]
pub struct ReseedingRng {
    seed: Option<u64>,
    rng: PoemRng,
}

impl ReseedingRng {
    /// A deterministic generator following the trajectory of `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            rng: PoemRng::new(seed),
        }
    }

    /// A generator that never reseeds, drawing from `rng` as-is.
    pub fn unseeded(rng: PoemRng) -> Self {
        Self { seed: None, rng }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Evolve the seed and restart the stream from it.
    pub fn advance(&mut self) {
        if let Some(seed) = self.seed {
            let next = evolve_seed(seed);
            self.seed = Some(next);
            self.rng = PoemRng::new(next);
        }
    }

    /// The generator to draw the next value from.
    pub fn rng(&mut self) -> &mut PoemRng {
        &mut self.rng
    }
}

// SplitMix64 step; only used to fill the xoshiro state.
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
    fn equal_seeds_give_equal_sections() {
        let picks = |seed| {
            let mut rng = PoemRng::new(seed);
            (0..200).map(|_| rng.range_usize(0, 17)).collect::<Vec<_>>()
        };
        assert_eq!(picks(2024), picks(2024));
        assert_ne!(picks(2024), picks(2025));
    }

    #[test]
    fn seed_zero_is_not_degenerate() {
        let mut rng = PoemRng::new(0);
        let first = rng.next_u64();
        let mut again = PoemRng::new(0);
        assert_eq!(first, again.next_u64());
        assert_ne!(first, rng.next_u64());
    }

    #[test]
    fn section_index_stays_in_bounds() {
        let mut rng = PoemRng::new(31);
        let mut seen = [false; 7];
        for _ in 0..5_000 {
            let idx = rng.range_usize(0, 7);
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&hit| hit), "some section never picked");
    }

    #[test]
    fn single_section_is_always_chosen() {
        let mut rng = PoemRng::new(5);
        assert!((0..50).all(|_| rng.range_usize(0, 1) == 0));
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn empty_range_panics() {
        PoemRng::new(1).range_u64(4, 4);
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = PoemRng::new(7);
        for _ in 0..1000 {
            let idx = rng.weighted_index(&[0, 3, 0, 1]).unwrap();
            assert!(idx == 1 || idx == 3, "picked zero-weight index {idx}");
        }
    }

    #[test]
    fn weighted_index_empty_or_all_zero() {
        let mut rng = PoemRng::new(7);
        assert_eq!(rng.weighted_index(&[]), None);
        assert_eq!(rng.weighted_index(&[0, 0]), None);
    }

    #[test]
    fn weighted_index_overflowing_total_is_none() {
        let mut rng = PoemRng::new(7);
        assert_eq!(rng.weighted_index(&[u64::MAX, 1]), None);
    }

    #[test]
    fn weighted_index_roughly_proportional() {
        let mut rng = PoemRng::new(2024);
        let mut counts = [0u32; 2];
        for _ in 0..10_000 {
            counts[rng.weighted_index(&[1, 3]).unwrap()] += 1;
        }
        // Expect ~25% / ~75%.
        let pct = f64::from(counts[0]) / 10_000.0;
        assert!((0.20..0.30).contains(&pct), "got {:.1}%", pct * 100.0);
    }

    #[test]
    fn evolve_seed_halves_large_seeds() {
        assert_eq!(evolve_seed(2_000_000_000), 1_000_000_000);
        assert_eq!(evolve_seed(1_000_000_001), 500_000_000);
    }

    #[test]
    fn evolve_seed_triples_small_seeds() {
        assert_eq!(evolve_seed(100), 300);
        assert_eq!(evolve_seed(0), 0);
        // The threshold itself is not "above" it.
        assert_eq!(evolve_seed(1_000_000_000), 3_000_000_000);
    }

    #[test]
    fn reseeding_rng_follows_trajectory() {
        let mut rng = ReseedingRng::seeded(100);
        rng.advance();
        assert_eq!(rng.seed(), Some(300));
        let drawn = rng.rng().next_u64();
        assert_eq!(drawn, PoemRng::new(300).next_u64());
        rng.advance();
        assert_eq!(rng.seed(), Some(900));
    }

    #[test]
    fn reseeding_rng_restarts_stream_on_advance() {
        let mut a = ReseedingRng::seeded(11);
        let mut b = ReseedingRng::seeded(11);
        a.advance();
        b.advance();
        // Extra draws on `a` are forgotten by the next advance.
        a.rng().next_u64();
        a.rng().next_u64();
        a.advance();
        b.advance();
        assert_eq!(a.rng().next_u64(), b.rng().next_u64());
    }

    #[test]
    fn unseeded_rng_never_reseeds() {
        let mut a = ReseedingRng::unseeded(PoemRng::new(1));
        let mut plain = PoemRng::new(1);
        a.advance();
        assert_eq!(a.seed(), None);
        assert_eq!(a.rng().next_u64(), plain.next_u64());
        a.advance();
        assert_eq!(a.rng().next_u64(), plain.next_u64());
    }

    #[test]
    fn saved_generator_resumes_mid_stream() {
        let mut live = PoemRng::new(77);
        live.range_u64(0, 1_000);
        let saved = serde_json::to_value(&live).unwrap();
        let mut resumed: PoemRng = serde_json::from_value(saved).unwrap();
        let tail = |rng: &mut PoemRng| (0..20).map(|_| rng.range_u64(0, 9)).collect::<Vec<_>>();
        assert_eq!(tail(&mut live), tail(&mut resumed));
    }
}
