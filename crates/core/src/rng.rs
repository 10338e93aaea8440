//! RNG module - deterministic tile generation
//!
//! Every new tile draws its kind uniformly from the session's kind set. There is no
//! bag and no anti-match bias: a refill may immediately complete another run.
//!
//! A small LCG keeps sessions reproducible from a seed.

use crate::types::{Special, TileKind};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of a power-of-two LCG cycle quickly.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// True with probability `per_mille / 1000`
    pub fn chance_per_mille(&mut self, per_mille: u16) -> bool {
        per_mille > 0 && self.next_range(1000) < u32::from(per_mille)
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Kind and special tag for a tile about to be spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDraw {
    pub kind: TileKind,
    pub special: Option<Special>,
}

/// Uniform tile generator
#[derive(Debug, Clone)]
pub struct TileSource {
    rng: SimpleRng,
    kind_count: u8,
    bomb_per_mille: u16,
}

impl TileSource {
    pub fn new(seed: u32, kind_count: u8, bomb_per_mille: u16) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            kind_count: kind_count.max(1),
            bomb_per_mille,
        }
    }

    pub fn kind_count(&self) -> u8 {
        self.kind_count
    }

    /// Uniformly random kind
    pub fn draw_kind(&mut self) -> TileKind {
        TileKind::new(self.rng.next_range(u32::from(self.kind_count)) as u8)
    }

    /// Draw a refill tile; may be an area-clear tile targeting the drawn kind
    pub fn draw(&mut self) -> TileDraw {
        let kind = self.draw_kind();
        let special = if self.rng.chance_per_mille(self.bomb_per_mille) {
            Some(Special::AreaClear)
        } else {
            None
        };
        TileDraw { kind, special }
    }

    /// Plain tile for the opening board
    pub fn draw_plain(&mut self) -> TileDraw {
        TileDraw {
            kind: self.draw_kind(),
            special: None,
        }
    }

    pub fn rng_mut(&mut self) -> &mut SimpleRng {
        &mut self.rng
    }

    /// Current RNG state, used to continue the sequence on restart
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);

        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(5) < 5);
        }
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_draw_kind_covers_all_kinds() {
        let mut source = TileSource::new(99, 5, 0);
        let mut seen = [0u32; 5];
        for _ in 0..5000 {
            seen[source.draw_kind().index() as usize] += 1;
        }

        // Roughly uniform: every kind within 20% of the expected 1000
        for count in seen {
            assert!((800..=1200).contains(&count), "skewed counts: {:?}", seen);
        }
    }

    #[test]
    fn test_bomb_chance_extremes() {
        let mut never = TileSource::new(3, 5, 0);
        let mut always = TileSource::new(3, 5, 1000);
        for _ in 0..200 {
            assert_eq!(never.draw().special, None);
            assert_eq!(always.draw().special, Some(Special::AreaClear));
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SimpleRng::new(42);
        let mut values: Vec<u32> = (0..32).collect();
        rng.shuffle(&mut values);
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }
}
