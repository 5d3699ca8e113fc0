//! Deterministic randomness for the simulation.
//!
//! The world owns exactly one [`WorldRng`], seeded from the world seed. All
//! in-simulation randomness (NPC walks, spawn placement, seeding) draws from
//! it in tick order, so two runs with the same seed and the same ordered
//! action stream produce identical worlds.
//!
//! Draws the contract keys explicitly -- the 30% tree-seed drop is keyed by
//! `(resource_id, tick)` -- use the stateless [`keyed_draw`] so they cannot
//! be perturbed by unrelated draws earlier in the tick.

/// A stateful `xorshift64*` generator owned by the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldRng {
    /// Internal generator state; never zero.
    state: u64,
}

impl WorldRng {
    /// Create a generator from the world seed.
    pub const fn new(seed: u64) -> Self {
        // xorshift requires non-zero state.
        let state = if seed == 0 { 0xdead_beef_cafe_babe } else { seed };
        Self { state }
    }

    /// Rebuild a generator from a persisted state word.
    pub const fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// The current state word, for persistence.
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Draw the next 64-bit value.
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Draw a value in `[0, bound)`. Returns 0 when `bound` is 0.
    pub const fn next_below(&mut self, bound: u64) -> u64 {
        let raw = self.next_u64();
        match raw.checked_rem(bound) {
            Some(value) => value,
            None => 0,
        }
    }

    /// Draw a float in `[0, 1)`.
    // 53 mantissa bits fit f64 exactly, so the casts are lossless.
    #[allow(clippy::cast_precision_loss)]
    pub fn next_f64(&mut self) -> f64 {
        let mantissa = self.next_u64() >> 11;
        let scale = (1_u64 << 53) as f64;
        mantissa as f64 / scale
    }

    /// Draw a float in `[lo, hi)`.
    pub fn next_range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Roll a percentage check: true with probability `percent`/100.
    pub const fn percent(&mut self, percent: u64) -> bool {
        self.next_below(100) < percent
    }
}

/// Stateless deterministic draw keyed by two values.
///
/// Combines the world seed and both keys with a mixing step to avoid
/// trivial patterns, then runs one xorshift64 round. The same inputs
/// always produce the same output.
pub const fn keyed_draw(world_seed: u64, key_a: u64, key_b: u64) -> u64 {
    // 0x517cc1b727220a95 and 0x9e3779b97f4a7c15 are well-known mixing
    // constants (splitmix64 family).
    let mut state = world_seed
        .wrapping_add(key_a.wrapping_mul(0x517c_c1b7_2722_0a95))
        .wrapping_add(key_b.wrapping_mul(0x9e37_79b9_7f4a_7c15));

    // Ensure non-zero state (xorshift requires non-zero input).
    if state == 0 {
        state = 0xdead_beef_cafe_babe;
    }

    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;

    state
}
