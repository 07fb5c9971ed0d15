// Deterministic, portable pseudo-random number generator.
//
// xoshiro256++ seeded through SplitMix64. Every "random" musical choice in the
// crate (sample variants, bass patterns, noise oscillators) draws from an
// instance of `Prng`, and every instance is built from an explicit `Seed`.
// Nothing in the composition or render path reads system entropy.
//
// The generator core is integer-only so its output is identical on every
// platform. Floats only appear when converting a finished u64 to [0, 1).

use serde::{Deserialize, Serialize};

/// An explicit seed. Composite seeds are built by folding values in with
/// [`Seed::mix`], so the same inputs always land on the same stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(pub u64);

impl Seed {
    /// Seed keyed by mood only. Two parameter vectors with the same energy and
    /// valence pick the same sample variants and bass patterns.
    pub fn from_mood(energy: f64, valence: f64) -> Self {
        Seed(0x6d6f_6f64_7472_6b21)
            .mix(energy.to_bits())
            .mix(valence.to_bits())
    }

    /// Fold another value into this seed.
    pub fn mix(self, value: u64) -> Self {
        let mut state = self.0 ^ value.rotate_left(17);
        Seed(splitmix64(&mut state))
    }

    /// Derive a sub-seed for one named decision, e.g. `seed.derive(b"bass", slot)`.
    pub fn derive(self, salt: &[u8], index: u64) -> Self {
        let mut seed = self;
        for chunk in salt.chunks(8) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            seed = seed.mix(u64::from_le_bytes(word));
        }
        seed.mix(index)
    }

    pub fn rng(self) -> Prng {
        Prng::new(self.0)
    }
}

/// xoshiro256++ state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Prng {
    s: [u64; 4],
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform `f32` in [-1, 1). Used for noise oscillators.
    pub fn next_bipolar(&mut self) -> f32 {
        ((self.next_u64() >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
    }

    /// Uniform integer in `[0, bound)` without modulo bias.
    ///
    /// Panics if `bound == 0`.
    pub fn below(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "below: bound must be positive");
        if bound.is_power_of_two() {
            return self.next_u64() & (bound - 1);
        }
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    pub fn index(&mut self, len: usize) -> usize {
        self.below(len as u64) as usize
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
