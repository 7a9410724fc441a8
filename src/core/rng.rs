//! Deterministic random number generation.
//!
//! Engines are pure functions, so randomness (Japan order shuffles) cannot
//! come from a thread-local generator. Instead the game stores a
//! `GameRngState`; an engine restores a `GameRng` from it, draws, and
//! writes the advanced state into the new game value.
//!
//! ```
//! use cue_score::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let saved = rng.state();
//! let mut first = vec![1, 2, 3, 4, 5];
//! rng.shuffle(&mut first);
//!
//! // Restoring replays the same sequence
//! let mut restored = GameRng::from_state(&saved);
//! let mut again = vec![1, 2, 3, 4, 5];
//! restored.shuffle(&mut again);
//! assert_eq!(again, first);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state.
///
/// Uses the ChaCha8 word position for O(1) capture regardless of
/// how many random numbers have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter), written as a decimal string
    #[serde(with = "word_pos_string")]
    pub word_pos: u128,
}

impl GameRngState {
    /// State of a freshly seeded RNG.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { seed, word_pos: 0 }
    }
}

/// Tagged enums buffer their fields before dispatch and that buffer has no
/// 128-bit integers, so the counter travels as text.
mod word_pos_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
