//! Player identification and per-player score data.
//!
//! ## PlayerId
//!
//! Stable string identifier. Turn order changes during a game (Japan order
//! rotation), so players are never addressed by their position.
//!
//! ## Player
//!
//! The per-player slice of a `Game`: score, sets, pocketed balls and
//! bowling frames. Values are replaced, never mutated in place, by the
//! engines.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::rules::bowling::BowlingFrame;

/// Stable player identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a player ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// ID assigned to the player at `index` in the initial setup.
    ///
    /// ```
    /// use cue_score::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::for_seat(0).as_str(), "player-1");
    /// assert_eq!(PlayerId::for_seat(3).as_str(), "player-4");
    /// ```
    #[must_use]
    pub fn for_seat(index: usize) -> Self {
        Self(format!("player-{}", index + 1))
    }

    /// Borrow the raw string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Input for one seat when a game is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSetup {
    /// Display name.
    pub name: String,

    /// Points needed to win (Rotation). `None` uses the variant default.
    pub target_score: Option<i64>,

    /// Sets needed to win (SetMatch). `None` uses the variant default.
    pub target_sets: Option<u32>,
}

impl PlayerSetup {
    /// A setup with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_score: None,
            target_sets: None,
        }
    }

    /// Set a per-player target score (handicap in Rotation).
    #[must_use]
    pub fn with_target_score(mut self, target: i64) -> Self {
        self.target_score = Some(target);
        self
    }

    /// Set a per-player target set count (handicap in SetMatch).
    #[must_use]
    pub fn with_target_sets(mut self, target: u32) -> Self {
        self.target_sets = Some(target);
        self
    }
}

/// One player inside a `Game`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,

    pub name: String,

    /// Variant-defined score. Japan: raw points earned in the current rack.
    pub score: i64,

    pub target_score: Option<i64>,

    pub target_sets: Option<u32>,

    /// Sets won so far (SetMatch).
    pub sets_won: u32,

    /// Whose turn it is. Exactly one player is active while in progress.
    pub is_active: bool,

    /// Balls pocketed in the current rack, in order.
    pub balls_pocketed: Vector<u8>,

    /// Frames rolled so far (Bowlard only).
    pub bowling_frames: Option<Vector<BowlingFrame>>,
}

impl Player {
    /// Create a player from its setup with every counter at zero.
    #[must_use]
    pub fn from_setup(id: PlayerId, setup: &PlayerSetup) -> Self {
        Self {
            id,
            name: setup.name.clone(),
            score: 0,
            target_score: setup.target_score,
            target_sets: setup.target_sets,
            sets_won: 0,
            is_active: false,
            balls_pocketed: Vector::new(),
            bowling_frames: None,
        }
    }

    /// Reset per-rack data at a rack boundary.
    pub fn clear_rack(&mut self) {
        self.balls_pocketed.clear();
    }
}
