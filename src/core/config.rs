//! Game configuration types.
//!
//! A game is configured once at creation by a `GameSetup`:
//! - `Variant`: which rule set is played
//! - `VariantSettings`: the rule set's tunables
//! - `PlayerSetup`: one per seat, in turn order
//! - optional `ChessClockSettings`
//!
//! Out-of-range values are clamped here, at the boundary, so the engines
//! never have to reject configuration.

use serde::{Deserialize, Serialize};

use super::error::ScoreError;
use super::player::PlayerSetup;
use crate::clock::ChessClockSettings;

/// Rule set tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Head-to-head race to a number of sets.
    SetMatch,
    /// Ball-value scoring race to a target (15-ball rotation).
    Rotation,
    /// Single-player bowling scored with balls.
    Bowlard,
    /// Multi-player point redistribution per rack.
    Japan,
}

impl Variant {
    /// All variants, in a stable order.
    pub const ALL: [Variant; 4] = [
        Variant::SetMatch,
        Variant::Rotation,
        Variant::Bowlard,
        Variant::Japan,
    ];

    /// Stable string id (matches the serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Variant::SetMatch => "set_match",
            Variant::Rotation => "rotation",
            Variant::Bowlard => "bowlard",
            Variant::Japan => "japan",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "set_match" | "setmatch" | "set" => Ok(Variant::SetMatch),
            "rotation" => Ok(Variant::Rotation),
            "bowlard" | "bowliard" => Ok(Variant::Bowlard),
            "japan" | "japan_rules" => Ok(Variant::Japan),
            _ => Err(ScoreError::UnknownVariant(s.to_string())),
        }
    }
}

/// SetMatch tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMatchSettings {
    /// Sets needed to win when a player has no individual target.
    pub target_sets: u32,
}

impl Default for SetMatchSettings {
    fn default() -> Self {
        Self { target_sets: 5 }
    }
}

impl SetMatchSettings {
    /// Set the default race length (at least 1).
    #[must_use]
    pub fn with_target_sets(mut self, sets: u32) -> Self {
        self.target_sets = sets.max(1);
        self
    }
}

/// Rotation tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSettings {
    /// Points needed to win when a player has no individual target.
    /// 120 is the sum of balls 1..=15.
    pub target_score: i64,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self { target_score: 120 }
    }
}

impl RotationSettings {
    /// Set the default target (at least 1).
    #[must_use]
    pub fn with_target_score(mut self, target: i64) -> Self {
        self.target_score = target.max(1);
        self
    }
}

/// Japan rules tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JapanSettings {
    /// Ball numbers carrying a handicap weight.
    pub handicap_balls: Vec<u8>,

    /// Points for pocketing a handicap ball. Every other ball is worth 1.
    pub handicap_weight: i64,

    /// Rotate the player order every N completed racks (0 = never).
    pub order_change_interval: u32,
}

impl Default for JapanSettings {
    fn default() -> Self {
        Self {
            handicap_balls: vec![5, 9],
            handicap_weight: 1,
            order_change_interval: 0,
        }
    }
}

impl JapanSettings {
    /// Set the handicap balls.
    #[must_use]
    pub fn with_handicap_balls(mut self, balls: impl Into<Vec<u8>>) -> Self {
        self.handicap_balls = balls.into();
        self
    }

    /// Set the handicap weight (at least 1).
    #[must_use]
    pub fn with_handicap_weight(mut self, weight: i64) -> Self {
        self.handicap_weight = weight.max(1);
        self
    }

    /// Enable automatic order rotation every `racks` completed racks.
    #[must_use]
    pub fn with_order_change_interval(mut self, racks: u32) -> Self {
        self.order_change_interval = racks;
        self
    }

    /// Points earned for pocketing `ball`.
    #[must_use]
    pub fn ball_points(&self, ball: u8) -> i64 {
        if self.handicap_balls.contains(&ball) {
            self.handicap_weight
        } else {
            1
        }
    }
}

/// Variant-specific settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum VariantSettings {
    SetMatch(SetMatchSettings),
    Rotation(RotationSettings),
    Bowlard,
    Japan(JapanSettings),
}

impl VariantSettings {
    /// Default settings for a variant.
    #[must_use]
    pub fn default_for(variant: Variant) -> Self {
        match variant {
            Variant::SetMatch => VariantSettings::SetMatch(SetMatchSettings::default()),
            Variant::Rotation => VariantSettings::Rotation(RotationSettings::default()),
            Variant::Bowlard => VariantSettings::Bowlard,
            Variant::Japan => VariantSettings::Japan(JapanSettings::default()),
        }
    }

    /// The variant these settings configure.
    #[must_use]
    pub fn variant(&self) -> Variant {
        match self {
            VariantSettings::SetMatch(_) => Variant::SetMatch,
            VariantSettings::Rotation(_) => Variant::Rotation,
            VariantSettings::Bowlard => Variant::Bowlard,
            VariantSettings::Japan(_) => Variant::Japan,
        }
    }
}

/// Everything needed to create a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSetup {
    /// Seats in turn order.
    pub players: Vec<PlayerSetup>,

    pub settings: VariantSettings,

    /// Enables the chess clock when present.
    pub chess_clock: Option<ChessClockSettings>,

    /// Seed for every random decision the game makes.
    pub seed: u64,
}

impl GameSetup {
    /// Create a setup with default settings for `variant`.
    pub fn new(variant: Variant) -> Self {
        Self {
            players: Vec::new(),
            settings: VariantSettings::default_for(variant),
            chess_clock: None,
            seed: 0,
        }
    }

    /// The configured variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.settings.variant()
    }
}
