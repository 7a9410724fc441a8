//! Recorded actions: the shot log.
//!
//! Every logical action applied to a game appends exactly one `Shot` to
//! `Game::shot_history`. The log is the single source of truth for undo:
//! each entry carries the values it overwrote, so undo pops the last entry
//! and restores them, and rack-local fields can be rebuilt by replaying the
//! entries after the last `RackComplete` marker.
//!
//! `ShotData` is closed: undo matches it exhaustively.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::player::PlayerId;
use super::rng::GameRngState;
use super::state::GameStatus;

/// Ball counts reported when a rack is closed without per-ball input.
///
/// Used by the SetMatch, Rotation and Bowlard engines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RackData {
    /// Player who won the rack, if any.
    pub winner_id: Option<PlayerId>,

    /// Raw number of balls each player pocketed in the rack.
    pub ball_counts: SmallVec<[(PlayerId, u32); 4]>,
}

impl RackData {
    /// Rack won by `winner` with no ball counts.
    pub fn won_by(winner: PlayerId) -> Self {
        Self {
            winner_id: Some(winner),
            ball_counts: SmallVec::new(),
        }
    }

    /// Add a ball count for a player.
    #[must_use]
    pub fn with_count(mut self, player: PlayerId, balls: u32) -> Self {
        self.ball_counts.push((player, balls));
        self
    }

    /// Reported count for `player` (0 if absent).
    #[must_use]
    pub fn count_for(&self, player: &PlayerId) -> u32 {
        self.ball_counts
            .iter()
            .filter(|(p, _)| p == player)
            .map(|(_, n)| *n)
            .sum()
    }
}

/// A turn-order change and everything needed to revert it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderChange {
    /// Order before the change.
    pub previous_order: Vec<PlayerId>,

    /// Order after the change.
    pub new_order: Vec<PlayerId>,

    /// First rack played under the previous order.
    pub previous_period_start: u32,

    /// Whether a period record was appended to the order history.
    pub pushed_period: bool,

    /// RNG state before any shuffling.
    pub previous_rng: GameRngState,
}

/// Payload of one shot, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ShotData {
    /// A ball pocketed by the acting player.
    BallClick {
        ball: u8,
        points: i64,
        previous_score: i64,
    },

    /// A set won by the acting player.
    SetWin { previous_sets: u32 },

    /// One roll in a bowlard frame.
    BowlingRoll {
        pins: u8,
        frame: u32,
        previous_score: i64,
    },

    /// Rack multiplier set to `value`.
    Multiplier { value: u32, previous: u32 },

    /// Rack multiplier scaled by `factor`, giving `value`.
    MultiplierAll {
        factor: u32,
        value: u32,
        previous: u32,
    },

    /// Points deducted from the acting player (foul).
    Deduction { points: i64, previous_score: i64 },

    /// The acting player's turn ended.
    TurnEnd,

    /// Turn order changed on demand.
    OrderChange(OrderChange),

    /// Rack closed. Marks the boundary between racks in the log.
    RackComplete {
        data: Option<RackData>,
        previous_sets: Option<u32>,
        order_change: Option<OrderChange>,
    },

    /// Game ended on demand.
    GameComplete {
        previous_status: GameStatus,
        previous_winner: Option<PlayerId>,
    },
}

impl ShotData {
    /// Tag string, as serialized.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ShotData::BallClick { .. } => "ball_click",
            ShotData::SetWin { .. } => "set_win",
            ShotData::BowlingRoll { .. } => "bowling_roll",
            ShotData::Multiplier { .. } => "multiplier",
            ShotData::MultiplierAll { .. } => "multiplier_all",
            ShotData::Deduction { .. } => "deduction",
            ShotData::TurnEnd => "turn_end",
            ShotData::OrderChange(_) => "order_change",
            ShotData::RackComplete { .. } => "rack_complete",
            ShotData::GameComplete { .. } => "game_complete",
        }
    }

    /// Does this shot put the current rack in progress?
    #[must_use]
    pub fn starts_rack(&self) -> bool {
        matches!(
            self,
            ShotData::BallClick { .. }
                | ShotData::SetWin { .. }
                | ShotData::BowlingRoll { .. }
                | ShotData::Multiplier { .. }
                | ShotData::MultiplierAll { .. }
                | ShotData::Deduction { .. }
        )
    }

    /// Is this a rack boundary marker?
    #[must_use]
    pub fn is_rack_complete(&self) -> bool {
        matches!(self, ShotData::RackComplete { .. })
    }
}

/// One entry of the shot log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    /// Acting player (the active player for table-wide actions).
    pub player_id: PlayerId,

    /// Rack the shot was recorded in.
    pub rack: u32,

    /// `current_player_index` before the shot.
    pub previous_player_index: usize,

    #[serde(rename = "customData")]
    pub data: ShotData,
}

impl Shot {
    /// Create a new shot.
    #[must_use]
    pub fn new(player_id: PlayerId, rack: u32, previous_player_index: usize, data: ShotData) -> Self {
        Self {
            player_id,
            rack,
            previous_player_index,
            data,
        }
    }
}

/// A reversible score delta.
///
/// Pushed by every score-changing shot and popped with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChange {
    pub player_id: PlayerId,
    pub delta: i64,
    pub previous_score: i64,
    /// Index in `shot_history` of the shot that produced the change.
    pub shot_index: usize,
}
