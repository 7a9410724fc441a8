//! Japan rules: multi-player point redistribution per rack.
//!
//! ## Rack lifecycle
//!
//! - **accumulating**: players pocket balls, each worth 1 point (handicap
//!   balls worth the configured weight)
//! - **multiplier-set**: optional, scales every point earned in the rack
//! - **rack-complete**: points are redistributed, the result is appended to
//!   the rack history and rack-local state resets; the shot log is kept as
//!   the undo log
//!
//! ## Modules
//!
//! - `calculator`: redistribution from the shot log
//! - `order`: turn-order rotation with cycle avoidance
//! - `engine`: `JapanEngine`, the `GameEngine` for this variant

pub mod calculator;
pub mod order;
pub mod engine;

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::config::JapanSettings;
use crate::core::player::PlayerId;
use crate::core::rng::GameRngState;

pub use calculator::calculate_current_rack_results;
pub use engine::{JapanAction, JapanEngine, MAX_MULTIPLIER, MIN_MULTIPLIER};

/// One player's outcome for a completed rack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JapanPlayerResult {
    pub player_id: PlayerId,
    /// Points earned in the rack, multiplier applied.
    pub earned_points: i64,
    /// Net change after redistribution.
    pub delta_points: i64,
    /// Running total through this rack.
    pub total_points: i64,
}

/// A completed rack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JapanRackResult {
    pub rack: u32,
    pub multiplier: u32,
    /// Turn order the rack was played in.
    pub player_order: Vec<PlayerId>,
    /// One entry per player, in turn order.
    pub results: Vec<JapanPlayerResult>,
}

/// A closed span of racks played under one turn order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPeriod {
    pub from_rack: u32,
    pub to_rack: u32,
    pub player_order: Vec<PlayerId>,
}

/// Japan extension block of a `Game`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JapanData {
    pub settings: JapanSettings,

    /// Multiplier for the current rack.
    pub multiplier: u32,

    #[serde(rename = "japanRackHistory")]
    pub rack_history: Vector<JapanRackResult>,

    #[serde(rename = "japanPlayerOrderHistory")]
    pub order_history: Vector<OrderPeriod>,

    /// First rack played under the current order.
    pub order_period_start: u32,

    pub rng: GameRngState,
}

impl JapanData {
    /// Fresh block for a new game.
    #[must_use]
    pub fn new(settings: JapanSettings, seed: u64) -> Self {
        Self {
            settings,
            multiplier: MIN_MULTIPLIER,
            rack_history: Vector::new(),
            order_history: Vector::new(),
            order_period_start: 1,
            rng: GameRngState::seeded(seed),
        }
    }

    /// Running total of `player` after the last completed rack.
    #[must_use]
    pub fn total_points(&self, player: &PlayerId) -> i64 {
        self.rack_history
            .last()
            .and_then(|rack| rack.results.iter().find(|r| &r.player_id == player))
            .map_or(0, |r| r.total_points)
    }

    /// Turn order recorded for a past rack, if it falls in a closed period.
    #[must_use]
    pub fn recorded_order_for_rack(&self, rack: u32) -> Option<&[PlayerId]> {
        self.order_history
            .iter()
            .find(|p| (p.from_rack..=p.to_rack).contains(&rack))
            .map(|p| p.player_order.as_slice())
    }
}
