//! Rules engine trait for variant implementations.
//!
//! Each variant implements `GameEngine` to define:
//! - The initial state of a game
//! - How an action turns one game value into the next
//! - How the last recorded action is undone
//! - Victory conditions

use serde::{Deserialize, Serialize};

use crate::core::config::{GameSetup, Variant};
use crate::core::player::PlayerId;
use crate::core::state::Game;

/// Result of a victory check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictoryResult {
    pub is_game_over: bool,
    pub winner_id: Option<PlayerId>,
}

impl VictoryResult {
    /// The game continues.
    #[must_use]
    pub fn ongoing() -> Self {
        Self::default()
    }

    /// The game is over with a single winner.
    #[must_use]
    pub fn won_by(winner: PlayerId) -> Self {
        Self {
            is_game_over: true,
            winner_id: Some(winner),
        }
    }

    /// The game is over without a winner.
    #[must_use]
    pub fn finished() -> Self {
        Self {
            is_game_over: true,
            winner_id: None,
        }
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: &PlayerId) -> bool {
        self.winner_id.as_ref() == Some(player)
    }
}

/// Rules engine trait.
///
/// Every method is a pure function of its arguments: the input game is
/// never modified and a new value is returned instead.
///
/// ## Implementation Notes
///
/// - `apply_action`: append exactly one shot per logical action; return the
///   input unchanged for actions that cannot apply (completed game, unknown
///   player, out-of-range ball)
/// - `undo`: reverse exactly the last shot; empty history is a no-op
/// - `check_victory`: never mutates
pub trait GameEngine {
    /// Variant-specific action payload.
    type Action;

    /// The variant this engine plays.
    fn variant(&self) -> Variant;

    /// Build the initial state: scores at 0, first player active, rack 1.
    fn initialize(&self, setup: &GameSetup) -> Game;

    /// Apply an action, returning the next game value.
    fn apply_action(&self, game: &Game, action: &Self::Action) -> Game;

    /// Reverse the last recorded shot.
    fn undo(&self, game: &Game) -> Game;

    /// Check if the game is over.
    fn check_victory(&self, game: &Game) -> VictoryResult;
}
