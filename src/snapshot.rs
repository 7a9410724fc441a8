//! JSON snapshots of a game, sufficient to resume it.
//!
//! The snapshot carries the full `Game`: shot log, score history, Japan
//! rack and order history, and the last saved clock state.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{Result, ScoreError};
use crate::core::state::Game;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned wrapper around a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub game: Game,
}

impl GameSnapshot {
    #[must_use]
    pub fn new(game: Game) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            game,
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot, rejecting versions this build cannot read and
    /// games the engines could not continue.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ScoreError::SnapshotVersion(snapshot.version));
        }
        validate(&snapshot.game)?;
        debug!(game_id = %snapshot.game.id, shots = snapshot.game.shot_history.len(), "snapshot loaded");
        Ok(snapshot)
    }
}

/// Turn bookkeeping must point at a real player. A game in progress needs
/// players and exactly one active flag, on the current player.
fn validate(game: &Game) -> Result<()> {
    let count = game.player_count();
    if count == 0 {
        if game.is_in_progress() {
            return Err(ScoreError::InvalidSnapshot("game in progress has no players".into()));
        }
        return Ok(());
    }

    if game.current_player_index >= count {
        return Err(ScoreError::InvalidSnapshot(format!(
            "current player index {} out of range for {} players",
            game.current_player_index, count
        )));
    }

    if game.is_in_progress() {
        let active: Vec<usize> = game
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active)
            .map(|(i, _)| i)
            .collect();
        if active != [game.current_player_index] {
            warn!(game_id = %game.id, ?active, current = game.current_player_index, "active flags disagree");
            return Err(ScoreError::InvalidSnapshot(format!(
                "expected player {} as the only active player, found {:?}",
                game.current_player_index, active
            )));
        }
    }
    Ok(())
}

impl Game {
    /// Serialize as a versioned snapshot.
    pub fn to_json(&self) -> Result<String> {
        GameSnapshot::new(self.clone()).to_json()
    }

    /// Restore from a versioned snapshot.
    pub fn from_json(json: &str) -> Result<Game> {
        GameSnapshot::from_json(json).map(|s| s.game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Variant;
    use crate::core::player::{Player, PlayerId, PlayerSetup};

    fn game() -> Game {
        let players = (0..2)
            .map(|i| Player::from_setup(PlayerId::for_seat(i), &PlayerSetup::new(format!("P{}", i + 1))))
            .collect();
        Game::new("g", Variant::SetMatch, players)
    }

    #[test]
    fn test_snapshot_has_version() {
        let json = game().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["game"]["status"], "IN_PROGRESS");
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut value = serde_json::to_value(GameSnapshot::new(game())).unwrap();
        value["version"] = 99.into();

        let err = Game::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err, ScoreError::SnapshotVersion(99));
    }

    #[test]
    fn test_current_player_out_of_range_rejected() {
        let mut value = serde_json::to_value(GameSnapshot::new(game())).unwrap();
        value["game"]["currentPlayerIndex"] = 7.into();

        let err = Game::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_empty_players_rejected_while_in_progress() {
        let mut value = serde_json::to_value(GameSnapshot::new(game())).unwrap();
        value["game"]["players"] = serde_json::Value::Array(Vec::new());

        let err = Game::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err, ScoreError::InvalidSnapshot("game in progress has no players".into()));

        let empty = Game::new("g", Variant::SetMatch, im::Vector::new());
        assert_eq!(Game::from_json(&empty.to_json().unwrap()).unwrap(), empty);
    }

    #[test]
    fn test_two_active_players_rejected() {
        let mut value = serde_json::to_value(GameSnapshot::new(game())).unwrap();
        value["game"]["players"][1]["isActive"] = true.into();

        let err = Game::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Game::from_json("{"), Err(ScoreError::Snapshot(_))));
    }
}
