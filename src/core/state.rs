//! Game state: one immutable value per point in a match.
//!
//! ## Game
//!
//! - Players in turn order, with the active player's index
//! - Status, rack counters
//! - Score history (reversible deltas) and the shot log
//! - Optional chess clock settings and last saved clock state
//! - Optional Japan extension block
//!
//! Uses `im` persistent data structures, so an engine can clone the previous
//! game, change a few fields and return it without copying the logs.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{ScoreChange, Shot, ShotData};
use super::config::Variant;
use super::player::{Player, PlayerId};
use crate::clock::{ChessClockSettings, ChessClockState};
use crate::japan::JapanData;

/// Whether a game still accepts actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    InProgress,
    Completed,
}

/// Complete state of one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,

    pub variant: Variant,

    /// Players in turn order.
    pub players: Vector<Player>,

    pub current_player_index: usize,

    pub status: GameStatus,

    /// Rack being played (starts at 1).
    pub current_rack: u32,

    /// Racks completed so far.
    pub total_racks: u32,

    /// Has anything been scored in the current rack?
    pub rack_in_progress: bool,

    pub score_history: Vector<ScoreChange>,

    pub shot_history: Vector<Shot>,

    pub winner_id: Option<PlayerId>,

    pub chess_clock: Option<ChessClockSettings>,

    /// Last clock state saved by the host application.
    pub chess_clock_state: Option<ChessClockState>,

    /// Japan extension block. `None` for every other variant.
    pub japan: Option<JapanData>,
}

impl Game {
    /// Create a game with the given players. The first player is active.
    ///
    /// A game with no players has nobody to act and starts `Completed`.
    ///
    /// ## Defaults
    ///
    /// - `status`: InProgress
    /// - `current_rack`: 1
    /// - empty histories
    #[must_use]
    pub fn new(id: impl Into<String>, variant: Variant, players: Vector<Player>) -> Self {
        let status = if players.is_empty() {
            GameStatus::Completed
        } else {
            GameStatus::InProgress
        };

        let mut game = Self {
            id: id.into(),
            variant,
            players,
            current_player_index: 0,
            status,
            current_rack: 1,
            total_racks: 0,
            rack_in_progress: false,
            score_history: Vector::new(),
            shot_history: Vector::new(),
            winner_id: None,
            chess_clock: None,
            chess_clock_state: None,
            japan: None,
        };
        game.set_active(0);
        game
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::InProgress
    }

    // === Players ===

    /// Position of a player in the turn order.
    #[must_use]
    pub fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// Look up a player by ID.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    /// Player IDs in turn order.
    #[must_use]
    pub fn player_order(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    /// Make the player at `index` the only active player.
    pub fn set_active(&mut self, index: usize) {
        let index = index.min(self.players.len().saturating_sub(1));
        self.current_player_index = index;
        for (i, player) in self.players.iter_mut().enumerate() {
            player.is_active = i == index;
        }
    }

    /// Pass the turn to the next player in order.
    pub fn advance_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        let next = (self.current_player_index + 1) % self.players.len();
        self.set_active(next);
    }

    /// Apply `f` to the player with `id`. Returns false if there is none.
    pub fn update_player(&mut self, id: &PlayerId, f: impl FnOnce(&mut Player)) -> bool {
        match self.players.iter_mut().find(|p| &p.id == id) {
            Some(player) => {
                f(player);
                true
            }
            None => false,
        }
    }

    /// Reorder players to `order`, keeping each player's data.
    ///
    /// IDs missing from `order` are dropped, so callers must pass a
    /// permutation of the current order.
    pub fn reorder_players(&mut self, order: &[PlayerId]) {
        let reordered: Vector<Player> = order
            .iter()
            .filter_map(|id| self.player(id).cloned())
            .collect();
        debug_assert_eq!(reordered.len(), self.players.len());
        self.players = reordered;
    }

    // === Shot log ===

    /// Append a shot, returning its index.
    pub fn record_shot(&mut self, shot: Shot) -> usize {
        if shot.data.starts_rack() {
            self.rack_in_progress = true;
        }
        self.shot_history.push_back(shot);
        self.shot_history.len() - 1
    }

    /// Record a shot by the active player in the current rack.
    pub fn record(&mut self, player_id: PlayerId, data: ShotData) -> usize {
        let shot = Shot::new(player_id, self.current_rack, self.current_player_index, data);
        self.record_shot(shot)
    }

    /// Last shot, if any.
    #[must_use]
    pub fn last_shot(&self) -> Option<&Shot> {
        self.shot_history.last()
    }

    /// Remove the last shot and the score changes it produced.
    ///
    /// Restores the previous active player. Returns the removed shot
    /// together with its score changes (in push order).
    pub fn pop_shot(&mut self) -> Option<(Shot, Vec<ScoreChange>)> {
        let shot = self.shot_history.pop_back()?;
        let index = self.shot_history.len();

        let mut changes = Vec::new();
        while self
            .score_history
            .last()
            .is_some_and(|change| change.shot_index == index)
        {
            if let Some(change) = self.score_history.pop_back() {
                changes.push(change);
            }
        }
        changes.reverse();

        self.set_active(shot.previous_player_index);
        let in_progress = self.current_rack_shots().any(|(_, s)| s.data.starts_rack());
        self.rack_in_progress = in_progress;
        Some((shot, changes))
    }

    /// Shots recorded after the last rack boundary, with their log indices.
    pub fn current_rack_shots(&self) -> impl Iterator<Item = (usize, &Shot)> {
        let start = self
            .shot_history
            .iter()
            .rposition(|s| s.data.is_rack_complete())
            .map_or(0, |i| i + 1);
        self.shot_history.iter().enumerate().skip(start)
    }

    // === Scores ===

    /// Set a player's score, recording the delta against `shot_index`.
    pub fn set_score(&mut self, id: &PlayerId, score: i64, shot_index: usize) {
        let mut change = None;
        self.update_player(id, |player| {
            change = Some(ScoreChange {
                player_id: player.id.clone(),
                delta: score - player.score,
                previous_score: player.score,
                shot_index,
            });
            player.score = score;
        });
        if let Some(change) = change {
            self.score_history.push_back(change);
        }
    }

    /// Restore the scores recorded in `changes`.
    pub fn revert_scores(&mut self, changes: &[ScoreChange]) {
        for change in changes.iter().rev() {
            self.update_player(&change.player_id, |p| p.score = change.previous_score);
        }
    }
}
