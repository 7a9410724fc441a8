//! Bowlard: ten frames of bowling played with ten object balls.
//!
//! Each roll records how many balls were pocketed before the first miss.
//! Frames and the score are rebuilt from the player's rolls in the shot
//! log, so a frame is complete exactly when bowling scoring says it is and
//! the game ends once the tenth frame is complete.

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::bowling::{self, BowlingFrame, FRAMES};
use super::common;
use super::engine::{GameEngine, VictoryResult};
use crate::core::action::{RackData, ShotData};
use crate::core::config::{GameSetup, Variant};
use crate::core::player::PlayerId;
use crate::core::state::Game;

/// Bowlard actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BowlardAction {
    /// The active player pocketed `pins` balls in one roll.
    Roll { pins: u8 },
    /// Record a roll from a reported ball count.
    CompleteRack(RackData),
    EndGame,
}

/// Bowlard rules engine.
#[derive(Clone, Debug, Default)]
pub struct BowlardEngine;

impl BowlardEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rolls recorded for `player_id`, in order.
    #[must_use]
    pub fn rolls(game: &Game, player_id: &PlayerId) -> Vec<u8> {
        game.shot_history
            .iter()
            .filter(|s| &s.player_id == player_id)
            .filter_map(|s| match s.data {
                ShotData::BowlingRoll { pins, .. } => Some(pins),
                _ => None,
            })
            .collect()
    }

    /// Rebuild a player's frames and score from the log.
    fn sync_player(game: &mut Game, player_id: &PlayerId) -> Vec<BowlingFrame> {
        let frames = bowling::build_frames(&Self::rolls(game, player_id));
        let score = bowling::total_score(&frames);
        let stored: Vector<BowlingFrame> = frames.iter().cloned().collect();
        game.update_player(player_id, |p| {
            p.bowling_frames = Some(stored);
            p.score = score;
        });
        frames
    }

    /// Rack counters follow the active player's frames.
    fn sync_racks(game: &mut Game, frames: &[BowlingFrame]) {
        let completed = bowling::completed_frames(frames) as u32;
        game.total_racks = completed;
        game.current_rack = (completed + 1).min(FRAMES as u32);
        game.rack_in_progress = frames.last().is_some_and(|f| !f.is_complete);
    }

    /// Recompute rack counters from whoever rolled last.
    fn resync_racks(game: &mut Game) {
        let last_roller = game
            .shot_history
            .iter()
            .rev()
            .find(|s| matches!(s.data, ShotData::BowlingRoll { .. }))
            .map(|s| s.player_id.clone());
        let frames = last_roller
            .map(|id| bowling::build_frames(&Self::rolls(game, &id)))
            .unwrap_or_default();
        Self::sync_racks(game, &frames);
    }

    fn roll(&self, game: &Game, pins: u8) -> Game {
        let player_id = game.active_player().id.clone();
        let frames = game
            .active_player()
            .bowling_frames
            .as_ref()
            .map(|f| f.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        if bowling::is_finished(&frames) {
            warn!(player = %player_id, "roll after tenth frame ignored");
            return game.clone();
        }

        let standing = bowling::standing_pins(&frames);
        let pins = pins.min(standing);
        let frame = (bowling::completed_frames(&frames) + 1) as u32;

        let mut next = game.clone();
        let previous_score = next.active_player().score;
        let shot_index = next.record(
            player_id.clone(),
            ShotData::BowlingRoll {
                pins,
                frame,
                previous_score,
            },
        );
        let frames = Self::sync_player(&mut next, &player_id);
        let score = next.active_player().score;
        // Keep the delta in the score history; sync already stored the value.
        next.update_player(&player_id, |p| p.score = previous_score);
        next.set_score(&player_id, score, shot_index);

        let frame_done = frames.get(frame as usize - 1).is_some_and(|f| f.is_complete);
        Self::sync_racks(&mut next, &frames);
        debug!(player = %player_id, pins, frame, score, "roll");

        if frame_done && next.player_count() > 1 {
            next.advance_turn();
        }
        common::settle_victory(self, &mut next);
        next
    }
}

impl GameEngine for BowlardEngine {
    type Action = BowlardAction;

    fn variant(&self) -> Variant {
        Variant::Bowlard
    }

    fn initialize(&self, setup: &GameSetup) -> Game {
        common::new_game(setup, Variant::Bowlard, |p| {
            p.bowling_frames = Some(Vector::new());
        })
    }

    #[instrument(skip(self, game), fields(game_id = %game.id))]
    fn apply_action(&self, game: &Game, action: &BowlardAction) -> Game {
        if !game.is_in_progress() {
            warn!("action on completed game ignored");
            return game.clone();
        }

        match action {
            BowlardAction::Roll { pins } => self.roll(game, *pins),
            BowlardAction::CompleteRack(data) => {
                let count = data.count_for(&game.active_player().id);
                self.roll(game, u8::try_from(count).unwrap_or(u8::MAX))
            }
            BowlardAction::EndGame => common::end_game(game, None),
        }
    }

    #[instrument(skip(self, game), fields(game_id = %game.id))]
    fn undo(&self, game: &Game) -> Game {
        let mut next = game.clone();
        let Some((shot, changes)) = next.pop_shot() else {
            return next;
        };
        next.revert_scores(&changes);

        match shot.data {
            ShotData::BowlingRoll { previous_score, .. } => {
                Self::sync_player(&mut next, &shot.player_id);
                next.update_player(&shot.player_id, |p| p.score = previous_score);
                common::reopen(&mut next);
            }
            ShotData::GameComplete {
                previous_status,
                previous_winner,
            } => {
                next.status = previous_status;
                next.winner_id = previous_winner;
            }
            ShotData::TurnEnd => {}
            ShotData::BallClick { .. }
            | ShotData::SetWin { .. }
            | ShotData::Multiplier { .. }
            | ShotData::MultiplierAll { .. }
            | ShotData::Deduction { .. }
            | ShotData::OrderChange(_)
            | ShotData::RackComplete { .. } => {
                warn!(kind = shot.data.kind(), "shot kind not produced by bowlard");
                common::reopen(&mut next);
            }
        }

        Self::resync_racks(&mut next);
        debug!(shots = next.shot_history.len(), "undo");
        next
    }

    fn check_victory(&self, game: &Game) -> VictoryResult {
        let all_finished = game.players.iter().all(|p| {
            p.bowling_frames
                .as_ref()
                .is_some_and(|f| bowling::is_finished(&f.iter().cloned().collect::<Vec<_>>()))
        });
        if all_finished {
            VictoryResult::finished()
        } else {
            VictoryResult::ongoing()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerSetup;
    use crate::core::state::GameStatus;

    fn start() -> Game {
        let mut setup = GameSetup::new(Variant::Bowlard);
        setup.players = vec![PlayerSetup::new("Solo")];
        BowlardEngine.initialize(&setup)
    }

    fn roll(game: &Game, pins: u8) -> Game {
        BowlardEngine.apply_action(game, &BowlardAction::Roll { pins })
    }

    #[test]
    fn test_initialize() {
        let game = start();
        assert_eq!(game.players[0].bowling_frames, Some(Vector::new()));
        assert_eq!(game.current_rack, 1);
    }

    #[test]
    fn test_strike_then_open_frame() {
        let game = roll(&roll(&roll(&start(), 10), 3), 4);
        let frames = game.players[0].bowling_frames.clone().unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(game.players[0].score, 24);
        assert_eq!(game.current_rack, 3);
        assert_eq!(game.total_racks, 2);
    }

    #[test]
    fn test_pins_clamped_to_standing() {
        let game = roll(&roll(&start(), 7), 9);
        let frames = game.players[0].bowling_frames.clone().unwrap();
        assert_eq!(frames[0].rolls.as_slice(), &[7, 3]);
    }

    #[test]
    fn test_tenth_frame_completes_game() {
        let mut game = start();
        for _ in 0..11 {
            game = roll(&game, 10);
        }
        assert!(game.is_in_progress());

        game = roll(&game, 10);
        assert_eq!(game.status, GameStatus::Completed);
        assert_eq!(game.players[0].score, 300);
        assert_eq!(BowlardEngine.check_victory(&game), VictoryResult::finished());
        assert_eq!(game.current_rack, 10);

        let undone = BowlardEngine.undo(&game);
        assert!(undone.is_in_progress());
        assert_eq!(undone.players[0].score, 270);
    }

    #[test]
    fn test_undo_inverts_roll() {
        let game = roll(&start(), 6);
        let next = roll(&game, 3);
        assert_eq!(BowlardEngine.undo(&next), game);

        let fresh = start();
        assert_eq!(BowlardEngine.undo(&roll(&fresh, 10)), fresh);
    }

    #[test]
    fn test_two_player_undo_restores_counters() {
        let mut setup = GameSetup::new(Variant::Bowlard);
        setup.players = vec![PlayerSetup::new("A"), PlayerSetup::new("B")];
        let game = BowlardEngine.initialize(&setup);

        let after_strike = roll(&game, 10);
        assert_eq!(after_strike.current_player_index, 1);
        assert_eq!(after_strike.current_rack, 2);

        let next = roll(&after_strike, 3);
        assert_eq!(BowlardEngine.undo(&next), after_strike);
        assert_eq!(BowlardEngine.undo(&after_strike), game);
    }

    #[test]
    fn test_complete_rack_from_count() {
        let game = start();
        let data = RackData::default().with_count(PlayerId::for_seat(0), 8);
        let next = BowlardEngine.apply_action(&game, &BowlardAction::CompleteRack(data));
        assert_eq!(next.players[0].bowling_frames.as_ref().unwrap()[0].rolls.as_slice(), &[8]);
    }
}
