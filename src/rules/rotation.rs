//! Rotation: every ball scores its own number; first to the target wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::common;
use super::engine::{GameEngine, VictoryResult};
use crate::core::action::{RackData, ShotData};
use crate::core::config::{GameSetup, RotationSettings, Variant, VariantSettings};
use crate::core::player::PlayerId;
use crate::core::state::Game;

/// Highest ball number in a rotation rack.
pub const MAX_BALL: u8 = 15;

/// Points credited per reported ball when a rack is closed from counts.
///
/// Balls 1..=15 average 8 points; the true values are unknown from a count.
pub const AVERAGE_BALL_POINTS: i64 = 8;

/// Points in a full rack (1 + 2 + ... + 15).
pub const RACK_POINTS: i64 = 120;

/// Rotation actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RotationAction {
    PocketBall { player_id: PlayerId, ball: u8 },
    /// Foul: deduct `points` from the player.
    Foul { player_id: PlayerId, points: i64 },
    CompleteRack(RackData),
    EndTurn,
    EndGame,
}

/// Rotation rules engine.
#[derive(Clone, Debug, Default)]
pub struct RotationEngine;

impl RotationEngine {
    pub fn new() -> Self {
        Self
    }

    fn pocket_ball(&self, game: &Game, player_id: &PlayerId, ball: u8) -> Game {
        if !(1..=MAX_BALL).contains(&ball) {
            warn!(ball, "ball number out of range");
            return game.clone();
        }
        let Some(index) = game.player_index(player_id) else {
            warn!(player = %player_id, "ball pocketed by unknown player ignored");
            return game.clone();
        };
        if game.players.iter().any(|p| p.balls_pocketed.contains(&ball)) {
            warn!(ball, "ball already pocketed this rack");
            return game.clone();
        }

        let mut next = game.clone();
        let previous_score = next.players[index].score;
        let points = i64::from(ball);
        let shot_index = next.record(
            player_id.clone(),
            ShotData::BallClick {
                ball,
                points,
                previous_score,
            },
        );
        next.update_player(player_id, |p| p.balls_pocketed.push_back(ball));
        next.set_score(player_id, previous_score + points, shot_index);
        next.set_active(index);

        debug!(player = %player_id, ball, score = previous_score + points, "ball pocketed");
        common::settle_victory(self, &mut next);
        next
    }

    fn foul(&self, game: &Game, player_id: &PlayerId, points: i64) -> Game {
        let Some(index) = game.player_index(player_id) else {
            warn!(player = %player_id, "foul by unknown player ignored");
            return game.clone();
        };

        let mut next = game.clone();
        let points = points.saturating_abs();
        let previous_score = next.players[index].score;
        let shot_index = next.record(
            player_id.clone(),
            ShotData::Deduction {
                points,
                previous_score,
            },
        );
        next.set_score(player_id, previous_score.saturating_sub(points), shot_index);
        debug!(player = %player_id, points, "foul deducted");
        next
    }

    /// Close a rack from reported ball counts.
    ///
    /// A count only says how many balls a player pocketed, not which ones,
    /// so each reported ball is credited `AVERAGE_BALL_POINTS`. Players who
    /// already have clicked balls in the rack are scored by their clicks
    /// instead, and the credit never pushes the rack past `RACK_POINTS`.
    fn complete_rack(&self, game: &Game, data: &RackData) -> Game {
        let mut next = game.clone();
        let actor = data
            .winner_id
            .clone()
            .filter(|id| next.player_index(id).is_some())
            .unwrap_or_else(|| next.active_player().id.clone());

        let shot_index = next.record(
            actor.clone(),
            ShotData::RackComplete {
                data: Some(data.clone()),
                previous_sets: None,
                order_change: None,
            },
        );

        let mut rack_points: i64 = next
            .players
            .iter()
            .flat_map(|p| p.balls_pocketed.iter())
            .map(|&b| i64::from(b))
            .sum();
        let credits: Vec<(PlayerId, i64, i64)> = next
            .players
            .iter()
            .filter(|p| p.balls_pocketed.is_empty())
            .filter_map(|p| {
                let count = data.count_for(&p.id).min(u32::from(MAX_BALL));
                let credit = (i64::from(count) * AVERAGE_BALL_POINTS).min(RACK_POINTS - rack_points);
                rack_points += credit.max(0);
                (credit > 0).then(|| (p.id.clone(), p.score, credit))
            })
            .collect();
        for (id, score, credit) in credits {
            next.set_score(&id, score + credit, shot_index);
        }

        common::advance_rack(&mut next);
        if let Some(index) = next.player_index(&actor) {
            next.set_active(index);
        }

        debug!(rack = next.current_rack, "rack completed");
        common::settle_victory(self, &mut next);
        next
    }
}

impl GameEngine for RotationEngine {
    type Action = RotationAction;

    fn variant(&self) -> Variant {
        Variant::Rotation
    }

    fn initialize(&self, setup: &GameSetup) -> Game {
        let settings = match &setup.settings {
            VariantSettings::Rotation(s) => s.clone(),
            _ => RotationSettings::default(),
        };
        common::new_game(setup, Variant::Rotation, |p| {
            p.target_score.get_or_insert(settings.target_score);
        })
    }

    #[instrument(skip(self, game), fields(game_id = %game.id))]
    fn apply_action(&self, game: &Game, action: &RotationAction) -> Game {
        if !game.is_in_progress() {
            warn!("action on completed game ignored");
            return game.clone();
        }

        match action {
            RotationAction::PocketBall { player_id, ball } => self.pocket_ball(game, player_id, *ball),
            RotationAction::Foul { player_id, points } => self.foul(game, player_id, *points),
            RotationAction::CompleteRack(data) => self.complete_rack(game, data),
            RotationAction::EndTurn => common::end_turn(game),
            RotationAction::EndGame => {
                let leader = common::unique_leader(game.players.iter().map(|p| (p.id.clone(), p.score)));
                common::end_game(game, leader)
            }
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
            ShotData::BallClick { previous_score, .. } => {
                next.update_player(&shot.player_id, |p| {
                    p.score = previous_score;
                    p.balls_pocketed.pop_back();
                });
                common::reopen(&mut next);
            }
            ShotData::Deduction { previous_score, .. } => {
                next.update_player(&shot.player_id, |p| p.score = previous_score);
                common::reopen(&mut next);
            }
            ShotData::RackComplete { .. } => {
                common::retreat_rack(&mut next);
                common::replay_rack_balls(&mut next);
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
            ShotData::SetWin { .. }
            | ShotData::BowlingRoll { .. }
            | ShotData::Multiplier { .. }
            | ShotData::MultiplierAll { .. }
            | ShotData::OrderChange(_) => {
                warn!(kind = shot.data.kind(), "shot kind not produced by rotation");
                common::reopen(&mut next);
            }
        }

        debug!(shots = next.shot_history.len(), "undo");
        next
    }

    fn check_victory(&self, game: &Game) -> VictoryResult {
        game.players
            .iter()
            .find(|p| p.target_score.is_some_and(|target| p.score >= target))
            .map_or_else(VictoryResult::ongoing, |p| VictoryResult::won_by(p.id.clone()))
    }
}
