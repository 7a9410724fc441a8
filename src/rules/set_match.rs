//! SetMatch: a head-to-head race to a number of sets.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::common;
use super::engine::{GameEngine, VictoryResult};
use crate::core::action::{RackData, ShotData};
use crate::core::config::{GameSetup, SetMatchSettings, Variant, VariantSettings};
use crate::core::player::PlayerId;
use crate::core::state::Game;

/// SetMatch actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SetMatchAction {
    /// `player_id` won a set.
    WinSet { player_id: PlayerId },
    /// Close the rack from reported ball counts.
    CompleteRack(RackData),
    EndTurn,
    EndGame,
}

/// SetMatch rules engine.
#[derive(Clone, Debug, Default)]
pub struct SetMatchEngine;

impl SetMatchEngine {
    pub fn new() -> Self {
        Self
    }

    fn settings(setup: &GameSetup) -> SetMatchSettings {
        match &setup.settings {
            VariantSettings::SetMatch(s) => s.clone(),
            _ => SetMatchSettings::default(),
        }
    }

    fn win_set(&self, game: &Game, player_id: &PlayerId) -> Game {
        let Some(index) = game.player_index(player_id) else {
            warn!(player = %player_id, "set won by unknown player ignored");
            return game.clone();
        };

        let mut next = game.clone();
        let previous_sets = next.players[index].sets_won;
        let shot_index = next.record(player_id.clone(), ShotData::SetWin { previous_sets });
        next.update_player(player_id, |p| p.sets_won += 1);
        next.set_score(player_id, i64::from(previous_sets + 1), shot_index);
        // The set winner breaks next.
        next.set_active(index);

        debug!(player = %player_id, sets = previous_sets + 1, "set won");
        common::settle_victory(self, &mut next);
        next
    }

    /// Close a rack.
    ///
    /// Ball counts are recorded but carry no score in SetMatch; the rack
    /// winner, when reported, is credited with a set.
    fn complete_rack(&self, game: &Game, data: &RackData) -> Game {
        let mut next = game.clone();
        let winner = data
            .winner_id
            .as_ref()
            .and_then(|id| next.player_index(id).map(|i| (id.clone(), i)));
        let actor = winner
            .as_ref()
            .map_or_else(|| next.active_player().id.clone(), |(id, _)| id.clone());

        let previous_sets = winner.as_ref().map(|(_, i)| next.players[*i].sets_won);
        let shot_index = next.record(
            actor,
            ShotData::RackComplete {
                data: Some(data.clone()),
                previous_sets,
                order_change: None,
            },
        );

        if let (Some((id, index)), Some(sets)) = (winner, previous_sets) {
            next.update_player(&id, |p| p.sets_won = sets + 1);
            next.set_score(&id, i64::from(sets + 1), shot_index);
            next.set_active(index);
        }
        common::advance_rack(&mut next);

        debug!(rack = next.current_rack, "rack completed");
        common::settle_victory(self, &mut next);
        next
    }
}

impl GameEngine for SetMatchEngine {
    type Action = SetMatchAction;

    fn variant(&self) -> Variant {
        Variant::SetMatch
    }

    fn initialize(&self, setup: &GameSetup) -> Game {
        let settings = Self::settings(setup);
        common::new_game(setup, Variant::SetMatch, |p| {
            p.target_sets.get_or_insert(settings.target_sets);
        })
    }

    #[instrument(skip(self, game), fields(game_id = %game.id))]
    fn apply_action(&self, game: &Game, action: &SetMatchAction) -> Game {
        if !game.is_in_progress() {
            warn!("action on completed game ignored");
            return game.clone();
        }

        match action {
            SetMatchAction::WinSet { player_id } => self.win_set(game, player_id),
            SetMatchAction::CompleteRack(data) => self.complete_rack(game, data),
            SetMatchAction::EndTurn => common::end_turn(game),
            SetMatchAction::EndGame => {
                let winner = self.check_victory(game).winner_id;
                common::end_game(game, winner)
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
            ShotData::SetWin { previous_sets } => {
                next.update_player(&shot.player_id, |p| p.sets_won = previous_sets);
                common::reopen(&mut next);
            }
            ShotData::RackComplete { data, previous_sets, .. } => {
                if let (Some(winner), Some(sets)) = (data.and_then(|d| d.winner_id), previous_sets) {
                    next.update_player(&winner, |p| p.sets_won = sets);
                }
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
            ShotData::BallClick { .. }
            | ShotData::BowlingRoll { .. }
            | ShotData::Multiplier { .. }
            | ShotData::MultiplierAll { .. }
            | ShotData::Deduction { .. }
            | ShotData::OrderChange(_) => {
                warn!(kind = shot.data.kind(), "shot kind not produced by set match");
                common::reopen(&mut next);
            }
        }

        debug!(shots = next.shot_history.len(), "undo");
        next
    }

    fn check_victory(&self, game: &Game) -> VictoryResult {
        game.players
            .iter()
            .find(|p| p.target_sets.is_some_and(|target| p.sets_won >= target))
            .map_or_else(VictoryResult::ongoing, |p| VictoryResult::won_by(p.id.clone()))
    }
}
