//! Japan rules engine.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::calculator::{self, current_rack_points};
use super::order::rotate_order;
use super::{JapanData, JapanPlayerResult, OrderPeriod};
use crate::core::action::{OrderChange, ShotData};
use crate::core::config::{GameSetup, JapanSettings, Variant, VariantSettings};
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::core::state::{Game, GameStatus};
use crate::rules::common;
use crate::rules::engine::{GameEngine, VictoryResult};

/// Lowest rack multiplier.
pub const MIN_MULTIPLIER: u32 = 1;

/// Highest rack multiplier.
pub const MAX_MULTIPLIER: u32 = 100;

/// Highest ball number that can be pocketed.
pub const MAX_BALL: u8 = 15;

/// Japan actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum JapanAction {
    PocketBall { player_id: PlayerId, ball: u8 },
    /// Foul: deduct `points` from the player's rack earnings.
    Deduct { player_id: PlayerId, points: i64 },
    /// Set the rack multiplier.
    SetMultiplier { value: u32 },
    /// Scale the rack multiplier by `factor`.
    MultiplyAll { factor: u32 },
    CompleteRack,
    /// Rotate the turn order so `first_player_id` plays first.
    ChangeOrder { first_player_id: PlayerId },
    EndTurn,
    EndGame,
}

fn clamp_multiplier(value: u64) -> u32 {
    value.clamp(u64::from(MIN_MULTIPLIER), u64::from(MAX_MULTIPLIER)) as u32
}

/// Japan rules engine.
#[derive(Clone, Debug, Default)]
pub struct JapanEngine;

impl JapanEngine {
    pub fn new() -> Self {
        Self
    }

    /// Running total of `player` through the last completed rack.
    #[must_use]
    pub fn total_points(game: &Game, player: &PlayerId) -> i64 {
        game.japan.as_ref().map_or(0, |j| j.total_points(player))
    }

    /// Preview of the current rack's redistribution.
    #[must_use]
    pub fn current_rack_results(game: &Game) -> Vec<JapanPlayerResult> {
        calculator::calculate_current_rack_results(game)
    }

    /// Turn order that was (or is) in effect for `rack`.
    #[must_use]
    pub fn order_for_rack(game: &Game, rack: u32) -> Option<Vec<PlayerId>> {
        let japan = game.japan.as_ref()?;
        if let Some(order) = japan.recorded_order_for_rack(rack) {
            return Some(order.to_vec());
        }
        (rack >= japan.order_period_start && rack <= game.current_rack).then(|| game.player_order())
    }

    fn data(game: &Game) -> JapanData {
        game.japan
            .clone()
            .unwrap_or_else(|| JapanData::new(JapanSettings::default(), 0))
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

        let mut next = game.clone();
        let points = Self::data(game).settings.ball_points(ball);
        let previous_score = next.players[index].score;
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

        debug!(player = %player_id, ball, points, "ball pocketed");
        next
    }

    fn deduct(&self, game: &Game, player_id: &PlayerId, points: i64) -> Game {
        let Some(index) = game.player_index(player_id) else {
            warn!(player = %player_id, "deduction for unknown player ignored");
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
        debug!(player = %player_id, points, "points deducted");
        next
    }

    fn set_multiplier(&self, game: &Game, data: ShotData, value: u32) -> Game {
        let mut next = game.clone();
        let mut japan = Self::data(game);
        japan.multiplier = value;
        next.japan = Some(japan);

        let actor = next.active_player().id.clone();
        next.record(actor, data);
        debug!(multiplier = value, "multiplier changed");
        next
    }

    /// Work out an order change without applying it.
    ///
    /// `effective_from` is the first rack the new order plays.
    fn plan_order_change(
        game: &Game,
        selected: &PlayerId,
        effective_from: u32,
    ) -> Option<(OrderChange, JapanData)> {
        if game.player_count() <= 2 {
            return None;
        }

        let mut japan = Self::data(game);
        let previous_order = game.player_order();
        let mut rng = GameRng::from_state(&japan.rng);
        let new_order = rotate_order(&previous_order, selected, &mut rng);
        if new_order == previous_order {
            return None;
        }

        let previous_rng = japan.rng.clone();
        let previous_period_start = japan.order_period_start;
        let pushed_period = previous_period_start < effective_from;
        if pushed_period {
            japan.order_history.push_back(OrderPeriod {
                from_rack: previous_period_start,
                to_rack: effective_from - 1,
                player_order: previous_order.clone(),
            });
        }
        japan.order_period_start = effective_from;
        japan.rng = rng.state();

        let change = OrderChange {
            previous_order,
            new_order,
            previous_period_start,
            pushed_period,
            previous_rng,
        };
        Some((change, japan))
    }

    fn apply_order_change(game: &mut Game, change: &OrderChange, japan: JapanData) {
        game.reorder_players(&change.new_order);
        game.japan = Some(japan);
        game.set_active(0);
        info!(order = ?change.new_order, "player order changed");
    }

    fn revert_order_change(game: &mut Game, change: &OrderChange) {
        game.reorder_players(&change.previous_order);
        if let Some(japan) = game.japan.as_mut() {
            if change.pushed_period {
                japan.order_history.pop_back();
            }
            japan.order_period_start = change.previous_period_start;
            japan.rng = change.previous_rng.clone();
        }
    }

    fn change_order(&self, game: &Game, selected: &PlayerId) -> Game {
        if game.player_index(selected).is_none() {
            warn!(player = %selected, "order change to unknown player ignored");
            return game.clone();
        }
        // Mid-rack changes take effect for the rack being played.
        let Some((change, japan)) = Self::plan_order_change(game, selected, game.current_rack) else {
            debug!("order change is a no-op");
            return game.clone();
        };

        let mut next = game.clone();
        next.record(selected.clone(), ShotData::OrderChange(change.clone()));
        Self::apply_order_change(&mut next, &change, japan);
        next
    }

    fn complete_rack(&self, game: &Game) -> Game {
        let result = calculator::rack_result(game);
        let mut japan = Self::data(game);
        japan.rack_history.push_back(result.clone());
        japan.multiplier = MIN_MULTIPLIER;

        let mut next = game.clone();
        next.japan = Some(japan.clone());

        let completed = next.total_racks + 1;
        let interval = japan.settings.order_change_interval;
        let rotation = if interval > 0 && completed % interval == 0 {
            let first = next.players[0].id.clone();
            Self::plan_order_change(&next, &first, next.current_rack + 1)
        } else {
            None
        };

        let actor = next.active_player().id.clone();
        let shot_index = next.record(
            actor,
            ShotData::RackComplete {
                data: None,
                previous_sets: None,
                order_change: rotation.as_ref().map(|(change, _)| change.clone()),
            },
        );
        let earned: Vec<PlayerId> = next
            .players
            .iter()
            .filter(|p| p.score != 0)
            .map(|p| p.id.clone())
            .collect();
        for id in earned {
            next.set_score(&id, 0, shot_index);
        }
        common::advance_rack(&mut next);

        if let Some((change, japan)) = rotation {
            Self::apply_order_change(&mut next, &change, japan);
        }

        info!(
            rack = result.rack,
            multiplier = result.multiplier,
            deltas = ?result.results.iter().map(|r| r.delta_points).collect::<Vec<_>>(),
            "rack completed"
        );
        next
    }

    /// Rebuild rack-local scores and balls from the current rack's shots.
    fn replay_rack(game: &mut Game) {
        common::replay_rack_balls(game);
        for (id, points) in current_rack_points(game) {
            game.update_player(&id, |p| p.score = points);
        }
    }

    fn leader(game: &Game) -> Option<PlayerId> {
        common::unique_leader(
            game.players
                .iter()
                .map(|p| (p.id.clone(), Self::total_points(game, &p.id))),
        )
    }
}

impl GameEngine for JapanEngine {
    type Action = JapanAction;

    fn variant(&self) -> Variant {
        Variant::Japan
    }

    fn initialize(&self, setup: &GameSetup) -> Game {
        let settings = match &setup.settings {
            VariantSettings::Japan(s) => s.clone(),
            _ => JapanSettings::default(),
        };
        let mut game = common::new_game(setup, Variant::Japan, |_| {});
        game.japan = Some(JapanData::new(settings, setup.seed));
        game
    }

    #[instrument(skip(self, game), fields(game_id = %game.id))]
    fn apply_action(&self, game: &Game, action: &JapanAction) -> Game {
        if !game.is_in_progress() {
            warn!("action on completed game ignored");
            return game.clone();
        }

        match action {
            JapanAction::PocketBall { player_id, ball } => self.pocket_ball(game, player_id, *ball),
            JapanAction::Deduct { player_id, points } => self.deduct(game, player_id, *points),
            JapanAction::SetMultiplier { value } => {
                let previous = Self::data(game).multiplier;
                let value = clamp_multiplier(u64::from(*value));
                if value == previous {
                    return game.clone();
                }
                self.set_multiplier(game, ShotData::Multiplier { value, previous }, value)
            }
            JapanAction::MultiplyAll { factor } => {
                let previous = Self::data(game).multiplier;
                let value = clamp_multiplier(u64::from(previous) * u64::from(*factor));
                if value == previous {
                    return game.clone();
                }
                let data = ShotData::MultiplierAll {
                    factor: *factor,
                    value,
                    previous,
                };
                self.set_multiplier(game, data, value)
            }
            JapanAction::CompleteRack => self.complete_rack(game),
            JapanAction::ChangeOrder { first_player_id } => self.change_order(game, first_player_id),
            JapanAction::EndTurn => common::end_turn(game),
            JapanAction::EndGame => common::end_game(game, Self::leader(game)),
        }
    }

    #[instrument(skip(self, game), fields(game_id = %game.id))]
    fn undo(&self, game: &Game) -> Game {
        let mut next = game.clone();
        let Some((shot, changes)) = next.pop_shot() else {
            return next;
        };
        next.revert_scores(&changes);

        match &shot.data {
            ShotData::BallClick { previous_score, .. } => {
                next.update_player(&shot.player_id, |p| {
                    p.score = *previous_score;
                    p.balls_pocketed.pop_back();
                });
            }
            ShotData::Deduction { previous_score, .. } => {
                next.update_player(&shot.player_id, |p| p.score = *previous_score);
            }
            ShotData::Multiplier { previous, .. } | ShotData::MultiplierAll { previous, .. } => {
                if let Some(japan) = next.japan.as_mut() {
                    japan.multiplier = *previous;
                }
            }
            ShotData::OrderChange(change) => {
                Self::revert_order_change(&mut next, change);
                next.set_active(shot.previous_player_index);
            }
            ShotData::RackComplete { order_change, .. } => {
                if let Some(change) = order_change {
                    Self::revert_order_change(&mut next, change);
                }
                if let Some(japan) = next.japan.as_mut() {
                    if let Some(rack) = japan.rack_history.pop_back() {
                        japan.multiplier = rack.multiplier;
                    }
                }
                common::retreat_rack(&mut next);
                Self::replay_rack(&mut next);
                next.set_active(shot.previous_player_index);
                debug!(rack = next.current_rack, "rack reopened");
            }
            ShotData::GameComplete {
                previous_status,
                previous_winner,
            } => {
                next.status = *previous_status;
                next.winner_id = previous_winner.clone();
            }
            ShotData::TurnEnd => {}
            ShotData::SetWin { .. } | ShotData::BowlingRoll { .. } => {
                warn!(kind = shot.data.kind(), "shot kind not produced by japan");
            }
        }

        debug!(shots = next.shot_history.len(), "undo");
        next
    }

    fn check_victory(&self, game: &Game) -> VictoryResult {
        match game.status {
            GameStatus::Completed => VictoryResult {
                is_game_over: true,
                winner_id: game.winner_id.clone(),
            },
            GameStatus::InProgress => VictoryResult::ongoing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerSetup;

    fn start(n: usize, settings: JapanSettings) -> Game {
        let mut setup = GameSetup::new(Variant::Japan);
        setup.settings = VariantSettings::Japan(settings);
        setup.players = (0..n).map(|i| PlayerSetup::new(format!("P{}", i + 1))).collect();
        setup.seed = 11;
        JapanEngine.initialize(&setup)
    }

    fn act(game: &Game, action: JapanAction) -> Game {
        JapanEngine.apply_action(game, &action)
    }

    fn pocket(game: &Game, seat: usize, ball: u8) -> Game {
        act(game, JapanAction::PocketBall { player_id: PlayerId::for_seat(seat), ball })
    }

    #[test]
    fn test_initialize() {
        let game = start(3, JapanSettings::default());
        let japan = game.japan.as_ref().unwrap();
        assert_eq!(japan.multiplier, 1);
        assert!(japan.rack_history.is_empty());
        assert_eq!(game.current_rack, 1);
    }

    #[test]
    fn test_handicap_weight() {
        let game = start(2, JapanSettings::default().with_handicap_weight(2));
        let game = pocket(&pocket(&game, 0, 9), 0, 3);
        assert_eq!(game.players[0].score, 3);
    }

    #[test]
    fn test_multiplier_clamped() {
        let game = start(2, JapanSettings::default());
        let high = act(&game, JapanAction::SetMultiplier { value: 500 });
        assert_eq!(high.japan.as_ref().unwrap().multiplier, MAX_MULTIPLIER);

        let low = act(&high, JapanAction::SetMultiplier { value: 0 });
        assert_eq!(low.japan.as_ref().unwrap().multiplier, MIN_MULTIPLIER);

        // Unchanged value records nothing.
        assert_eq!(act(&game, JapanAction::SetMultiplier { value: 1 }), game);
    }

    #[test]
    fn test_multiply_all() {
        let game = act(&start(2, JapanSettings::default()), JapanAction::SetMultiplier { value: 3 });
        let doubled = act(&game, JapanAction::MultiplyAll { factor: 2 });
        assert_eq!(doubled.japan.as_ref().unwrap().multiplier, 6);

        let capped = act(&doubled, JapanAction::MultiplyAll { factor: 50 });
        assert_eq!(capped.japan.as_ref().unwrap().multiplier, 100);
        assert_eq!(JapanEngine.undo(&capped), doubled);
    }

    #[test]
    fn test_rack_complete_resets_rack_state() {
        let game = pocket(&pocket(&start(2, JapanSettings::default()), 0, 1), 1, 2);
        let done = act(&game, JapanAction::CompleteRack);

        assert_eq!(done.current_rack, 2);
        assert!(done.players.iter().all(|p| p.score == 0 && p.balls_pocketed.is_empty()));
        assert_eq!(done.shot_history.len(), game.shot_history.len() + 1);
        assert_eq!(done.japan.as_ref().unwrap().rack_history.len(), 1);
    }

    #[test]
    fn test_undo_rack_complete_restores_rack() {
        let game = act(&pocket(&pocket(&start(3, JapanSettings::default()), 0, 1), 1, 2), JapanAction::SetMultiplier { value: 4 });
        let done = act(&game, JapanAction::CompleteRack);
        assert_eq!(JapanEngine.undo(&done), game);
    }

    #[test]
    fn test_two_player_order_change_is_noop() {
        let game = start(2, JapanSettings::default());
        assert_eq!(act(&game, JapanAction::ChangeOrder { first_player_id: PlayerId::for_seat(1) }), game);
    }

    #[test]
    fn test_order_change_and_undo() {
        let game = pocket(&start(3, JapanSettings::default()), 1, 4);
        let changed = act(&game, JapanAction::ChangeOrder { first_player_id: PlayerId::for_seat(1) });

        assert_eq!(
            changed.player_order(),
            vec![PlayerId::for_seat(1), PlayerId::for_seat(0), PlayerId::for_seat(2)]
        );
        assert_eq!(changed.current_player_index, 0);
        assert_eq!(changed.players[0].score, 1);
        assert_eq!(JapanEngine.undo(&changed), game);
    }

    #[test]
    fn test_auto_rotation_records_period() {
        let settings = JapanSettings::default().with_order_change_interval(2);
        let mut game = start(3, settings);
        let initial_order = game.player_order();

        game = act(&pocket(&game, 0, 1), JapanAction::CompleteRack);
        assert_eq!(game.player_order(), initial_order);

        let before = pocket(&game, 1, 1);
        game = act(&before, JapanAction::CompleteRack);
        assert_ne!(game.player_order(), initial_order);

        let japan = game.japan.as_ref().unwrap();
        assert_eq!(japan.order_history.len(), 1);
        assert_eq!(japan.order_history[0].from_rack, 1);
        assert_eq!(japan.order_history[0].to_rack, 2);
        assert_eq!(japan.order_period_start, 3);
        assert_eq!(JapanEngine::order_for_rack(&game, 1), Some(initial_order.clone()));
        assert_eq!(JapanEngine::order_for_rack(&game, 3), Some(game.player_order()));

        assert_eq!(JapanEngine.undo(&game), before);
    }

    #[test]
    fn test_end_game_picks_leader() {
        let game = act(&pocket(&start(3, JapanSettings::default()), 2, 1), JapanAction::CompleteRack);
        let ended = act(&game, JapanAction::EndGame);

        assert_eq!(
            JapanEngine.check_victory(&ended),
            VictoryResult::won_by(PlayerId::for_seat(2))
        );
        assert!(!JapanEngine.check_victory(&game).is_game_over);
        assert_eq!(JapanEngine.undo(&ended), game);
    }

    #[test]
    fn test_end_game_tie_has_no_winner() {
        let game = pocket(&pocket(&start(3, JapanSettings::default()), 0, 1), 1, 2);
        let game = act(&game, JapanAction::CompleteRack);
        let ended = act(&game, JapanAction::EndGame);

        assert_eq!(ended.status, GameStatus::Completed);
        assert_eq!(ended.winner_id, None);
        assert_eq!(act(&start(3, JapanSettings::default()), JapanAction::EndGame).winner_id, None);
    }

    #[test]
    fn test_extreme_deduction_saturates() {
        let game = start(3, JapanSettings::default());
        let deduct = |g: &Game| act(g, JapanAction::Deduct { player_id: PlayerId::for_seat(1), points: i64::MIN });

        let once = deduct(&game);
        assert_eq!(once.players[1].score, -i64::MAX);
        let twice = deduct(&once);
        assert_eq!(twice.players[1].score, i64::MIN);

        let results = JapanEngine::current_rack_results(&twice);
        assert_eq!(results[1].earned_points, i64::MIN);
        assert!(results[1].delta_points < 0);

        let completed = act(&twice, JapanAction::CompleteRack);
        assert_eq!(JapanEngine.undo(&completed), twice);
    }
}
