//! Helpers shared by every variant engine.

use im::Vector;
use tracing::{debug, warn};

use super::engine::{GameEngine, VictoryResult};
use crate::clock::ChessClockState;
use crate::core::action::ShotData;
use crate::core::config::{GameSetup, Variant};
use crate::core::player::{Player, PlayerId};
use crate::core::state::{Game, GameStatus};

/// Build the common initial state for a setup.
///
/// Players get stable seat IDs in setup order; the first is active.
/// `defaults` fills in targets the setup leaves open.
pub(crate) fn new_game(
    setup: &GameSetup,
    variant: Variant,
    defaults: impl Fn(&mut Player),
) -> Game {
    let players: Vector<Player> = setup
        .players
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut player = Player::from_setup(PlayerId::for_seat(i), s);
            defaults(&mut player);
            player
        })
        .collect();

    let id = format!("{}-{:016x}", variant, setup.seed);
    let mut game = Game::new(id, variant, players);
    if game.players.is_empty() {
        warn!(game_id = %game.id, "setup has no players; game starts completed");
    }

    if let Some(settings) = &setup.chess_clock {
        game.chess_clock = Some(settings.clone());
        game.chess_clock_state = Some(ChessClockState::new(settings, game.player_count()));
    }

    debug!(game_id = %game.id, players = game.player_count(), "game initialized");
    game
}

/// Mark the game completed if the engine reports victory.
pub(crate) fn settle_victory<E: GameEngine + ?Sized>(engine: &E, game: &mut Game) {
    let result = engine.check_victory(game);
    if result.is_game_over {
        apply_result(game, result);
    }
}

fn apply_result(game: &mut Game, result: VictoryResult) {
    debug!(game_id = %game.id, winner = ?result.winner_id, "game over");
    game.status = GameStatus::Completed;
    game.winner_id = result.winner_id;
}

/// Put a game back in progress after undoing the action that ended it.
pub(crate) fn reopen(game: &mut Game) {
    game.status = GameStatus::InProgress;
    game.winner_id = None;
}

/// The single player with the highest score, or `None` on a tie.
pub(crate) fn unique_leader(scores: impl IntoIterator<Item = (PlayerId, i64)>) -> Option<PlayerId> {
    let mut leader: Option<(PlayerId, i64)> = None;
    let mut tied = false;
    for (id, score) in scores {
        match &leader {
            Some((_, best)) if score < *best => {}
            Some((_, best)) if score == *best => tied = true,
            _ => {
                leader = Some((id, score));
                tied = false;
            }
        }
    }
    if tied {
        None
    } else {
        leader.map(|(id, _)| id)
    }
}

/// End the game on demand, recording a `GameComplete` shot.
pub(crate) fn end_game(game: &Game, winner: Option<PlayerId>) -> Game {
    let mut next = game.clone();
    let actor = next.active_player().id.clone();
    next.record(
        actor,
        ShotData::GameComplete {
            previous_status: game.status,
            previous_winner: game.winner_id.clone(),
        },
    );
    next.status = GameStatus::Completed;
    next.winner_id = winner;
    debug!(game_id = %next.id, "game ended manually");
    next
}

/// End the active player's turn.
pub(crate) fn end_turn(game: &Game) -> Game {
    let mut next = game.clone();
    let actor = next.active_player().id.clone();
    next.record(actor, ShotData::TurnEnd);
    next.advance_turn();
    next
}

/// Rebuild every player's `balls_pocketed` from the current rack's shots.
pub(crate) fn replay_rack_balls(game: &mut Game) {
    let clicks: Vec<(PlayerId, u8)> = game
        .current_rack_shots()
        .filter_map(|(_, shot)| match shot.data {
            ShotData::BallClick { ball, .. } => Some((shot.player_id.clone(), ball)),
            _ => None,
        })
        .collect();

    for player in game.players.iter_mut() {
        player.clear_rack();
    }
    for (id, ball) in clicks {
        game.update_player(&id, |p| p.balls_pocketed.push_back(ball));
    }
}

/// Move the rack counters across a rack boundary.
pub(crate) fn advance_rack(game: &mut Game) {
    game.current_rack += 1;
    game.total_racks += 1;
    game.rack_in_progress = false;
    for player in game.players.iter_mut() {
        player.clear_rack();
    }
}

/// Undo `advance_rack`.
pub(crate) fn retreat_rack(game: &mut Game) {
    game.current_rack = game.current_rack.saturating_sub(1).max(1);
    game.total_racks = game.total_racks.saturating_sub(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerSetup;

    fn setup(n: usize) -> GameSetup {
        let mut setup = GameSetup::new(Variant::Rotation);
        setup.players = (0..n).map(|i| PlayerSetup::new(format!("P{}", i + 1))).collect();
        setup.seed = 0xabc;
        setup
    }

    #[test]
    fn test_new_game_ids_and_defaults() {
        let game = new_game(&setup(2), Variant::Rotation, |p| {
            p.target_score.get_or_insert(120);
        });

        assert_eq!(game.id, "rotation-0000000000000abc");
        assert_eq!(game.players[0].id, PlayerId::for_seat(0));
        assert_eq!(game.players[1].target_score, Some(120));
        assert!(game.chess_clock_state.is_none());
    }

    #[test]
    fn test_new_game_without_players_is_completed() {
        let game = new_game(&setup(0), Variant::Rotation, |_| {});
        assert_eq!(game.status, GameStatus::Completed);
        assert_eq!(game.player_count(), 0);
    }

    #[test]
    fn test_unique_leader() {
        let id = PlayerId::for_seat;
        assert_eq!(unique_leader([(id(0), 5), (id(1), 9), (id(2), 2)]), Some(id(1)));
        assert_eq!(unique_leader([(id(0), 9), (id(1), 9), (id(2), 2)]), None);
        // A later higher score breaks an earlier tie.
        assert_eq!(unique_leader([(id(0), 3), (id(1), 3), (id(2), 4)]), Some(id(2)));
        assert_eq!(unique_leader([(id(0), -4), (id(1), -7)]), Some(id(0)));
        assert_eq!(unique_leader(Vec::new()), None);
    }

    #[test]
    fn test_replay_rack_balls() {
        let mut game = new_game(&setup(2), Variant::Rotation, |_| {});
        let a = PlayerId::for_seat(0);
        let b = PlayerId::for_seat(1);
        game.record(a.clone(), ShotData::BallClick { ball: 1, points: 1, previous_score: 0 });
        game.record(b.clone(), ShotData::BallClick { ball: 2, points: 2, previous_score: 0 });
        game.record(a.clone(), ShotData::BallClick { ball: 3, points: 3, previous_score: 1 });

        replay_rack_balls(&mut game);

        assert_eq!(game.player(&a).unwrap().balls_pocketed, Vector::from(vec![1, 3]));
        assert_eq!(game.player(&b).unwrap().balls_pocketed, Vector::from(vec![2]));
    }

    #[test]
    fn test_end_game_records_previous_status() {
        let game = new_game(&setup(2), Variant::Rotation, |_| {});
        let ended = end_game(&game, None);

        assert_eq!(ended.status, GameStatus::Completed);
        assert_eq!(ended.shot_history.len(), 1);
        assert_eq!(ended.last_shot().unwrap().data.kind(), "game_complete");
        assert!(game.is_in_progress());
    }

    #[test]
    fn test_advance_and_retreat_rack() {
        let mut game = new_game(&setup(2), Variant::Rotation, |_| {});
        advance_rack(&mut game);
        assert_eq!(game.current_rack, 2);
        assert_eq!(game.total_racks, 1);

        retreat_rack(&mut game);
        assert_eq!(game.current_rack, 1);
        assert_eq!(game.total_racks, 0);
    }
}
