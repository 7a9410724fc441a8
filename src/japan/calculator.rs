//! Japan rack point redistribution.
//!
//! Every point a player earns in a rack is paid by each opponent: a player
//! with `e` earned points receives `e` from each of the other `n - 1`
//! players and pays every opponent's earnings in turn. The deltas of one
//! rack therefore always sum to zero. Arithmetic saturates, so only
//! scores already pinned at the `i64` limits can break that balance.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::{JapanPlayerResult, JapanRackResult};
use crate::core::action::ShotData;
use crate::core::player::PlayerId;
use crate::core::state::Game;

/// Raw points each player earned in the current rack, before multiplier.
///
/// Only shots after the most recent `rack_complete` marker count.
/// Players are returned in turn order.
#[must_use]
pub fn current_rack_points(game: &Game) -> Vec<(PlayerId, i64)> {
    let mut tally: FxHashMap<&PlayerId, i64> = FxHashMap::default();
    for (_, shot) in game.current_rack_shots() {
        match shot.data {
            ShotData::BallClick { points, .. } => {
                let entry = tally.entry(&shot.player_id).or_default();
                *entry = entry.saturating_add(points);
            }
            ShotData::Deduction { points, .. } => {
                let entry = tally.entry(&shot.player_id).or_default();
                *entry = entry.saturating_sub(points);
            }
            _ => {}
        }
    }

    game.players
        .iter()
        .map(|p| (p.id.clone(), tally.get(&p.id).copied().unwrap_or(0)))
        .collect()
}

/// Redistribute earned points.
///
/// `earned` holds each player's multiplied points; `previous_total` gives
/// each player's running total before this rack.
#[must_use]
pub fn redistribute(
    earned: &[(PlayerId, i64)],
    previous_total: impl Fn(&PlayerId) -> i64,
) -> Vec<JapanPlayerResult> {
    let others = earned.len().saturating_sub(1) as i64;
    let sum = earned.iter().fold(0i64, |acc, (_, e)| acc.saturating_add(*e));

    earned
        .iter()
        .map(|(id, e)| {
            let received = e.saturating_mul(others);
            let given = sum.saturating_sub(*e);
            let delta_points = received.saturating_sub(given);
            JapanPlayerResult {
                player_id: id.clone(),
                earned_points: *e,
                delta_points,
                total_points: previous_total(id).saturating_add(delta_points),
            }
        })
        .collect()
}

/// Results the current rack would produce if completed now.
///
/// Pure: works the same whether called for a live preview or at rack
/// completion.
#[must_use]
pub fn calculate_current_rack_results(game: &Game) -> Vec<JapanPlayerResult> {
    let Some(japan) = &game.japan else {
        return Vec::new();
    };

    let multiplier = i64::from(japan.multiplier);
    let earned: Vec<(PlayerId, i64)> = current_rack_points(game)
        .into_iter()
        .map(|(id, points)| (id, points.saturating_mul(multiplier)))
        .collect();
    trace!(rack = game.current_rack, multiplier, ?earned, "rack earnings");

    redistribute(&earned, |id| japan.total_points(id))
}

/// Build the history record for the current rack.
#[must_use]
pub fn rack_result(game: &Game) -> JapanRackResult {
    JapanRackResult {
        rack: game.current_rack,
        multiplier: game.japan.as_ref().map_or(1, |j| j.multiplier),
        player_order: game.player_order(),
        results: calculate_current_rack_results(game),
    }
}
