//! Player-order rotation with cycle avoidance.
//!
//! A turn order implies a successor relation (who plays after whom). Two
//! orders are the same *cycle* when every player has the same successor,
//! regardless of who is listed first. A rotation puts the selected player
//! first and must change the cycle whenever that is possible.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::player::PlayerId;
use crate::core::rng::GameRng;

/// Shuffles tried before falling back to the reversed order.
pub const MAX_SHUFFLE_ATTEMPTS: usize = 100;

/// Map each player to the one who plays next.
#[must_use]
pub fn successors(order: &[PlayerId]) -> FxHashMap<&PlayerId, &PlayerId> {
    order
        .iter()
        .enumerate()
        .map(|(i, id)| (id, &order[(i + 1) % order.len()]))
        .collect()
}

/// Do two orders describe the same cycle?
#[must_use]
pub fn same_cycle(a: &[PlayerId], b: &[PlayerId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let next_b = successors(b);
    successors(a)
        .into_iter()
        .all(|(id, next)| next_b.get(id) == Some(&next))
}

/// Players after `selected`, in turn order, wrapping around.
fn rest_after(order: &[PlayerId], index: usize) -> Vec<PlayerId> {
    (1..order.len())
        .map(|offset| order[(index + offset) % order.len()].clone())
        .collect()
}

fn with_first(selected: &PlayerId, rest: impl IntoIterator<Item = PlayerId>) -> Vec<PlayerId> {
    std::iter::once(selected.clone()).chain(rest).collect()
}

/// Compute a new order starting with `selected`.
///
/// - 2 players (or fewer, or an unknown `selected`): unchanged.
/// - 3 players: `selected` followed by the other two in reverse turn order,
///   which always reverses the cycle.
/// - 4+: `selected` followed by a shuffle of the rest, resampled until the
///   cycle differs from `order`; after `MAX_SHUFFLE_ATTEMPTS` the reversed
///   rest is used.
#[must_use]
pub fn rotate_order(order: &[PlayerId], selected: &PlayerId, rng: &mut GameRng) -> Vec<PlayerId> {
    let Some(index) = order.iter().position(|id| id == selected) else {
        return order.to_vec();
    };
    if order.len() <= 2 {
        return order.to_vec();
    }

    let rest = rest_after(order, index);
    if order.len() == 3 {
        return with_first(selected, rest.into_iter().rev());
    }

    let mut candidate = rest.clone();
    for attempt in 1..=MAX_SHUFFLE_ATTEMPTS {
        rng.shuffle(&mut candidate);
        let new_order = with_first(selected, candidate.iter().cloned());
        if !same_cycle(&new_order, order) {
            debug!(attempt, "order shuffled");
            return new_order;
        }
    }

    debug!("shuffle attempts exhausted, reversing order");
    with_first(selected, rest.into_iter().rev())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::new(*n)).collect()
    }

    #[test]
    fn test_same_cycle_ignores_start() {
        assert!(same_cycle(&ids(&["a", "b", "c", "d"]), &ids(&["c", "d", "a", "b"])));
        assert!(!same_cycle(&ids(&["a", "b", "c", "d"]), &ids(&["a", "c", "b", "d"])));
        assert!(!same_cycle(&ids(&["a", "b", "c"]), &ids(&["a", "c", "b"])));
        assert!(!same_cycle(&ids(&["a", "b"]), &ids(&["a", "b", "c"])));
    }

    #[test]
    fn test_two_players_unchanged() {
        let order = ids(&["a", "b"]);
        let mut rng = GameRng::new(1);
        assert_eq!(rotate_order(&order, &PlayerId::new("b"), &mut rng), order);
    }

    #[test]
    fn test_three_players_reverse_rest() {
        let order = ids(&["a", "b", "c"]);
        let mut rng = GameRng::new(1);

        assert_eq!(rotate_order(&order, &PlayerId::new("a"), &mut rng), ids(&["a", "c", "b"]));
        assert_eq!(rotate_order(&order, &PlayerId::new("b"), &mut rng), ids(&["b", "a", "c"]));
        assert_eq!(rotate_order(&order, &PlayerId::new("c"), &mut rng), ids(&["c", "b", "a"]));
    }

    #[test]
    fn test_unknown_selected_unchanged() {
        let order = ids(&["a", "b", "c", "d"]);
        let mut rng = GameRng::new(1);
        assert_eq!(rotate_order(&order, &PlayerId::new("z"), &mut rng), order);
    }

    #[test]
    fn test_four_players_never_repeat_cycle() {
        let mut order = ids(&["a", "b", "c", "d"]);
        let mut rng = GameRng::new(99);

        for trial in 0..50 {
            let selected = order[trial % order.len()].clone();
            let next = rotate_order(&order, &selected, &mut rng);

            assert_eq!(next[0], selected);
            assert_eq!(next.len(), order.len());
            assert!(!same_cycle(&next, &order), "trial {} repeated {:?}", trial, order);
            order = next;
        }
    }

    #[test]
    fn test_six_players_permutation() {
        let order = ids(&["a", "b", "c", "d", "e", "f"]);
        let mut rng = GameRng::new(3);
        let mut next = rotate_order(&order, &PlayerId::new("d"), &mut rng);

        assert_eq!(next[0], PlayerId::new("d"));
        next.sort();
        assert_eq!(next, order);
    }
}
