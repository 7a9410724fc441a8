use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use cue_score::core::{Game, PlayerId, Variant};
use cue_score::japan::{calculate_current_rack_results, JapanAction, JapanEngine};
use cue_score::rules::{GameBuilder, GameEngine};

/// A game with `players` seats, `racks` completed racks and a rack in play.
fn game_with_history(players: usize, racks: usize) -> Game {
    let mut builder = GameBuilder::new(Variant::Japan).seed(1);
    for i in 0..players {
        builder = builder.player(format!("P{}", i + 1));
    }
    let mut game = builder.build().unwrap();

    for rack in 0..=racks {
        for ball in 1..=10u8 {
            let player_id = PlayerId::for_seat((rack + usize::from(ball)) % players);
            game = JapanEngine.apply_action(&game, &JapanAction::PocketBall { player_id, ball });
        }
        if rack < racks {
            game = JapanEngine.apply_action(&game, &JapanAction::CompleteRack);
        }
    }
    game
}

fn bench_rack_results(c: &mut Criterion) {
    let mut group = c.benchmark_group("current_rack_results");
    for players in [3, 6] {
        let game = game_with_history(players, 50);
        group.bench_with_input(BenchmarkId::from_parameter(players), &game, |b, game| {
            b.iter(|| calculate_current_rack_results(black_box(game)))
        });
    }
    group.finish();
}

fn bench_complete_and_undo(c: &mut Criterion) {
    let game = game_with_history(4, 50);
    c.bench_function("complete_rack_then_undo", |b| {
        b.iter(|| {
            let done = JapanEngine.apply_action(black_box(&game), &JapanAction::CompleteRack);
            JapanEngine.undo(&done)
        })
    });
}

criterion_group!(benches, bench_rack_results, bench_complete_and_undo);
criterion_main!(benches);
