//! Chess clock behaviour over realistic timelines.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cue_score::clock::{
    ChessClock, ChessClockSettings, ChessClockState, ClockEvent, ClockTicker, ManualTimeSource, TimeSource,
};
use cue_score::core::Variant;
use cue_score::rules::GameBuilder;
use parking_lot::Mutex;
use proptest::prelude::*;

fn settings(total_ms: u64, warning_ms: u64) -> ChessClockSettings {
    ChessClockSettings::default()
        .with_time_per_player_ms(total_ms)
        .with_warning_threshold_ms(warning_ms)
}

/// A suspended host delivers one tick after a long gap; the gap is charged
/// in full, exactly once.
#[test]
fn test_suspended_gap_charged_once() {
    let mut clock = ChessClock::new(settings(60_000, 10_000), 2);
    let time = ManualTimeSource::new(0);
    clock.start(time.now_ms());

    for _ in 0..10 {
        time.advance(250);
        clock.tick(time.now_ms());
    }
    time.advance(5_000);
    clock.tick(time.now_ms());
    clock.tick(time.now_ms());

    assert_eq!(clock.state().players[0].remaining_ms, 52_500);
}

#[test]
fn test_turns_charge_their_own_player() {
    let mut clock = ChessClock::new(settings(60_000, 10_000), 2);
    clock.start(0);

    clock.tick(4_000);
    clock.press(0, 5_000);
    clock.tick(12_000);
    clock.press(1, 13_000);
    clock.tick(14_000);

    let state = clock.state();
    assert_eq!(state.players[0].remaining_ms, 60_000 - 5_000 - 1_000);
    assert_eq!(state.players[1].remaining_ms, 60_000 - 8_000);
    assert_eq!(state.active_index, 0);
}

#[test]
fn test_time_up_keeps_running_until_pressed() {
    let mut clock = ChessClock::new(settings(2_000, 500), 2);
    clock.start(0);

    let events = clock.tick(2_500);
    assert_eq!(events, vec![ClockEvent::Warning(0), ClockEvent::TimeUp(0)]);
    assert!(clock.is_running());

    clock.press(0, 3_000);
    assert!(!clock.is_running());
    assert_eq!(clock.active_index(), 1);
    assert_eq!(clock.state().players[1].remaining_ms, 2_000);
}

#[test]
fn test_state_saved_in_game_resumes() {
    let clock_settings = settings(30_000, 5_000);
    let mut game = GameBuilder::new(Variant::SetMatch)
        .player("A")
        .player("B")
        .chess_clock(clock_settings.clone())
        .build()
        .unwrap();
    assert_eq!(game.chess_clock_state, Some(ChessClockState::new(&clock_settings, 2)));

    let mut clock = ChessClock::new(clock_settings.clone(), 2);
    clock.start(0);
    clock.tick(7_000);
    game.chess_clock_state = Some(clock.state().clone());

    let restored = cue_score::core::Game::from_json(&game.to_json().unwrap()).unwrap();
    let mut resumed = ChessClock::from_state(clock_settings, restored.chess_clock_state.unwrap());
    resumed.tick(8_000);
    assert_eq!(resumed.state().players[0].remaining_ms, 22_000);
}

#[test]
fn test_ticker_and_presses_share_one_lock() {
    let clock = Arc::new(Mutex::new(ChessClock::new(settings(10_000, 1_000), 2)));
    let time = ManualTimeSource::new(0);
    clock.lock().start(0);

    let mut ticker = ClockTicker::spawn(Arc::clone(&clock), time.clone(), Duration::from_millis(1), |_| {});
    time.set(1_000);
    {
        let mut guard = ticker.clock().lock();
        guard.press(0, time.now_ms());
    }
    time.set(3_000);
    for _ in 0..500 {
        if ticker.clock().lock().state().players[1].remaining_ms == 8_000 {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    ticker.stop();

    let state = clock.lock().state().clone();
    assert_eq!(state.players[0].remaining_ms, 9_000);
    assert_eq!(state.players[1].remaining_ms, 8_000);
}

proptest! {
    /// Remaining time equals initial minus time spent active, whatever the
    /// tick pattern, and never underflows.
    #[test]
    fn prop_remaining_tracks_active_time(
        steps in prop::collection::vec((0u64..800, any::<bool>()), 1..80),
        gap_at in 0usize..80,
    ) {
        let initial = 20_000u64;
        let mut clock = ChessClock::new(settings(initial, 2_000), 2);
        let mut now = 0u64;
        let mut spent = [0u64; 2];
        clock.start(now);

        for (i, (delta, press)) in steps.into_iter().enumerate() {
            let delta = if i == gap_at { 5_000 } else { delta };
            now += delta;
            let active = clock.active_index();
            if clock.is_running() {
                spent[active] += delta;
            }
            if press {
                clock.press(active, now);
            } else {
                clock.tick(now);
            }

            for (p, used) in spent.iter().enumerate() {
                prop_assert_eq!(clock.state().players[p].remaining_ms, initial.saturating_sub(*used));
            }
        }
    }
}
