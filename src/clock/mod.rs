//! Chess clock timing core.
//!
//! The clock counts down the active player's time using wall-clock deltas
//! between ticks, so late, coalesced or skipped ticks never make it drift.
//! Timestamps are plain milliseconds supplied by the caller (see
//! `TimeSource`), which keeps the core testable without sleeping.
//!
//! ## Modules
//!
//! - `time`: `TimeSource` and its system/manual implementations
//! - `ticker`: `ClockTicker`, a background thread ticking a shared clock

pub mod time;
pub mod ticker;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use ticker::ClockTicker;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};

/// Default time per player: 10 minutes.
pub const DEFAULT_TIME_PER_PLAYER_MS: u64 = 10 * 60 * 1000;

/// Default warning threshold: 1 minute.
pub const DEFAULT_WARNING_THRESHOLD_MS: u64 = 60 * 1000;

/// Chess clock configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessClockSettings {
    pub time_per_player_ms: u64,
    /// Remaining time at or below which a player is in warning.
    pub warning_threshold_ms: u64,
}

impl Default for ChessClockSettings {
    fn default() -> Self {
        Self {
            time_per_player_ms: DEFAULT_TIME_PER_PLAYER_MS,
            warning_threshold_ms: DEFAULT_WARNING_THRESHOLD_MS,
        }
    }
}

impl ChessClockSettings {
    pub fn with_time_per_player_ms(mut self, ms: u64) -> Self {
        self.time_per_player_ms = ms;
        self
    }

    pub fn with_warning_threshold_ms(mut self, ms: u64) -> Self {
        self.warning_threshold_ms = ms;
        self
    }
}

/// One player's countdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerClock {
    pub remaining_ms: u64,
    pub is_warning: bool,
    pub is_time_up: bool,
}

impl PlayerClock {
    fn new(settings: &ChessClockSettings) -> Self {
        let mut clock = Self {
            remaining_ms: settings.time_per_player_ms,
            is_warning: false,
            is_time_up: false,
        };
        clock.is_warning = clock.remaining_ms <= settings.warning_threshold_ms;
        clock.is_time_up = clock.remaining_ms == 0;
        clock
    }
}

/// Observable, restorable clock state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessClockState {
    pub players: Vec<PlayerClock>,
    pub active_index: usize,
    pub is_running: bool,
    /// Timestamp of the last applied tick; `None` while stopped.
    pub last_tick_ms: Option<u64>,
}

impl ChessClockState {
    /// Fresh state: every player at full time, stopped, first player active.
    #[must_use]
    pub fn new(settings: &ChessClockSettings, players: usize) -> Self {
        Self {
            players: (0..players).map(|_| PlayerClock::new(settings)).collect(),
            active_index: 0,
            is_running: false,
            last_tick_ms: None,
        }
    }
}

/// Notification produced by a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    /// Player crossed the warning threshold.
    Warning(usize),
    /// Player's time reached zero.
    TimeUp(usize),
}

/// Drift-corrected per-player countdown.
///
/// ```
/// use cue_score::clock::{ChessClock, ChessClockSettings, ClockEvent};
///
/// let settings = ChessClockSettings::default().with_time_per_player_ms(1_000);
/// let mut clock = ChessClock::new(settings, 2);
/// clock.start(0);
///
/// // A single late tick covers the whole gap.
/// let events = clock.tick(5_000);
/// assert_eq!(clock.state().players[0].remaining_ms, 0);
/// assert!(events.contains(&ClockEvent::TimeUp(0)));
/// ```
#[derive(Clone, Debug)]
pub struct ChessClock {
    settings: ChessClockSettings,
    state: ChessClockState,
}

impl ChessClock {
    #[must_use]
    pub fn new(settings: ChessClockSettings, players: usize) -> Self {
        let state = ChessClockState::new(&settings, players.max(1));
        Self { settings, state }
    }

    /// Resume from a saved state.
    #[must_use]
    pub fn from_state(settings: ChessClockSettings, state: ChessClockState) -> Self {
        Self { settings, state }
    }

    #[must_use]
    pub fn settings(&self) -> &ChessClockSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> &ChessClockState {
        &self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    /// Start counting down the active player from `now`.
    pub fn start(&mut self, now_ms: u64) {
        if self.state.is_running {
            return;
        }
        self.state.is_running = true;
        self.state.last_tick_ms = Some(now_ms);
        debug!(active = self.state.active_index, "clock started");
    }

    /// Stop the clock. Time consumed since the last tick is discarded.
    pub fn stop(&mut self) {
        self.state.is_running = false;
        self.state.last_tick_ms = None;
        debug!("clock stopped");
    }

    /// Charge the active player for the time elapsed since the last tick.
    ///
    /// Returns the one-time events triggered by this tick. A clock that hit
    /// zero keeps running; callers decide what time-up means.
    pub fn tick(&mut self, now_ms: u64) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if !self.state.is_running {
            return events;
        }
        let Some(last) = self.state.last_tick_ms else {
            self.state.last_tick_ms = Some(now_ms);
            return events;
        };

        // Timestamps going backwards count as no elapsed time.
        let delta = now_ms.saturating_sub(last);
        self.state.last_tick_ms = Some(now_ms);

        let index = self.state.active_index;
        let threshold = self.settings.warning_threshold_ms;
        let Some(player) = self.state.players.get_mut(index) else {
            return events;
        };

        player.remaining_ms = player.remaining_ms.saturating_sub(delta);
        if !player.is_warning && player.remaining_ms <= threshold {
            player.is_warning = true;
            events.push(ClockEvent::Warning(index));
        }
        if !player.is_time_up && player.remaining_ms == 0 {
            player.is_time_up = true;
            info!(player = index, "time up");
            events.push(ClockEvent::TimeUp(index));
        }
        events
    }

    /// Press the clock button of the player at `index`.
    ///
    /// The turn passes to the next player. Pressing a time-up player's button
    /// also stops the clock; otherwise a stopped clock starts at `now`.
    pub fn press(&mut self, index: usize, now_ms: u64) -> Vec<ClockEvent> {
        let count = self.state.players.len();
        if index >= count {
            return Vec::new();
        }

        // Settle the outgoing player's time first.
        let events = self.tick(now_ms);
        self.state.active_index = (index + 1) % count;
        debug!(pressed = index, active = self.state.active_index, "clock pressed");

        if self.state.players[index].is_time_up {
            self.stop();
        } else if self.state.is_running {
            self.state.last_tick_ms = Some(now_ms);
        } else {
            self.start(now_ms);
        }
        events
    }

    /// Put every player back to full time, stopped.
    pub fn reset(&mut self) {
        self.state = ChessClockState::new(&self.settings, self.state.players.len());
    }
}
