//! # cue-score
//!
//! Scoring engines for cue sports and bowlard.
//!
//! ## Design Principles
//!
//! 1. **Pure Engines**: Every action maps a `&Game` to a new `Game`. Engines
//!    hold no state of their own, and invalid or no-op input returns the game
//!    unchanged instead of an error.
//!
//! 2. **The Shot Log Is the Undo Log**: Every action appends one typed shot.
//!    Undo pops it and reverses exactly what it did, across rack boundaries
//!    included.
//!
//! 3. **N-Player First**: Rotation and Japan support any number of players;
//!    turn order is part of the state.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs`, so keeping
//!   every previous game value around is cheap.
//!
//! - **Deterministic Randomness**: Japan order shuffles draw from a seeded
//!   RNG whose state lives in the game.
//!
//! - **Wall-Clock Timing**: The chess clock charges real elapsed time, never
//!   tick counts.
//!
//! ## Modules
//!
//! - `core`: Players, game state, the shot log, RNG, configuration, errors
//! - `rules`: `GameEngine` trait, SetMatch/Rotation/Bowlard engines, factory
//! - `japan`: Japan engine, point redistribution, order rotation
//! - `clock`: Chess clock timing core and background ticker
//! - `snapshot`: Versioned JSON snapshots

pub mod core;
pub mod rules;
pub mod japan;
pub mod clock;
pub mod snapshot;

// Re-export commonly used types
pub use crate::core::{
    Player, PlayerId, PlayerSetup,
    GameRng, GameRngState,
    GameSetup, JapanSettings, RotationSettings, SetMatchSettings, Variant, VariantSettings,
    OrderChange, RackData, ScoreChange, Shot, ShotData,
    Game, GameStatus,
    Result, ScoreError,
};

pub use crate::rules::{
    GameEngine, VictoryResult, BowlingFrame,
    SetMatchAction, SetMatchEngine,
    RotationAction, RotationEngine,
    BowlardAction, BowlardEngine,
    EngineFactory, EngineRef, GameAction, GameBuilder,
};

pub use crate::japan::{
    JapanAction, JapanEngine, JapanData, JapanPlayerResult, JapanRackResult, OrderPeriod,
    calculate_current_rack_results,
};

pub use crate::clock::{
    ChessClock, ChessClockSettings, ChessClockState, ClockEvent, ClockTicker, PlayerClock,
    ManualTimeSource, SystemTimeSource, TimeSource,
};

pub use crate::snapshot::GameSnapshot;
