//! Core model types: players, game state, the shot log, RNG, configuration.
//!
//! This module contains the building blocks shared by every variant.
//! Variants configure these via `GameSetup` rather than modifying the core.

pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;
pub mod error;

pub use player::{Player, PlayerId, PlayerSetup};
pub use rng::{GameRng, GameRngState};
pub use config::{GameSetup, JapanSettings, RotationSettings, SetMatchSettings, Variant, VariantSettings};
pub use action::{OrderChange, RackData, ScoreChange, Shot, ShotData};
pub use state::{Game, GameStatus};
pub use error::{Result, ScoreError};
