//! Rules engines for the non-Japan variants, and variant dispatch.
//!
//! Each variant implements `GameEngine`:
//! - Initial state for a setup
//! - How actions produce the next game value
//! - Undo of the last recorded shot
//! - Victory conditions
//!
//! `EngineFactory` selects the engine for a variant tag. The Japan engine
//! lives in `crate::japan`.

pub mod engine;
pub mod bowling;
pub(crate) mod common;
pub mod set_match;
pub mod rotation;
pub mod bowlard;
pub mod factory;

pub use engine::{GameEngine, VictoryResult};
pub use bowling::BowlingFrame;
pub use set_match::{SetMatchAction, SetMatchEngine};
pub use rotation::{RotationAction, RotationEngine};
pub use bowlard::{BowlardAction, BowlardEngine};
pub use factory::{EngineFactory, EngineRef, GameAction, GameBuilder};
