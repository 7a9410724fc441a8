//! Variant dispatch.
//!
//! `EngineFactory` is a lookup table built once and passed by reference.
//! `engine(variant)` is an explicit switch on the variant tag returning a
//! borrowed, tagged engine; actions are wrapped in `GameAction` so a
//! caller holding any game can drive it without knowing the variant
//! statically.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::bowlard::{BowlardAction, BowlardEngine};
use super::engine::{GameEngine, VictoryResult};
use super::rotation::{RotationAction, RotationEngine};
use super::set_match::{SetMatchAction, SetMatchEngine};
use crate::clock::ChessClockSettings;
use crate::core::config::{GameSetup, Variant, VariantSettings};
use crate::core::error::{Result, ScoreError};
use crate::core::player::PlayerSetup;
use crate::core::state::Game;
use crate::japan::{JapanAction, JapanEngine};

/// An action for any variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", content = "payload", rename_all = "snake_case")]
pub enum GameAction {
    SetMatch(SetMatchAction),
    Rotation(RotationAction),
    Bowlard(BowlardAction),
    Japan(JapanAction),
}

impl GameAction {
    /// The variant this action belongs to.
    #[must_use]
    pub fn variant(&self) -> Variant {
        match self {
            GameAction::SetMatch(_) => Variant::SetMatch,
            GameAction::Rotation(_) => Variant::Rotation,
            GameAction::Bowlard(_) => Variant::Bowlard,
            GameAction::Japan(_) => Variant::Japan,
        }
    }
}

impl From<SetMatchAction> for GameAction {
    fn from(action: SetMatchAction) -> Self {
        GameAction::SetMatch(action)
    }
}

impl From<RotationAction> for GameAction {
    fn from(action: RotationAction) -> Self {
        GameAction::Rotation(action)
    }
}

impl From<BowlardAction> for GameAction {
    fn from(action: BowlardAction) -> Self {
        GameAction::Bowlard(action)
    }
}

impl From<JapanAction> for GameAction {
    fn from(action: JapanAction) -> Self {
        GameAction::Japan(action)
    }
}

/// A borrowed engine, tagged by variant.
#[derive(Clone, Copy, Debug)]
pub enum EngineRef<'a> {
    SetMatch(&'a SetMatchEngine),
    Rotation(&'a RotationEngine),
    Bowlard(&'a BowlardEngine),
    Japan(&'a JapanEngine),
}

impl EngineRef<'_> {
    #[must_use]
    pub fn variant(&self) -> Variant {
        match self {
            EngineRef::SetMatch(e) => e.variant(),
            EngineRef::Rotation(e) => e.variant(),
            EngineRef::Bowlard(e) => e.variant(),
            EngineRef::Japan(e) => e.variant(),
        }
    }

    pub fn initialize(&self, setup: &GameSetup) -> Game {
        match self {
            EngineRef::SetMatch(e) => e.initialize(setup),
            EngineRef::Rotation(e) => e.initialize(setup),
            EngineRef::Bowlard(e) => e.initialize(setup),
            EngineRef::Japan(e) => e.initialize(setup),
        }
    }

    /// Apply an action. A variant mismatch returns the game unchanged.
    pub fn apply_action(&self, game: &Game, action: &GameAction) -> Game {
        match (self, action) {
            (EngineRef::SetMatch(e), GameAction::SetMatch(a)) => e.apply_action(game, a),
            (EngineRef::Rotation(e), GameAction::Rotation(a)) => e.apply_action(game, a),
            (EngineRef::Bowlard(e), GameAction::Bowlard(a)) => e.apply_action(game, a),
            (EngineRef::Japan(e), GameAction::Japan(a)) => e.apply_action(game, a),
            _ => {
                warn!(
                    engine = %self.variant(),
                    action = %action.variant(),
                    "action for another variant ignored"
                );
                game.clone()
            }
        }
    }

    pub fn undo(&self, game: &Game) -> Game {
        match self {
            EngineRef::SetMatch(e) => e.undo(game),
            EngineRef::Rotation(e) => e.undo(game),
            EngineRef::Bowlard(e) => e.undo(game),
            EngineRef::Japan(e) => e.undo(game),
        }
    }

    pub fn check_victory(&self, game: &Game) -> VictoryResult {
        match self {
            EngineRef::SetMatch(e) => e.check_victory(game),
            EngineRef::Rotation(e) => e.check_victory(game),
            EngineRef::Bowlard(e) => e.check_victory(game),
            EngineRef::Japan(e) => e.check_victory(game),
        }
    }
}

/// One engine per variant.
#[derive(Clone, Debug, Default)]
pub struct EngineFactory {
    set_match: SetMatchEngine,
    rotation: RotationEngine,
    bowlard: BowlardEngine,
    japan: JapanEngine,
}

impl EngineFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the engine for `variant`.
    #[must_use]
    pub fn engine(&self, variant: Variant) -> EngineRef<'_> {
        match variant {
            Variant::SetMatch => EngineRef::SetMatch(&self.set_match),
            Variant::Rotation => EngineRef::Rotation(&self.rotation),
            Variant::Bowlard => EngineRef::Bowlard(&self.bowlard),
            Variant::Japan => EngineRef::Japan(&self.japan),
        }
    }

    /// Select the engine for a variant id string.
    pub fn engine_for_id(&self, id: &str) -> Result<EngineRef<'_>> {
        Ok(self.engine(id.parse()?))
    }

    /// Apply an action with the engine for the game's variant.
    #[instrument(skip_all, fields(game_id = %game.id))]
    pub fn apply_action(&self, game: &Game, action: &GameAction) -> Game {
        self.engine(game.variant).apply_action(game, action)
    }

    /// Undo with the engine for the game's variant.
    pub fn undo(&self, game: &Game) -> Game {
        self.engine(game.variant).undo(game)
    }

    /// Victory check with the engine for the game's variant.
    pub fn check_victory(&self, game: &Game) -> VictoryResult {
        self.engine(game.variant).check_victory(game)
    }
}

/// Builder for creating a game.
///
/// ```
/// use cue_score::rules::GameBuilder;
/// use cue_score::core::Variant;
///
/// let game = GameBuilder::new(Variant::Japan)
///     .player("A")
///     .player("B")
///     .player("C")
///     .seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(game.player_count(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct GameBuilder {
    setup: GameSetup,
}

impl GameBuilder {
    pub fn new(variant: Variant) -> Self {
        Self {
            setup: GameSetup::new(variant),
        }
    }

    /// Add a player by name.
    pub fn player(self, name: impl Into<String>) -> Self {
        self.player_setup(PlayerSetup::new(name))
    }

    /// Add a fully specified player.
    pub fn player_setup(mut self, setup: PlayerSetup) -> Self {
        self.setup.players.push(setup);
        self
    }

    /// Replace the variant settings. Settings for another variant switch
    /// the game to that variant.
    pub fn settings(mut self, settings: VariantSettings) -> Self {
        self.setup.settings = settings;
        self
    }

    pub fn chess_clock(mut self, settings: ChessClockSettings) -> Self {
        self.setup.chess_clock = Some(settings);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.setup.seed = seed;
        self
    }

    /// The setup built so far.
    #[must_use]
    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    /// Validate the setup and initialize the game.
    pub fn build(self) -> Result<Game> {
        self.build_with(&EngineFactory::new())
    }

    /// Validate and initialize with an existing factory.
    pub fn build_with(self, factory: &EngineFactory) -> Result<Game> {
        let variant = self.setup.variant();
        if self.setup.players.is_empty() {
            return Err(ScoreError::InvalidSetup("at least one player is required".into()));
        }
        if variant == Variant::Japan && self.setup.players.len() < 2 {
            return Err(ScoreError::InvalidSetup(
                "japan rules need at least two players".into(),
            ));
        }
        Ok(factory.engine(variant).initialize(&self.setup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerId;

    #[test]
    fn test_factory_selects_by_variant() {
        let factory = EngineFactory::new();
        for variant in Variant::ALL {
            assert_eq!(factory.engine(variant).variant(), variant);
        }
    }

    #[test]
    fn test_engine_for_unknown_id() {
        let factory = EngineFactory::new();
        assert!(matches!(
            factory.engine_for_id("carom"),
            Err(ScoreError::UnknownVariant(_))
        ));
        assert_eq!(factory.engine_for_id("japan").unwrap().variant(), Variant::Japan);
    }

    #[test]
    fn test_mismatched_action_is_noop() {
        let factory = EngineFactory::new();
        let game = GameBuilder::new(Variant::SetMatch).player("A").player("B").build().unwrap();
        let action = GameAction::from(RotationAction::PocketBall { player_id: PlayerId::for_seat(0), ball: 1 });

        assert_eq!(factory.apply_action(&game, &action), game);
    }

    #[test]
    fn test_dispatch_round_trip() {
        let factory = EngineFactory::new();
        let game = GameBuilder::new(Variant::Rotation).player("A").player("B").build().unwrap();
        let action = GameAction::from(RotationAction::PocketBall { player_id: PlayerId::for_seat(1), ball: 6 });

        let next = factory.apply_action(&game, &action);
        assert_eq!(next.players[1].score, 6);
        assert_eq!(factory.undo(&next), game);
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            GameBuilder::new(Variant::Rotation).build(),
            Err(ScoreError::InvalidSetup(_))
        ));
        assert!(matches!(
            GameBuilder::new(Variant::Japan).player("A").build(),
            Err(ScoreError::InvalidSetup(_))
        ));
        assert!(GameBuilder::new(Variant::Bowlard).player("A").build().is_ok());
    }

    #[test]
    fn test_game_action_serde() {
        let action = GameAction::from(SetMatchAction::WinSet { player_id: PlayerId::new("a") });
        let json = serde_json::to_string(&action).unwrap();
        let back: GameAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
