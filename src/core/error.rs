//! Boundary error types.
//!
//! Engines never fail: they are total over valid games and return the
//! input unchanged for no-op input. Errors exist only where data enters
//! the crate from outside (variant ids, game setups, persisted snapshots).

use derive_more::{Display, Error, From};

/// Errors raised at the crate boundary.
#[derive(Debug, Display, Error, From)]
pub enum ScoreError {
    /// A variant id that names no known rule set.
    #[display("unknown variant id: {_0:?}")]
    UnknownVariant(#[error(not(source))] String),

    /// A game setup that cannot produce a playable game.
    #[display("invalid game setup: {_0}")]
    InvalidSetup(#[error(not(source))] String),

    /// Snapshot JSON could not be parsed or produced.
    #[display("snapshot serialization failed: {_0}")]
    #[from]
    Snapshot(serde_json::Error),

    /// Snapshot written by an incompatible format version.
    #[display("unsupported snapshot version {_0}")]
    SnapshotVersion(#[error(not(source))] u32),

    /// Snapshot parsed but describes a game no engine can continue.
    #[display("invalid snapshot: {_0}")]
    InvalidSnapshot(#[error(not(source))] String),
}

impl PartialEq for ScoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScoreError::UnknownVariant(a), ScoreError::UnknownVariant(b)) => a == b,
            (ScoreError::InvalidSetup(a), ScoreError::InvalidSetup(b)) => a == b,
            (ScoreError::SnapshotVersion(a), ScoreError::SnapshotVersion(b)) => a == b,
            (ScoreError::InvalidSnapshot(a), ScoreError::InvalidSnapshot(b)) => a == b,
            (ScoreError::Snapshot(a), ScoreError::Snapshot(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, ScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ScoreError::UnknownVariant("snooker".into());
        assert_eq!(err.to_string(), "unknown variant id: \"snooker\"");

        let err = ScoreError::InvalidSetup("no players".into());
        assert_eq!(err.to_string(), "invalid game setup: no players");

        let err = ScoreError::SnapshotVersion(9);
        assert_eq!(err.to_string(), "unsupported snapshot version 9");

        let err = ScoreError::InvalidSnapshot("no players".into());
        assert_eq!(err.to_string(), "invalid snapshot: no players");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: ScoreError = json_err.into();
        assert!(matches!(err, ScoreError::Snapshot(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
