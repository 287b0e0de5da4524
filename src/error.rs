//! Error types for loading configuration, maps and the high-score table.
//!
//! Nothing inside the per-frame simulation returns an error: degenerate
//! states are clamped or substituted in place.  Errors only surface before a
//! round starts, or from the persistence collaborator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("score file error: {0}")]
    ScoreFile(#[from] serde_json::Error),

    /// A configuration value is outside the range the simulation accepts.
    #[error("config value '{name}' = {value} is invalid: {reason}")]
    InvalidConfig {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },

    /// Map geometry cannot host a round (e.g. player spawn inside a wall).
    #[error("invalid map: {0}")]
    MapInvalid(String),
}

pub type GameResult<T> = Result<T, GameError>;
