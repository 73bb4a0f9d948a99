use std::path::PathBuf;

use thiserror::Error;

use crate::{entity::AgentId, grid::Coord};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("game has already been started")]
    AlreadyStarted,
    #[error("game is not running")]
    NotRunning,
    #[error("unknown agent {0:?}")]
    UnknownAgent(AgentId),
    #[error("cell ({}, {}) is outside the maze", .0.x, .0.y)]
    OutsideMaze(Coord),
    #[error("agent `{name}` could not be constructed: {reason}")]
    AgentConstruction { name: String, reason: String },
}
