pub mod adapter;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod grid;
pub mod policy;
pub mod registry;
pub mod runtime;
pub mod sim;

pub use adapter::{EventLog, GameAdapter, GameEvent};
pub use config::GameConfig;
pub use entity::{AgentId, Bomb, Cheese};
pub use error::GameError;
pub use game::{Game, GameState, MoveOutcome};
pub use grid::{Cell, Coord, Direction, Maze};
pub use policy::{
    CandidateOrder, Decision, DecisionPolicy, Explorer, Fallback, Idle, Move, ResetPolicy,
};
pub use registry::AgentRegistry;
pub use runtime::AgentRuntime;
pub use sim::{Simulation, Sprite};
