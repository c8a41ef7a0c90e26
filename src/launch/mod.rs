//! Starting the engine
//!
//! The menu never calls into the engine directly. It posts a
//! [`LaunchRequest`] on a channel and the [`Launcher`] on the main thread
//! checks the game data, extracts menu assets and hands the argument
//! vector to the [`EngineHost`](crate::engine::EngineHost).

pub mod args;
pub mod orchestrator;

pub use args::{BotMatch, LaunchArgs, ServerAddress, DEFAULT_PLAYER_NAME};
pub use orchestrator::{launch_channel, LaunchOutcome, LaunchRequest, Launcher, MISSING_FILES_MESSAGE};

use crate::engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("engine failed to start: {0}")]
    Engine(#[from] EngineError),

    #[error("invalid server address {0:?}, expected host:port")]
    InvalidServer(String),

    #[error("launch channel closed before a request arrived")]
    Disconnected,
}
