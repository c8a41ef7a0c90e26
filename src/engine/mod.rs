//! Engine boundary
//!
//! The engine itself (renderer, network, game VM) lives on the other side
//! of a handful of C entry points. This module names those entry points
//! as traits so the input code can be driven and tested without it.

pub mod keys;
pub mod sink;
pub mod status;

pub use keys::{key_from_name, key_name, KeyNum};
pub use sink::{CArgv, EngineError, EngineHost, EngineSink, KeyCatch, RecordingSink, SinkEvent};
pub use status::{EngineStatus, SharedEngineStatus};
