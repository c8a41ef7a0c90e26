// q3ios Rust library
// Touch and controller input, asset preparation and launch for the engine

pub mod assets;
pub mod c_bindings;
pub mod cli;
pub mod config;
pub mod engine;
pub mod input;
pub mod launch;
pub mod logging;
pub mod propfile;

pub use cli::Cli;
pub use config::Options;
pub use logging::LogLevel;
