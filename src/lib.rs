// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod input;
pub mod language;
pub mod logging;
pub mod passage;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod timer;
pub mod ui;
pub mod word_generator;

pub use app::{App, Flow};
pub use error::EngineError;
pub use session::{Event, Session, SessionConfig, SessionSnapshot};
