//! designkit Application
//!
//! Headless editor shell: configuration, the editing session that ties the
//! store to persistence and rendering, and the scripted session runner.

mod config;
mod editor;
mod script;

pub use config::{AppConfig, ConfigError};
pub use editor::{Editor, EditorError, Notification, NotificationLevel};
pub use script::{EditorAction, ScriptError, parse_script, run_script};
