//! # Code Auto Typer
//!
//! Replays pre-written text as synthetic keystrokes into whichever window has
//! focus, after a start delay and at a fixed pace per character. Useful for
//! "live coding" a prepared snippet during a demo.
//!
//! ## Features
//!
//! - Normalizes pasted text: blank lines dropped, lines trimmed
//! - Tabs replaced by a configurable number of spaces, or removed
//! - One character per tick with a single pending timer, stoppable at any time
//! - Global stop hotkey and Ctrl-C handling in the CLI
//! - JSON configuration file support
//!
//! ## Example
//!
//! ```no_run
//! use code_auto_typer::{prepare, Dispatcher, EnigoInjector, TabPolicy};
//! use std::time::Duration;
//!
//! # async fn demo() -> code_auto_typer::Result<()> {
//! let characters = prepare("fn main() {\n\tprintln!(\"hi\");\n}", TabPolicy::default())?;
//! let mut dispatcher = Dispatcher::new(EnigoInjector::new()?);
//! let stop = dispatcher.start(characters, Duration::from_secs(5))?;
//! // Hand `stop` to whatever should be able to cancel the run.
//! let summary = dispatcher.run().await?;
//! println!("typed {} characters", summary.sent);
//! # drop(stop);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod global_hotkey;
pub mod injector;
pub mod normalizer;

pub use config::{Config, TypingSettings};
pub use dispatcher::{Dispatcher, JobState, RunSummary, StopHandle, StopReason, TypingJob};
pub use error::{InjectionError, Result, TyperError};
pub use global_hotkey::StopHotkey;
pub use injector::{EnigoInjector, KeystrokeInjector, Keystroke, WriterInjector};
pub use normalizer::{normalize, prepare, TabPolicy};
