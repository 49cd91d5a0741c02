//! Ash - shelf visibility and extension request routing for a desktop shell.
//!
//! # Architecture
//!
//! The library is organized into these main modules:
//!
//! - [`shelf`] - Shelf visibility state machine, bounds and animation
//! - [`extensions`] - Script context classification, permission checks
//!   and request/response correlation
//! - [`config`] - Configuration loading and management
//! - [`geometry`] - Integer screen geometry
//! - [`logging`] - Tracing subscriber setup
//!
//! Both subsystems are single-threaded and event driven. Time is passed in
//! explicitly (`now: Instant`) so the state machines stay deterministic;
//! the async drivers in [`shelf::driver`] and [`extensions::dispatcher`]
//! feed them from tokio channels.
//!
//! # Example
//!
//! ```ignore
//! use ash_core::extensions::{Dispatcher, ExtensionMessage};
//! use ash_core::Config;
//!
//! let config = Config::load();
//! let (tx, _host_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut dispatcher = Dispatcher::new(&config.extensions, Box::new(tx));
//! dispatcher.handle_message(ExtensionMessage::from_json(raw)?);
//! ```

// Public modules
pub mod config;
pub mod extensions;
pub mod geometry;
pub mod logging;
pub mod shelf;

// Internal modules
mod error;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{AshError, AshResult};
