//! tb - a two-column task board
//!
//! This library backs the `tb` CLI and its interactive board. Tasks
//! live in one JSON file; every mutation rewrites that file atomically,
//! so concurrent invocations and external editors stay safe.
//!
//! # Core Concepts
//!
//! - **Tasks**: title, optional note, and a todo/done status
//! - **Columns**: the store partitions tasks into To-Do and Done views
//! - **Drag sessions**: a small state machine behind card moves, shared
//!   by the pointer and keyboard paths
//! - **Events**: optional JSON-lines feed of task mutations
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `drag`: Drag-and-drop session state machine
//! - `error`: Error types and result aliases
//! - `events`: Structured mutation events
//! - `lock`: File locking and atomic writes for concurrency safety
//! - `output`: Human and JSON output envelopes
//! - `storage`: Tasks file reading and writing
//! - `task`: Task model, validation, and the store
//! - `ui`: The interactive terminal board

pub mod cli;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod lock;
pub mod output;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
