//! `tb board` launcher
//!
//! Resolves the data directory and event sink, then hands off to the
//! terminal UI.

use std::path::PathBuf;

use crate::config::{self, Config};
use crate::error::Result;
use crate::events::EventDestination;
use crate::storage::Storage;
use crate::task::TaskStore;
use crate::ui;

/// Options for `tb board`
pub struct BoardOptions {
    pub data_dir: Option<PathBuf>,
    pub events: Option<String>,
}

/// Run `tb board`
pub fn run(opts: BoardOptions) -> Result<()> {
    let config = Config::load_default()?;
    let dir = config::resolve_data_dir(opts.data_dir.as_deref(), &config)?;
    let store = TaskStore::load(Storage::new(dir));

    let destination =
        EventDestination::parse(opts.events.as_deref().or(config.events.destination.as_deref()));
    let sink = match destination {
        // JSON lines on stdout would corrupt the terminal UI.
        None | Some(EventDestination::Stdout) => None,
        Some(destination) => match destination.open() {
            Ok(sink) => Some(sink),
            Err(err) => {
                tracing::warn!("events disabled: {err}");
                None
            }
        },
    };

    ui::board::run(store, sink, &config.ui)
}
