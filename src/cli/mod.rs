//! Command-line interface for tb
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;
use crate::output::OutputOptions;

mod board;
mod task;

/// tb - a two-column task board
///
/// Tasks live in a single JSON file and move between the To-Do and
/// Done columns, either from subcommands or the interactive board.
#[derive(Parser, Debug)]
#[command(name = "tb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the tasks file (defaults to the platform data directory)
    #[arg(long, global = true, env = "TB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Append events as JSON lines to a file, or `-` for stdout
    #[arg(long, global = true, env = "TB_EVENTS")]
    pub events: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task to the top of the To-Do column
    Add {
        /// Task title (3 to 80 characters after trimming)
        title: String,

        /// Free-form note shown under the title
        #[arg(long, default_value = "")]
        note: String,
    },

    /// List tasks, newest first
    List {
        /// Only show one column: todo or done
        #[arg(long)]
        status: Option<String>,

        /// Maximum number of tasks to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Flip a task between todo and done
    Toggle {
        /// Task id, or a unique prefix of one
        id: String,
    },

    /// Move a task to a column
    Move {
        /// Task id, or a unique prefix of one
        id: String,

        /// Target column: todo or done
        status: String,
    },

    /// Delete a task
    Delete {
        /// Task id, or a unique prefix of one
        id: String,
    },

    /// Open the interactive board
    Board,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::Add { title, note } => task::run_add(task::AddOptions {
                title,
                note,
                data_dir: self.data_dir,
                events: self.events,
                output,
            }),
            Commands::List { status, limit } => task::run_list(task::ListOptions {
                status,
                limit,
                data_dir: self.data_dir,
                output,
            }),
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions {
                id,
                data_dir: self.data_dir,
                events: self.events,
                output,
            }),
            Commands::Move { id, status } => task::run_move(task::MoveOptions {
                id,
                status,
                data_dir: self.data_dir,
                events: self.events,
                output,
            }),
            Commands::Delete { id } => task::run_delete(task::DeleteOptions {
                id,
                data_dir: self.data_dir,
                events: self.events,
                output,
            }),
            Commands::Board => board::run(board::BoardOptions {
                data_dir: self.data_dir,
                events: self.events,
            }),
        }
    }
}
