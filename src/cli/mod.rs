use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::notes::SessionKind;

mod handlers;

pub use handlers::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Owner of the notes. Defaults to `default_user` from the config.
    #[clap(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the text extracted from a .txt, .pdf or .docx file
    Extract {
        path: PathBuf,
    },
    /// Store a document as a note
    Upload {
        path: PathBuf,

        /// Note title. The file name by default.
        #[clap(short, long)]
        title: Option<String>,
    },
    /// List notes, newest first
    List {},
    /// Show a note
    Show {
        id: u64,
    },
    /// Delete a note along with its summary, flashcards, quiz and sessions
    Delete {
        id: u64,
    },
    /// Generate a summary of a note
    Summary {
        id: u64,

        /// Print the stored summary instead of generating a new one
        #[clap(long, default_value = "false")]
        cached: bool,
    },
    /// Generate flashcards from a note
    Flashcards {
        id: u64,

        /// Print the stored flashcards instead of generating new ones
        #[clap(long, default_value = "false")]
        cached: bool,
    },
    /// Generate a multiple-choice quiz from a note
    Quiz {
        id: u64,

        /// Print the stored quiz instead of generating a new one
        #[clap(long, default_value = "false")]
        cached: bool,
    },
    /// Find notes relevant to a query
    Search {
        query: String,
    },
    /// Track study sessions
    Session {
        #[clap(subcommand)]
        action: SessionArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionArgs {
    /// Start a study session on a note
    Start {
        note_id: u64,

        #[clap(short, long, value_enum)]
        kind: SessionKind,
    },
    /// Record the result of a study session
    Finish {
        session_id: u64,

        #[clap(short, long)]
        score: Option<i64>,

        #[clap(short, long, default_value = "false")]
        completed: bool,
    },
}
