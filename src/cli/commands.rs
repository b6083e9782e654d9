use clap::{Args, Parser, Subcommand};

use crate::model::task::Filter;

#[derive(Parser)]
#[command(name = "tl", about = concat!("[x] tasklist v", env!("CARGO_PKG_VERSION"), " - a small local task list"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks, newest first
    List(ListArgs),
    /// Show task counts per filter
    Counts,
    /// Add a task
    Add(AddArgs),
    /// Flip a task between active and completed
    Toggle(IdArgs),
    /// Mark a task completed
    Done(IdArgs),
    /// Mark a task active again
    Undo(IdArgs),
    /// Replace a task's text
    Edit(EditArgs),
    /// Delete a task
    Delete(IdArgs),
    /// View or prune the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Which tasks to show: all, active, completed
    #[arg(long, short, default_value = "all")]
    pub filter: Filter,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text (multiple words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID or unique ID prefix
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID or unique ID prefix
    pub id: String,
    /// New task text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show
    #[arg(long, default_value = "10")]
    pub limit: usize,
    /// Remove entries older than 30 days
    #[arg(long)]
    pub prune: bool,
    /// With --prune, remove every entry
    #[arg(long, requires = "prune")]
    pub all: bool,
}
