use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::recovery::RecoveryLog;
use crate::io::store::{FileTaskStore, ResolveError};
use crate::ops::list_ops::{Command, Outcome};

/// Error type for CLI-level validation
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("task text is empty")]
    EmptyText,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("could not save tasks: {0}")]
    SaveFailed(String),
    #[error("cannot resolve -C path '{path}': {source}")]
    BadDataDir {
        path: String,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one subcommand against the tasks in `data_dir`.
pub fn dispatch(
    command: Commands,
    data_dir: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        // Read commands
        Commands::List(args) => cmd_list(data_dir, args, json),
        Commands::Counts => cmd_counts(data_dir, json),
        Commands::Recovery(args) => cmd_recovery(data_dir, args, json),

        // Write commands
        Commands::Add(args) => cmd_add(data_dir, args, json),
        Commands::Toggle(args) => cmd_mutate(data_dir, &args.id, json, Command::Toggle),
        Commands::Done(args) => cmd_mutate(data_dir, &args.id, json, |id| {
            Command::SetCompleted(id, true)
        }),
        Commands::Undo(args) => cmd_mutate(data_dir, &args.id, json, |id| {
            Command::SetCompleted(id, false)
        }),
        Commands::Edit(args) => cmd_edit(data_dir, args, json),
        Commands::Delete(args) => cmd_delete(data_dir, &args.id, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the -C override (made absolute) or the default data dir.
pub fn resolve_data_dir(override_dir: Option<&str>) -> Result<PathBuf, CliError> {
    match override_dir {
        Some(dir) => {
            let path = Path::new(dir);
            let abs = if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map_err(|e| CliError::BadDataDir {
                        path: dir.to_string(),
                        source: e,
                    })?
                    .join(path)
            };
            Ok(config_io::data_dir(Some(&abs)))
        }
        None => Ok(config_io::data_dir(None)),
    }
}

fn open_store(data_dir: &Path) -> Result<FileTaskStore, Box<dyn std::error::Error>> {
    let config = config_io::read_config(data_dir)?;
    Ok(FileTaskStore::open_in(data_dir, &config))
}

fn join_words(words: &[String]) -> String {
    words.join(" ")
}

/// Print the outcome of a write command and surface save failures.
fn report(
    store: &FileTaskStore,
    outcome: Outcome,
    task_id: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(err) = store.save_error() {
        return Err(CliError::SaveFailed(err.to_string()).into());
    }
    let notice = outcome.notice.map(|n| n.to_string());
    if json {
        let task = task_id.and_then(|id| store.list().find(id));
        let out = CommandResultJson {
            changed: outcome.changed,
            notice,
            task,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if let Some(notice) = notice {
        match task_id {
            Some(id) => println!("{} ({})", notice, short_id(id)),
            None => println!("{}", notice),
        }
    } else {
        println!("unchanged");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(data_dir: &Path, args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(data_dir)?;
    store.dispatch(Command::SetFilter(args.filter));
    let tasks = store.filtered_tasks();
    let counts = store.counts();

    if json {
        let out = TaskListJson {
            filter: args.filter,
            tasks,
            counts,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_task_list(&tasks, args.filter, &counts));
    }
    Ok(())
}

fn cmd_counts(data_dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(data_dir)?;
    let counts = store.counts();
    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        println!("{}", format_counts(&counts));
    }
    Ok(())
}

fn cmd_recovery(
    data_dir: &Path,
    args: RecoveryArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = RecoveryLog::in_dir(data_dir);
    if args.prune {
        let removed = log.prune(args.all)?;
        if json {
            println!("{}", serde_json::json!({ "removed": removed }));
        } else {
            println!("removed {} recovery entries", removed);
        }
        return Ok(());
    }

    let entries = log.entries(Some(args.limit));
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_recovery_entries(&entries));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(data_dir: &Path, args: AddArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = join_words(&args.text);
    if text.trim().is_empty() {
        return Err(CliError::EmptyText.into());
    }
    let mut store = open_store(data_dir)?;
    let outcome = store.dispatch(Command::Add(text));
    let new_id = store.tasks().first().map(|t| t.id.clone());
    report(&store, outcome, new_id.as_deref(), json)
}

/// Resolve the ID, then run a single-task command built from it.
fn cmd_mutate(
    data_dir: &Path,
    id_prefix: &str,
    json: bool,
    make: impl FnOnce(String) -> Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(data_dir)?;
    let id = store.resolve_id(id_prefix).map_err(CliError::from)?;
    let outcome = store.dispatch(make(id.clone()));
    report(&store, outcome, Some(&id), json)
}

fn cmd_edit(data_dir: &Path, args: EditArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = join_words(&args.text);
    if text.trim().is_empty() {
        return Err(CliError::EmptyText.into());
    }
    let mut store = open_store(data_dir)?;
    let id = store.resolve_id(&args.id).map_err(CliError::from)?;
    store.dispatch(Command::StartEdit(id.clone()));
    let outcome = store.dispatch(Command::Edit(id.clone(), text));
    report(&store, outcome, Some(&id), json)
}

fn cmd_delete(data_dir: &Path, id_prefix: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(data_dir)?;
    let id = store.resolve_id(id_prefix).map_err(CliError::from)?;
    let outcome = store.dispatch(Command::Delete(id.clone()));
    // JSON output has no task to show once it is gone
    report(&store, outcome, Some(&id), json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_data_dir_is_made_absolute() {
        let dir = resolve_data_dir(Some("some/rel")).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("some/rel"));
    }

    #[test]
    fn dispatch_runs_in_given_data_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let add = Commands::Add(AddArgs {
            text: vec!["buy".to_string(), "milk".to_string()],
        });
        dispatch(add, tmp.path(), true).unwrap();

        let store = open_store(tmp.path()).unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].text, "buy milk");
    }

    #[test]
    fn absolute_data_dir_kept() {
        let dir = resolve_data_dir(Some("/tmp/tl-data")).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/tl-data"));
    }
}
