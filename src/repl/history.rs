use crate::repl::highlighter::ReplHelper;
use rustyline::Editor;
use rustyline::history::DefaultHistory;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const HISTORY_FILE_NAME: &str = "history.txt";

/// An explicit path wins; otherwise `<data dir>/monkey/history.txt`.
pub(crate) fn resolve_history_path(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if override_path.is_some() {
        return override_path;
    }
    let crate_name = env!("CARGO_PKG_NAME");
    dirs::data_dir().or_else(dirs::config_dir).map(|mut path| {
        path.push(crate_name);
        path.push(HISTORY_FILE_NAME);
        path
    })
}

pub(crate) fn load_history_from_path(
    rl: &mut Editor<ReplHelper, DefaultHistory>,
    history_path: &Path,
) {
    if let Some(parent_dir) = history_path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            if let Err(e) = fs::create_dir_all(parent_dir) {
                warn!(
                    "Failed to create history directory {}: {}",
                    parent_dir.display(),
                    e
                );
            }
        }
    }
    if !history_path.exists() {
        info!(
            "History file {} does not exist. Will create on exit.",
            history_path.display()
        );
        return;
    }
    match rl.load_history(history_path) {
        Ok(()) => info!("Loaded history from {}", history_path.display()),
        Err(err) => warn!(
            "Could not load history from {}: {}",
            history_path.display(),
            err
        ),
    }
}

pub(crate) fn save_history_to_path(
    rl: &mut Editor<ReplHelper, DefaultHistory>,
    history_path: &Path,
) {
    match rl.save_history(history_path) {
        Ok(()) => info!("Saved history to {}", history_path.display()),
        Err(err) => error!(
            "Could not save history to {}: {}",
            history_path.display(),
            err
        ),
    }
}
