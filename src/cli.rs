use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const DATA_DIR_ENV: &str = "TODOPANE_DATA_DIR";
pub const LOG_FILE_NAME: &str = "todopane.log";

#[derive(Debug, Parser)]
#[command(name = "todopane", version, about = "Searchable to-do list in the terminal")]
pub struct Cli {
    /// Directory holding todos.json (defaults to $TODOPANE_DATA_DIR, then the user data dir)
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Log file (defaults to <data dir>/todopane.log)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (-q warn, -qq error)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

/// Flag, then environment, then `<platform data dir>/todopane`.
pub fn resolve_data_dir(flag: Option<&Path>, env_value: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_value.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    dirs::data_dir()
        .map(|data_home| data_home.join("todopane"))
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}

pub fn level_for(verbose: u8, quiet: u8) -> &'static str {
    if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    }
}

/// Send tracing output to a file; the terminal belongs to the UI.
pub fn init_tracing(verbose: u8, quiet: u8, log_file: &Path) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_for(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env_beats_default() {
        let flag = PathBuf::from("/tmp/flag");
        let env = Some(PathBuf::from("/tmp/env"));

        assert_eq!(resolve_data_dir(Some(&flag), env.clone()).unwrap(), flag);
        assert_eq!(resolve_data_dir(None, env).unwrap(), PathBuf::from("/tmp/env"));
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0, 0), "warn");
        assert_eq!(level_for(2, 0), "debug");
        assert_eq!(level_for(0, 2), "error");
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from(["todopane", "--data-dir", "/tmp/x", "-vv"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.quiet, 0);
    }
}
