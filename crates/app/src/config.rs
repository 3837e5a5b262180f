use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;

/// Track progress through learning roadmaps from the terminal.
#[derive(Debug, Parser)]
#[command(name = "trail", version)]
pub struct Cli {
    /// SQLite database URL or path.
    #[arg(long = "db", env = "TRAIL_DB_URL", default_value = "sqlite://trail.sqlite3")]
    pub db_url: String,

    /// Base URL of a remote roadmap API; builtin roadmaps are used when unset.
    #[arg(long, env = "TRAIL_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// More log output (-v for debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available roadmaps.
    Roadmaps,
    /// Show per-node status for a roadmap.
    Progress { roadmap: String },
    /// Set a node's status (not_started, in_progress, completed).
    Mark {
        roadmap: String,
        node: String,
        status: String,
    },
    /// Show a node's note, or replace it when content is given.
    Note { node: String, content: Option<String> },
    /// List every note, newest first.
    Notes,
    /// Show the current position, or move it.
    Position {
        roadmap: Option<String>,
        node: Option<String>,
        /// Scroll progress within the node, 0.0 to 1.0.
        #[arg(long, requires = "node")]
        scroll: Option<f32>,
    },
    /// Show where to pick up.
    Resume,
    /// Per-roadmap completion summary.
    Journey,
    /// Forget all local progress, notes and positions.
    Reset,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("cannot create database file: {0}")]
    Io(#[from] std::io::Error),
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file (and parent dirs) so `SQLite` can open it.
///
/// # Errors
///
/// Returns `ConfigError::InvalidDbUrl` if the URL is not a `sqlite://` URL
/// with a path, or `ConfigError::Io` if the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ConfigError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ConfigError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigError::InvalidDbUrl {
            raw: db_url.to_string(),
        });
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_full_urls_untouched() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/trail.db"),
            "sqlite:///tmp/trail.db"
        );
    }

    #[test]
    fn absolutizes_bare_paths() {
        assert_eq!(normalize_sqlite_url("/var/trail.db"), "sqlite:///var/trail.db");
        let relative = normalize_sqlite_url("sqlite:trail.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("trail.db"));
    }

    #[test]
    fn rejects_urls_without_a_path() {
        assert!(matches!(
            prepare_sqlite_file("sqlite://"),
            Err(ConfigError::InvalidDbUrl { raw }) if raw == "sqlite://"
        ));
        assert!(matches!(
            prepare_sqlite_file("postgres://db"),
            Err(ConfigError::InvalidDbUrl { .. })
        ));
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }

    #[test]
    fn scroll_needs_a_node() {
        let err = Cli::try_parse_from(["trail", "position", "git-github", "--scroll", "0.5"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["trail", "position", "git-github", "git-2", "--scroll", "0.5"])
            .unwrap();
        assert!(matches!(cli.command, Command::Position { scroll: Some(s), .. } if s == 0.5));
    }

    #[test]
    fn parses_mark_command() {
        let cli = Cli::try_parse_from(["trail", "--db", "x.db", "mark", "git-github", "git-1", "completed"])
            .unwrap();
        assert_eq!(cli.db_url, "x.db");
        assert!(matches!(cli.command, Command::Mark { ref status, .. } if status == "completed"));
    }
}
