use anyhow::{bail, Context, Result};
use feedback_queue_core::{PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use std::env;
use std::path::PathBuf;

/// Special database name for an ephemeral store.
pub const IN_MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the SQLite database.
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
    /// Database file name inside `state_dir`, or `:memory:`.
    pub db_file: String,
    /// Page size used by listings when the caller gives none.
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("."),
            db_file: "feedback-queue.db".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let state_dir = non_blank(lookup("FEEDBACK_STATE_DIR"))
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        let db_file = non_blank(lookup("FEEDBACK_DB_FILE")).unwrap_or(defaults.db_file);

        let page_size = match non_blank(lookup("FEEDBACK_PAGE_SIZE")) {
            Some(raw) => parse_page_size(&raw)?,
            None => defaults.page_size,
        };

        Ok(Config {
            state_dir,
            db_file,
            page_size,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, state_dir: Option<PathBuf>, db_file: Option<String>) -> Self {
        if let Some(state_dir) = state_dir {
            self.state_dir = state_dir;
        }
        if let Some(db_file) = non_blank(db_file) {
            self.db_file = db_file;
        }
        self
    }

    /// Path handed to the SQLite backend.
    pub fn db_path(&self) -> PathBuf {
        if self.db_file == IN_MEMORY_DB {
            PathBuf::from(IN_MEMORY_DB)
        } else {
            self.state_dir.join(&self.db_file)
        }
    }

    /// Page request for a listing, falling back to the configured size.
    pub fn page(&self, cursor: Option<u64>, size: Option<usize>) -> Result<PageRequest> {
        let page = PageRequest::new(
            cursor.map(Into::into),
            size.unwrap_or(self.page_size),
        )?;
        Ok(page)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse FEEDBACK_PAGE_SIZE; must fall within the listing bounds.
pub fn parse_page_size(raw: &str) -> Result<usize> {
    let size = raw
        .trim()
        .parse::<usize>()
        .context("FEEDBACK_PAGE_SIZE must be a valid number")?;
    if size == 0 || size > MAX_PAGE_SIZE {
        bail!(
            "FEEDBACK_PAGE_SIZE must be between 1 and {}, got {}",
            MAX_PAGE_SIZE,
            size
        );
    }
    Ok(size)
}
