//! On-disk layout of a voz installation
//!
//! .voz/config.toml and .voz/sheets/<sheet>.jsonl, found by walking up from
//! the current directory.

use crate::{Config, Error, JsonlTables, Result};
use std::fs;
use std::path::{Path, PathBuf};

const VOZ_DIR: &str = ".voz";
const CONFIG_FILE: &str = "config.toml";
const SHEETS_DIR: &str = "sheets";

/// Location of a `.voz` directory
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace containing the current directory
    pub fn find() -> Result<Self> {
        Self::find_from(&std::env::current_dir()?)
    }

    /// Find the workspace containing `start`
    pub fn find_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();
        loop {
            if current.join(VOZ_DIR).exists() {
                return Ok(Self { root: current });
            }
            if !current.pop() {
                return Err(Error::NotInitialized);
            }
        }
    }

    /// Initialize a new workspace in `root`
    pub fn init(root: &Path) -> Result<Self> {
        let voz_dir = root.join(VOZ_DIR);
        if voz_dir.exists() {
            return Err(Error::AlreadyInitialized(voz_dir.display().to_string()));
        }

        fs::create_dir_all(voz_dir.join(SHEETS_DIR))?;
        fs::write(voz_dir.join(CONFIG_FILE), Config::default_with_comments())?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Path to the .voz directory
    pub fn voz_dir(&self) -> PathBuf {
        self.root.join(VOZ_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.voz_dir().join(CONFIG_FILE)
    }

    pub fn sheets_dir(&self) -> PathBuf {
        self.voz_dir().join(SHEETS_DIR)
    }

    /// Load config with environment overrides
    pub fn config(&self) -> Result<Config> {
        Config::load(&self.config_path())
    }

    /// Sheet store backed by this workspace's JSONL files
    pub fn tables(&self) -> JsonlTables {
        JsonlTables::new(self.sheets_dir())
    }
}
