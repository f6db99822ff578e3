use std::path::{Path, PathBuf};

use anchorage::error::Result;
use anchorage::Settings;

/// A project tree and its settings.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub settings: Settings,
}

impl Project {
    /// Opens the project at `root` (or the current directory), reading
    /// `config` if given and `anchorage.toml` in the root otherwise.
    pub fn open(root: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };

        let settings = match config {
            Some(path) => Settings::read(root.join(path))?,
            None => Settings::discover(&root)?,
        };

        tracing::debug!(root = %root.display(), "opened project");
        Ok(Project { root, settings })
    }

    /// `path` resolved against the project root.
    pub fn path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }

    pub fn anchors_dir(&self) -> PathBuf {
        self.path(&self.settings.anchors_dir)
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.path(&self.settings.docs_dir)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.path(&self.settings.public_dir)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.path(&self.settings.data_dir)
    }
}
