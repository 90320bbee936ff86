//! Plugins folder on the local disk.
//!
//! [`PluginFolder`] lists the installed plugins by reading the header of every
//! `*.plugin.js` file in the folder and performs the file operations an update
//! needs.

mod scan;

use path_clean::PathClean;
use plugup_core::host::{FilesError, FilesResult, PluginFiles, PluginHost};
use plugup_core::{AppDirs, PluginMetadata, UpdaterConfig};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use scan::{scan_plugins, PLUGIN_SUFFIX};

#[derive(Debug, Error)]
pub enum FolderError {
    #[error("plugins folder {path} does not exist")]
    Missing { path: PathBuf },
    #[error("failed to create plugins folder {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PluginFolder {
    root: PathBuf,
}

impl PluginFolder {
    /// Uses an existing folder.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FolderError> {
        let root = root.into().clean();
        if !root.is_dir() {
            return Err(FolderError::Missing { path: root });
        }
        Ok(Self { root })
    }

    /// Creates the folder when it does not exist yet.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, FolderError> {
        let root = root.into().clean();
        fs::create_dir_all(&root).map_err(|source| FolderError::Create {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Opens (creating if needed) the folder named by `config`, falling back
    /// to the default plugins folder.
    pub fn from_config(config: &UpdaterConfig, dirs: &AppDirs) -> Result<Self, FolderError> {
        Self::create(config.plugins_folder_or_default(dirs))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl PluginFiles for PluginFolder {
    fn plugins_folder(&self) -> &Path {
        &self.root
    }

    fn write_file(&self, path: &Path, content: &str) -> FilesResult<()> {
        ensure_parent(path)
            .and_then(|_| fs::write(path, content))
            .map_err(|source| FilesError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote plugin file");
        Ok(())
    }

    fn rename_file(&self, from: &Path, to: &Path) -> FilesResult<()> {
        ensure_parent(to)
            .and_then(|_| fs::rename(from, to))
            .map_err(|source| FilesError::Rename {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })?;
        tracing::debug!(from = %from.display(), to = %to.display(), "renamed plugin file");
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> FilesResult<()> {
        fs::remove_file(path).map_err(|source| FilesError::Delete {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "deleted plugin file");
        Ok(())
    }
}

impl PluginHost for PluginFolder {
    fn list_installed_plugins(&self) -> Vec<PluginMetadata> {
        match scan_plugins(&self.root) {
            Ok(plugins) => plugins,
            Err(err) => {
                tracing::warn!(folder = %self.root.display(), error = %err, "failed to scan plugins folder");
                Vec::new()
            }
        }
    }
}
