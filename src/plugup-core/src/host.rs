//! Interfaces to the application hosting the plugins.
//!
//! The updater never talks to the network, the disk or the UI directly; the
//! host hands it implementations of these traits.

use crate::metadata::PluginMetadata;
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },
    #[error("unexpected status {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("{message}")]
    Other { message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Retrieves the latest text of a plugin from its `updateUrl`.
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> SourceResult<String>;
}

#[derive(Debug, Error)]
pub enum FilesError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type FilesResult<T> = Result<T, FilesError>;

/// File primitives scoped to the host's plugins folder.
pub trait PluginFiles: Send + Sync {
    /// Base directory that relative plugin and config paths resolve against.
    fn plugins_folder(&self) -> &Path;

    fn write_file(&self, path: &Path, content: &str) -> FilesResult<()>;

    fn rename_file(&self, from: &Path, to: &Path) -> FilesResult<()>;

    fn delete_file(&self, path: &Path) -> FilesResult<()>;

    /// Resolves `relative` against the plugins folder. Absolute paths are kept;
    /// `.` and `..` segments are folded so equal locations compare equal.
    fn resolve(&self, relative: &str) -> PathBuf {
        self.plugins_folder().join(relative).clean()
    }
}

/// Enumerates the plugins currently installed in the host.
pub trait PluginHost: Send + Sync {
    /// Each entry carries the parsed header plus the host-supplied `filename`.
    fn list_installed_plugins(&self) -> Vec<PluginMetadata>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeKind {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoticeOptions {
    pub kind: NoticeKind,
    /// `None` keeps the notice until it is closed.
    pub timeout: Option<std::time::Duration>,
}

/// Content of the update notice: a message, the outdated plugins (each one
/// clickable) and button labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoticeContent {
    pub message: String,
    pub plugins: Vec<String>,
    pub buttons: Vec<String>,
}

pub trait NoticeHost: Send + Sync {
    fn show_notice(&self, content: &NoticeContent, options: &NoticeOptions) -> Box<dyn NoticeHandle>;
}

/// A notice that is (or was) on screen.
pub trait NoticeHandle: Send {
    /// False once the user or the host dismissed the notice.
    fn is_shown(&self) -> bool;

    /// Replaces the listed plugins in place.
    fn set_plugins(&mut self, plugins: &[String]);

    fn close(&mut self);
}
