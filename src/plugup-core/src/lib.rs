pub mod config;
pub mod host;
pub mod logging;
pub mod metadata;
pub mod paths;
pub mod semver;
pub mod store;

pub use config::{Config, ConfigError, HttpConfig, LogLevel, LoggingConfig, UpdaterConfig, ValidationError};
pub use host::{
    FilesError, FilesResult, NoticeContent, NoticeHandle, NoticeHost, NoticeKind, NoticeOptions,
    PluginFiles, PluginHost, RemoteSource, SourceError, SourceResult,
};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use metadata::{parse_metadata, parse_metadata_with, ParseMode, PluginMetadata};
pub use paths::{AppDirs, DirsError};
pub use store::{PendingUpdate, PendingUpdateStore, SubscriptionId};

pub const APP_NAME: &str = "plugup";
pub const APP_AUTHOR: &str = "Plugup";
pub const APP_QUALIFIER: &str = "io";
