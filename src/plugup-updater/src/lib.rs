//! Keeps installed plugins up to date.
//!
//! The pieces, in the order data flows through them:
//! - [`Scheduler`] sweeps all installed plugins on a fixed interval
//! - [`Updater`] compares each plugin against its remote header and records
//!   newer versions in the [`PendingUpdateStore`](plugup_core::PendingUpdateStore)
//! - [`UpdateNotice`] mirrors the store into a host notice
//! - [`UpdatePerformer`] replaces the plugin once the user confirms
//!
//! [`PluginUpdater`] wires them together behind `start()` / `stop()`.

mod checker;
mod error;
mod lifecycle;
mod notice;
mod performer;
mod scheduler;

pub use checker::Updater;
pub use error::{UpdateError, UpdateResult};
pub use lifecycle::{Collaborators, PluginUpdater};
pub use notice::{UpdateNotice, NOTICE_MESSAGE, UPDATE_ALL_LABEL};
pub use performer::UpdatePerformer;
pub use scheduler::{Scheduler, SchedulerHandle};
