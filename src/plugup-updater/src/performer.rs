use crate::error::{UpdateError, UpdateResult};
use futures::future::join_all;
use plugup_core::host::{PluginFiles, RemoteSource};
use plugup_core::metadata::default_config_path;
use plugup_core::{parse_metadata, PendingUpdate, PendingUpdateStore};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Replaces an installed plugin with the version pending in the store.
pub struct UpdatePerformer {
    source: Arc<dyn RemoteSource>,
    files: Arc<dyn PluginFiles>,
    store: Arc<PendingUpdateStore>,
    in_flight: Mutex<HashSet<String>>,
}

impl UpdatePerformer {
    pub fn new(
        source: Arc<dyn RemoteSource>,
        files: Arc<dyn PluginFiles>,
        store: Arc<PendingUpdateStore>,
    ) -> Self {
        Self {
            source,
            files,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Fetches the plugin again, moves its config if the new header relocates
    /// it, writes the new file and removes the old one if its path changed.
    ///
    /// Returns false without touching disk or network when nothing is pending
    /// or another update of the same plugin is running. On failure the pending
    /// entry stays so the user can retry; steps already done are not undone.
    pub async fn apply_update(&self, plugin_name: &str) -> bool {
        let Some(_claim) = InFlight::claim(&self.in_flight, plugin_name) else {
            tracing::debug!(plugin = %plugin_name, "update already in progress");
            return false;
        };
        let Some(pending) = self.store.get(plugin_name) else {
            return false;
        };

        match self.replace_plugin(&pending).await {
            Ok(()) => {
                self.store.remove(plugin_name);
                tracing::info!(
                    plugin = %plugin_name,
                    version = pending.remote_version().unwrap_or_default(),
                    "plugin updated"
                );
                true
            }
            Err(err) => {
                tracing::error!(plugin = %plugin_name, error = %err, "error while trying to update");
                false
            }
        }
    }

    /// Applies several updates concurrently; returns how many succeeded.
    pub async fn apply_all(&self, plugin_names: &[String]) -> usize {
        join_all(plugin_names.iter().map(|name| self.apply_update(name)))
            .await
            .into_iter()
            .filter(|applied| *applied)
            .count()
    }

    async fn replace_plugin(&self, pending: &PendingUpdate) -> UpdateResult<()> {
        let current = &pending.current_metadata;
        let update_url = current
            .update_url()
            .ok_or(UpdateError::MissingField { field: "updateUrl" })?;
        let current_file = current
            .filename
            .as_deref()
            .ok_or(UpdateError::MissingField { field: "filename" })?;
        let current_config = current
            .config_path_or_default()
            .ok_or(UpdateError::MissingField { field: "name" })?;

        let content = self.source.fetch_text(update_url).await?;
        let incoming = parse_metadata(&content).ok_or(UpdateError::MissingHeader)?;
        let incoming_name = incoming.name().ok_or(UpdateError::MissingName)?;

        let target_config = self.files.resolve(
            &incoming
                .config_path()
                .map(str::to_owned)
                .unwrap_or_else(|| default_config_path(incoming_name)),
        );
        let current_config = self.files.resolve(&current_config);
        if target_config != current_config {
            self.files.rename_file(&current_config, &target_config)?;
        }

        let target_plugin = self
            .files
            .resolve(&incoming.plugin_path_or_default().ok_or(UpdateError::MissingName)?);
        self.files.write_file(&target_plugin, &content)?;

        let current_plugin = self.files.resolve(current_file);
        if target_plugin != current_plugin {
            self.files.delete_file(&current_plugin)?;
        }
        Ok(())
    }
}

/// Marks a plugin as being updated until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    name: String,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<String>>, name: &str) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
        inserted.then(|| Self {
            set,
            name: name.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.name);
    }
}
