use crate::error::UpdateResult;
use futures::future::join_all;
use plugup_core::host::RemoteSource;
use plugup_core::{parse_metadata, semver, PendingUpdateStore, PluginMetadata};
use std::sync::Arc;

/// Compares installed plugins against their remote headers.
pub struct Updater {
    source: Arc<dyn RemoteSource>,
    store: Arc<PendingUpdateStore>,
}

impl Updater {
    pub fn new(source: Arc<dyn RemoteSource>, store: Arc<PendingUpdateStore>) -> Self {
        Self { source, store }
    }

    /// Returns true when the remote copy carries a strictly newer valid
    /// version; that version is then pending in the store. Plugins without a
    /// name, a valid version or an update url are skipped. Failures are
    /// logged and count as "no update".
    pub async fn check_for_update(&self, metadata: &PluginMetadata) -> bool {
        let (Some(name), Some(current_version), Some(update_url)) =
            (metadata.name(), metadata.version(), metadata.update_url())
        else {
            tracing::trace!(filename = ?metadata.filename, "plugin is not updatable");
            return false;
        };
        if !semver::is_valid(current_version) {
            tracing::debug!(plugin = %name, version = %current_version, "skipping plugin with invalid version");
            return false;
        }

        tracing::debug!(plugin = %name, version = %current_version, "checking for updates");
        let remote = match self.fetch_metadata(update_url).await {
            Ok(remote) => remote,
            Err(err) => {
                tracing::error!(
                    plugin = %name,
                    version = %current_version,
                    error = %err,
                    "failed to check for updates"
                );
                return false;
            }
        };

        let Some(remote) = remote else {
            tracing::debug!(plugin = %name, url = %update_url, "remote plugin has no metadata header");
            return false;
        };
        let newer = remote
            .version()
            .filter(|remote_version| semver::is_valid(remote_version))
            .filter(|remote_version| semver::greater_than(remote_version, current_version))
            .map(str::to_owned);
        let Some(remote_version) = newer else {
            return false;
        };

        tracing::debug!(
            plugin = %name,
            from = %current_version,
            to = %remote_version,
            "found update"
        );
        self.store.add(name, metadata.clone(), remote);
        true
    }

    /// Checks every plugin concurrently; one failing check never affects the
    /// others. Returns how many plugins have a newer version.
    pub async fn check_all(&self, plugins: &[PluginMetadata]) -> usize {
        join_all(plugins.iter().map(|plugin| self.check_for_update(plugin)))
            .await
            .into_iter()
            .filter(|found| *found)
            .count()
    }

    async fn fetch_metadata(&self, url: &str) -> UpdateResult<Option<PluginMetadata>> {
        let text = self.source.fetch_text(url).await?;
        Ok(parse_metadata(&text))
    }
}
