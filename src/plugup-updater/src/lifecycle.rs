use crate::checker::Updater;
use crate::notice::UpdateNotice;
use crate::performer::UpdatePerformer;
use crate::scheduler::{Scheduler, SchedulerHandle};
use plugup_core::host::{NoticeHost, PluginFiles, PluginHost, RemoteSource};
use plugup_core::{PendingUpdateStore, SubscriptionId, UpdaterConfig};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything the updater needs from the host application.
#[derive(Clone)]
pub struct Collaborators {
    pub host: Arc<dyn PluginHost>,
    pub source: Arc<dyn RemoteSource>,
    pub files: Arc<dyn PluginFiles>,
    pub notices: Arc<dyn NoticeHost>,
}

/// The component a host embeds: `start()` on load, `stop()` on unload.
pub struct PluginUpdater {
    store: Arc<PendingUpdateStore>,
    updater: Arc<Updater>,
    performer: Arc<UpdatePerformer>,
    notice: Arc<UpdateNotice>,
    scheduler: Scheduler,
    subscription: SubscriptionId,
    running: Mutex<Option<SchedulerHandle>>,
}

impl PluginUpdater {
    pub fn new(collaborators: Collaborators, config: &UpdaterConfig) -> Self {
        let Collaborators {
            host,
            source,
            files,
            notices,
        } = collaborators;

        let store = Arc::new(PendingUpdateStore::new());
        let updater = Arc::new(Updater::new(Arc::clone(&source), Arc::clone(&store)));
        let performer = Arc::new(UpdatePerformer::new(source, files, Arc::clone(&store)));
        let notice = Arc::new(UpdateNotice::new(
            notices,
            Arc::clone(&performer),
            Arc::clone(&store),
        ));
        let subscription = notice.attach();
        let scheduler = Scheduler::new(Arc::clone(&updater), host, config.check_interval());

        Self {
            store,
            updater,
            performer,
            notice,
            scheduler,
            subscription,
            running: Mutex::new(None),
        }
    }

    /// Checks all plugins now and then on every interval. Calling it again
    /// while running does nothing.
    pub fn start(&self) {
        let mut running = self.running();
        if running.is_some() {
            return;
        }
        *running = Some(self.scheduler.start());
        tracing::info!(
            interval_secs = self.scheduler.period().as_secs(),
            "plugin updater started"
        );
    }

    /// Cancels future sweeps. Checks and updates already underway finish.
    pub fn stop(&self) {
        if let Some(handle) = self.running().take() {
            handle.stop();
            tracing::info!("plugin updater stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running()
            .as_ref()
            .is_some_and(SchedulerHandle::is_running)
    }

    pub fn store(&self) -> &Arc<PendingUpdateStore> {
        &self.store
    }

    pub fn updater(&self) -> &Arc<Updater> {
        &self.updater
    }

    pub fn performer(&self) -> &Arc<UpdatePerformer> {
        &self.performer
    }

    pub fn notice(&self) -> &Arc<UpdateNotice> {
        &self.notice
    }

    fn running(&self) -> MutexGuard<'_, Option<SchedulerHandle>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PluginUpdater {
    fn drop(&mut self) {
        self.stop();
        self.store.unsubscribe(self.subscription);
    }
}
