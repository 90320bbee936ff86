use crate::checker::Updater;
use plugup_core::host::PluginHost;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodic driver for full sweeps over the installed plugins.
#[derive(Clone)]
pub struct Scheduler {
    updater: Arc<Updater>,
    host: Arc<dyn PluginHost>,
    period: Duration,
}

impl Scheduler {
    pub fn new(updater: Arc<Updater>, host: Arc<dyn PluginHost>, period: Duration) -> Self {
        Self {
            updater,
            host,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sweeps once right away and then every `period`. Must be called from
    /// within a tokio runtime.
    pub fn start(&self) -> SchedulerHandle {
        let scheduler = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scheduler.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                scheduler.sweep();
            }
        });
        tracing::debug!(period_secs = self.period.as_secs(), "update scheduler started");
        SchedulerHandle { task }
    }

    /// Spawns one independent check per installed plugin. The checks outlive
    /// the scheduler: stopping it never cancels them.
    ///
    /// Unlike [`Updater::check_all`], which polls every check inside the
    /// caller's task, each check here is its own task, so a panic or a hung
    /// remote in one plugin leaves the others running.
    pub fn sweep(&self) -> Vec<JoinHandle<bool>> {
        let plugins = self.host.list_installed_plugins();
        tracing::debug!(plugins = plugins.len(), "checking installed plugins for updates");
        plugins
            .into_iter()
            .map(|plugin| {
                let updater = Arc::clone(&self.updater);
                tokio::spawn(async move { updater.check_for_update(&plugin).await })
            })
            .collect()
    }
}

/// Running timer; dropping it stops future sweeps.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("update scheduler stopped");
    }
}
