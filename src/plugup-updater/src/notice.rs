use crate::performer::UpdatePerformer;
use plugup_core::host::{NoticeContent, NoticeHandle, NoticeHost, NoticeKind, NoticeOptions};
use plugup_core::{PendingUpdate, PendingUpdateStore, SubscriptionId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const NOTICE_MESSAGE: &str = "The following plugins have updates: ";
pub const UPDATE_ALL_LABEL: &str = "Update All";

#[derive(Default)]
struct NoticeState {
    handle: Option<Box<dyn NoticeHandle>>,
    plugins: Vec<String>,
}

/// Keeps a single host notice in sync with the pending updates.
///
/// The notice appears when the first update is found, lists every outdated
/// plugin and disappears once nothing is pending.
pub struct UpdateNotice {
    notices: Arc<dyn NoticeHost>,
    performer: Arc<UpdatePerformer>,
    store: Arc<PendingUpdateStore>,
    state: Mutex<NoticeState>,
}

impl UpdateNotice {
    pub fn new(
        notices: Arc<dyn NoticeHost>,
        performer: Arc<UpdatePerformer>,
        store: Arc<PendingUpdateStore>,
    ) -> Self {
        Self {
            notices,
            performer,
            store,
            state: Mutex::new(NoticeState::default()),
        }
    }

    /// Subscribes to the store. The subscription holds only a weak reference.
    pub fn attach(self: &Arc<Self>) -> SubscriptionId {
        let notice = Arc::downgrade(self);
        self.store.subscribe(move |pending| {
            if let Some(notice) = notice.upgrade() {
                notice.render(pending);
            }
        })
    }

    pub fn render(&self, pending: &[PendingUpdate]) {
        let plugins: Vec<String> = pending.iter().map(|update| update.name.clone()).collect();
        let mut state = self.state();
        let shown = state.handle.as_ref().is_some_and(|handle| handle.is_shown());

        if plugins.is_empty() {
            if let Some(mut handle) = state.handle.take() {
                if shown {
                    handle.close();
                }
            }
            state.plugins.clear();
            return;
        }

        if !shown {
            let content = NoticeContent {
                message: NOTICE_MESSAGE.to_string(),
                plugins: plugins.clone(),
                buttons: vec![UPDATE_ALL_LABEL.to_string()],
            };
            let options = NoticeOptions {
                kind: NoticeKind::Info,
                timeout: None,
            };
            state.handle = Some(self.notices.show_notice(&content, &options));
        }
        if let Some(handle) = state.handle.as_mut() {
            handle.set_plugins(&plugins);
        }
        state.plugins = plugins;
    }

    /// Plugins currently listed in the notice.
    pub fn listed_plugins(&self) -> Vec<String> {
        self.state().plugins.clone()
    }

    pub fn is_shown(&self) -> bool {
        self.state()
            .handle
            .as_ref()
            .is_some_and(|handle| handle.is_shown())
    }

    /// "Update All": closes the notice and updates every listed plugin.
    /// Plugins that fail to update bring the notice back.
    pub async fn update_all(&self) -> usize {
        let plugins = {
            let mut state = self.state();
            if let Some(mut handle) = state.handle.take() {
                handle.close();
            }
            state.plugins.clone()
        };
        let applied = self.performer.apply_all(&plugins).await;

        // failed applies leave the store unchanged and emit nothing
        let pending = self.store.get_all();
        if !pending.is_empty() {
            self.render(&pending);
        }
        applied
    }

    /// A click on a single plugin name.
    pub async fn update_plugin(&self, plugin_name: &str) -> bool {
        self.performer.apply_update(plugin_name).await
    }

    fn state(&self) -> MutexGuard<'_, NoticeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
