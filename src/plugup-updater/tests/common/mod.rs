#![allow(dead_code)]

use async_trait::async_trait;
use folder_host::PluginFolder;
use plugup_core::host::{
    FilesResult, NoticeContent, NoticeHandle, NoticeHost, NoticeOptions, PluginFiles, PluginHost,
    RemoteSource, SourceError, SourceResult,
};
use plugup_core::metadata::{FIELD_NAME, FIELD_UPDATE_URL, FIELD_VERSION};
use plugup_core::PluginMetadata;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn header(fields: &[(&str, &str)]) -> String {
    let mut text = String::from("/**\n");
    for (key, value) in fields {
        text.push_str(&format!(" * @{key} {value}\n"));
    }
    text.push_str(" */\nmodule.exports = class {};\n");
    text
}

pub fn url_for(name: &str) -> String {
    format!("https://plugins.example/{name}.plugin.js")
}

pub fn installed(name: &str, version: &str) -> PluginMetadata {
    PluginMetadata::new()
        .with_field(FIELD_NAME, name)
        .with_field(FIELD_VERSION, version)
        .with_field(FIELD_UPDATE_URL, url_for(name))
        .with_filename(format!("{name}.plugin.js"))
}

/// In-memory remote: url -> body or http status.
#[derive(Default)]
pub struct FakeSource {
    responses: Mutex<HashMap<String, Result<String, u16>>>,
    calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl FakeSource {
    pub fn serve(&self, url: &str, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.into()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
    }

    /// Makes every fetch wait before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for FakeSource {
    async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.responses.lock().unwrap().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(SourceError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(SourceError::Network {
                url: url.to_string(),
                message: "connection refused".into(),
            }),
        }
    }
}

/// A real plugins folder that also records every mutating call.
pub struct RecordingFiles {
    pub folder: PluginFolder,
    ops: Mutex<Vec<String>>,
}

impl RecordingFiles {
    pub fn new(folder: PluginFolder) -> Self {
        Self {
            folder,
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: &str, path: &Path) {
        let relative = path.strip_prefix(self.folder.root()).unwrap_or(path);
        self.ops
            .lock()
            .unwrap()
            .push(format!("{op} {}", relative.display()));
    }
}

impl PluginFiles for RecordingFiles {
    fn plugins_folder(&self) -> &Path {
        self.folder.root()
    }

    fn write_file(&self, path: &Path, content: &str) -> FilesResult<()> {
        self.record("write", path);
        self.folder.write_file(path, content)
    }

    fn rename_file(&self, from: &Path, to: &Path) -> FilesResult<()> {
        self.record("rename", from);
        self.folder.rename_file(from, to)
    }

    fn delete_file(&self, path: &Path) -> FilesResult<()> {
        self.record("delete", path);
        self.folder.delete_file(path)
    }
}

pub struct StaticHost(pub Vec<PluginMetadata>);

impl PluginHost for StaticHost {
    fn list_installed_plugins(&self) -> Vec<PluginMetadata> {
        self.0.clone()
    }
}

#[derive(Debug, Default)]
pub struct NoticeLog {
    pub shows: usize,
    pub closes: usize,
    pub visible: bool,
    pub message: String,
    pub buttons: Vec<String>,
    pub plugins: Vec<String>,
}

#[derive(Default)]
pub struct FakeNotices {
    pub log: Arc<Mutex<NoticeLog>>,
}

impl FakeNotices {
    pub fn snapshot(&self) -> (usize, usize, bool, Vec<String>) {
        let log = self.log.lock().unwrap();
        (log.shows, log.closes, log.visible, log.plugins.clone())
    }

    /// Simulates the user dismissing the notice from the host UI.
    pub fn dismiss(&self) {
        self.log.lock().unwrap().visible = false;
    }
}

impl NoticeHost for FakeNotices {
    fn show_notice(&self, content: &NoticeContent, _options: &NoticeOptions) -> Box<dyn NoticeHandle> {
        let mut log = self.log.lock().unwrap();
        log.shows += 1;
        log.visible = true;
        log.message = content.message.clone();
        log.buttons = content.buttons.clone();
        log.plugins = content.plugins.clone();
        Box::new(FakeHandle {
            log: Arc::clone(&self.log),
        })
    }
}

struct FakeHandle {
    log: Arc<Mutex<NoticeLog>>,
}

impl NoticeHandle for FakeHandle {
    fn is_shown(&self) -> bool {
        self.log.lock().unwrap().visible
    }

    fn set_plugins(&mut self, plugins: &[String]) {
        self.log.lock().unwrap().plugins = plugins.to_vec();
    }

    fn close(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.closes += 1;
        log.visible = false;
    }
}
