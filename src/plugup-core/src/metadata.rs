//! Plugin header metadata.
//!
//! Plugins describe themselves in a leading doc comment:
//!
//! ```text
//! /**
//!  * @name Foo
//!  * @version 1.0.0
//!  * @updateUrl https://example.com/Foo.plugin.js
//!  */
//! ```
//!
//! Each `@field value` line opens a field; any other line is appended to the
//! field above it, separated by a newline.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const FIELD_NAME: &str = "name";
pub const FIELD_VERSION: &str = "version";
pub const FIELD_UPDATE_URL: &str = "updateUrl";
pub const FIELD_PLUGIN_PATH: &str = "pluginPath";
pub const FIELD_CONFIG_PATH: &str = "configPath";

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*\s*\n.*?\*/").expect("valid header comment regex"));
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([A-Za-z0-9_]+)\s+(.*)$").expect("valid header field regex")
});

/// Key/value metadata parsed from a plugin header.
///
/// Unknown fields are kept as-is. `filename` is the plugin's current file on
/// disk and is filled in by the host, never by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl PluginMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns a field value, treating an empty value as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.get(FIELD_NAME)
    }

    pub fn version(&self) -> Option<&str> {
        self.get(FIELD_VERSION)
    }

    pub fn update_url(&self) -> Option<&str> {
        self.get(FIELD_UPDATE_URL)
    }

    pub fn plugin_path(&self) -> Option<&str> {
        self.get(FIELD_PLUGIN_PATH)
    }

    pub fn config_path(&self) -> Option<&str> {
        self.get(FIELD_CONFIG_PATH)
    }

    /// Declared plugin file path, or `<name>.plugin.js`.
    pub fn plugin_path_or_default(&self) -> Option<String> {
        self.plugin_path()
            .map(str::to_owned)
            .or_else(|| self.name().map(default_plugin_path))
    }

    /// Declared config file path, or `<name>.config.json`.
    pub fn config_path_or_default(&self) -> Option<String> {
        self.config_path()
            .map(str::to_owned)
            .or_else(|| self.name().map(default_config_path))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn default_plugin_path(name: &str) -> String {
    format!("{name}.plugin.js")
}

pub fn default_config_path(name: &str) -> String {
    format!("{name}.config.json")
}

/// Where the header comment has to sit in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// The header must start at the first byte.
    #[default]
    Strict,
    /// The first header-shaped comment anywhere in the document is used.
    Lenient,
}

/// Parses the header of `content` in strict mode.
pub fn parse_metadata(content: &str) -> Option<PluginMetadata> {
    parse_metadata_with(content, ParseMode::Strict)
}

/// Returns `None` when no header comment is found (or, in strict mode, when it
/// does not open the document). An empty header yields empty metadata.
pub fn parse_metadata_with(content: &str, mode: ParseMode) -> Option<PluginMetadata> {
    let header = HEADER_RE.find(content)?;
    if mode == ParseMode::Strict && header.start() != 0 {
        return None;
    }

    let body = header.as_str();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    // The preamble before the first field is collected under "" and dropped.
    let mut fields: Vec<(String, String)> = vec![(String::new(), String::new())];
    for raw in body.split('\n') {
        let line = strip_star(raw.strip_suffix('\r').unwrap_or(raw));
        if let Some(caps) = FIELD_RE.captures(line) {
            let key = caps[1].to_string();
            let value = caps[2].to_string();
            fields.retain(|(existing, _)| *existing != key);
            fields.push((key, value));
        } else if let Some((_, value)) = fields.last_mut() {
            value.push('\n');
            value.push_str(line);
        }
    }

    let mut metadata = PluginMetadata::new();
    for (key, value) in fields {
        if key.is_empty() {
            continue;
        }
        metadata.insert(key, value.trim_end());
    }
    Some(metadata)
}

fn strip_star(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix(" * ") {
        rest
    } else if line == " *" {
        ""
    } else {
        line
    }
}
