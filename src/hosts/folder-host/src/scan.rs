use plugup_core::{parse_metadata, PluginMetadata};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub const PLUGIN_SUFFIX: &str = ".plugin.js";

/// Reads the header of every `*.plugin.js` directly inside `root`, sorted by
/// file name. Files without a header are skipped.
pub fn scan_plugins(root: &Path) -> Result<Vec<PluginMetadata>, walkdir::Error> {
    let mut plugins = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !file_name.ends_with(PLUGIN_SUFFIX) {
            continue;
        }

        let content = match fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(file = file_name, error = %err, "failed to read plugin");
                continue;
            }
        };
        match parse_metadata(&content) {
            Some(metadata) => plugins.push(metadata.with_filename(file_name)),
            None => tracing::debug!(file = file_name, "plugin has no metadata header"),
        }
    }
    Ok(plugins)
}
