//! `key = value` settings file shared with earlier launcher versions.
use std::fs;
use std::path::Path;

use ezcon_core::{ConfigSnapshot, ACTIVE_SUFFIX, WORKING_DIR_KEY};
use ezcon_logging::{ezcon_debug, ezcon_info, ezcon_warn};

use crate::error::SettingsError;
use crate::persist::write_atomic;

/// File name of the settings file inside the working directory.
pub const SETTINGS_FILE_NAME: &str = "ezconguiset.txt";

/// Parses settings text on top of a fresh snapshot.
///
/// Lines without `=` and keys the format cannot represent are skipped.
pub fn parse_settings(text: &str) -> ConfigSnapshot {
    let mut snapshot = ConfigSnapshot::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            ezcon_debug!("settings line {} has no '=', skipped", index + 1);
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        let stored = if key == WORKING_DIR_KEY {
            snapshot.set_working_dir(value);
            true
        } else if let Some(option) = key.strip_suffix(ACTIVE_SUFFIX) {
            snapshot.set_enabled(option, is_truthy(value))
        } else {
            snapshot.set_value(key, value)
        };
        if !stored {
            ezcon_warn!("settings line {}: key '{key}' ignored", index + 1);
        }
    }
    snapshot
}

/// Renders `snapshot` in the order it will be read back.
pub fn render_settings(snapshot: &ConfigSnapshot) -> String {
    let mut out = format!("{WORKING_DIR_KEY} = {}\n", snapshot.working_dir());
    for (key, option) in snapshot.iter() {
        out.push_str(&format!("{key} = {}\n", option.value));
        out.push_str(&format!("{key}{ACTIVE_SUFFIX} = {}\n", option.enabled));
    }
    out
}

pub fn read_settings(path: &Path) -> Result<ConfigSnapshot, SettingsError> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_settings(&text))
}

/// Lenient load: a missing or unreadable file yields the empty snapshot.
pub fn load_settings(path: &Path) -> ConfigSnapshot {
    match read_settings(path) {
        Ok(snapshot) => {
            ezcon_info!("Settings loaded from {}", path.display());
            snapshot
        }
        Err(err) => {
            ezcon_warn!("No settings file found or error loading settings: {err}");
            ConfigSnapshot::new()
        }
    }
}

pub fn save_settings(path: &Path, snapshot: &ConfigSnapshot) -> Result<(), SettingsError> {
    write_atomic(path, &render_settings(snapshot)).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    ezcon_info!("Settings saved to {}", path.display());
    Ok(())
}

fn is_truthy(value: &str) -> bool {
    ["true", "1", "yes"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy))
}
