use crate::catalog::{is_catalog_key, OPTION_CATALOG};
use crate::defaults::DefaultsCatalog;

/// Literal settings key holding the working directory.
pub const WORKING_DIR_KEY: &str = "WORKING_DIR";
/// Suffix of the per-option enabled flag in the settings file.
pub const ACTIVE_SUFFIX: &str = "_active";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigOption {
    pub value: String,
    pub enabled: bool,
}

impl ConfigOption {
    /// Tokens this option contributes after its key, empty when it contributes nothing.
    pub fn tokens(&self) -> Vec<&str> {
        if !self.enabled {
            return Vec::new();
        }
        self.value.split_whitespace().collect()
    }
}

/// Ordered key -> option mapping plus the working directory.
///
/// Catalog keys always come first, in catalog order. Keys outside the
/// catalog are kept after them in the order they were first seen, so a
/// settings file written by a newer launcher survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    working_dir: String,
    entries: Vec<(String, ConfigOption)>,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSnapshot {
    pub fn new() -> Self {
        Self {
            working_dir: String::new(),
            entries: OPTION_CATALOG
                .iter()
                .map(|spec| (spec.key.to_string(), ConfigOption::default()))
                .collect(),
        }
    }

    pub fn working_dir(&self) -> &str {
        &self.working_dir
    }

    pub fn set_working_dir(&mut self, dir: impl Into<String>) {
        self.working_dir = normalize_value(&dir.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigOption> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, option)| option)
    }

    /// Sets the value of `key`, adding it after the catalog if unknown.
    ///
    /// Values are stored trimmed and on a single line. Returns false for keys
    /// the settings file cannot represent.
    pub fn set_value(&mut self, key: &str, value: &str) -> bool {
        if !is_storable_key(key) {
            return false;
        }
        self.entry_mut(key).value = normalize_value(value);
        true
    }

    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        if !is_storable_key(key) {
            return false;
        }
        self.entry_mut(key).enabled = enabled;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigOption)> {
        self.entries
            .iter()
            .map(|(key, option)| (key.as_str(), option))
    }

    /// Entries backed by the catalog, in catalog order.
    pub fn catalog_entries(&self) -> impl Iterator<Item = (&str, &ConfigOption)> {
        self.iter().filter(|(key, _)| is_catalog_key(key))
    }

    /// Entries preserved from a settings file but unknown to this launcher.
    pub fn extra_entries(&self) -> impl Iterator<Item = (&str, &ConfigOption)> {
        self.iter().filter(|(key, _)| !is_catalog_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears every option back to empty and disabled, dropping unknown keys.
    pub fn reset(&mut self) {
        let working_dir = std::mem::take(&mut self.working_dir);
        *self = Self::new();
        self.working_dir = working_dir;
    }

    /// Seeds each catalog option from the defaults file and disables it.
    pub fn seed_from_defaults(&mut self, defaults: &DefaultsCatalog) {
        for (key, option) in self.entries.iter_mut() {
            if !is_catalog_key(key) {
                continue;
            }
            option.value = normalize_value(defaults.get(key).unwrap_or(""));
            option.enabled = false;
        }
    }

    fn entry_mut(&mut self, key: &str) -> &mut ConfigOption {
        let index = match self.entries.iter().position(|(existing, _)| existing == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), ConfigOption::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

/// Whether `key` survives a round trip through the `key = value` settings format.
pub fn is_storable_key(key: &str) -> bool {
    !key.is_empty()
        && key != WORKING_DIR_KEY
        && !key.ends_with(ACTIVE_SUFFIX)
        && !key.contains('=')
        && !key.chars().any(char::is_whitespace)
}

fn normalize_value(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
