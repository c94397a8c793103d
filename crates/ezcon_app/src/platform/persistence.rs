use std::fs;
use std::path::Path;

use ezcon_core::{FolderStyle, SessionSnapshot};
use ezcon_engine::write_atomic;
use ezcon_logging::{ezcon_error, ezcon_info, ezcon_warn};
use serde::{Deserialize, Serialize};

pub(crate) const STATE_FILENAME: &str = ".ezcon_gui_state.ron";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
enum PersistedFolderStyle {
    #[default]
    DateFromName,
    DateFromMtime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSession {
    data_file: Option<String>,
    #[serde(default)]
    folder_style: PersistedFolderStyle,
    last_output_dir: Option<String>,
}

impl From<&SessionSnapshot> for PersistedSession {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            data_file: snapshot.data_file.clone(),
            folder_style: match snapshot.folder_style {
                FolderStyle::DateFromName => PersistedFolderStyle::DateFromName,
                FolderStyle::DateFromMtime => PersistedFolderStyle::DateFromMtime,
            },
            last_output_dir: snapshot.last_output_dir.clone(),
        }
    }
}

impl From<PersistedSession> for SessionSnapshot {
    fn from(session: PersistedSession) -> Self {
        Self {
            data_file: session.data_file,
            folder_style: match session.folder_style {
                PersistedFolderStyle::DateFromName => FolderStyle::DateFromName,
                PersistedFolderStyle::DateFromMtime => FolderStyle::DateFromMtime,
            },
            last_output_dir: session.last_output_dir,
        }
    }
}

pub(crate) fn load_session(dir: &Path) -> SessionSnapshot {
    let path = dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return SessionSnapshot::default();
        }
        Err(err) => {
            ezcon_warn!("Failed to read session state from {:?}: {}", path, err);
            return SessionSnapshot::default();
        }
    };

    let session: PersistedSession = match ron::from_str(&content) {
        Ok(session) => session,
        Err(err) => {
            ezcon_warn!("Failed to parse session state from {:?}: {}", path, err);
            return SessionSnapshot::default();
        }
    };

    ezcon_info!("Loaded session state from {:?}", path);
    session.into()
}

pub(crate) fn save_session(dir: &Path, snapshot: &SessionSnapshot) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&PersistedSession::from(snapshot), pretty) {
        Ok(text) => text,
        Err(err) => {
            ezcon_error!("Failed to serialize session state: {}", err);
            return;
        }
    };

    let path = dir.join(STATE_FILENAME);
    if let Err(err) = write_atomic(&path, &content) {
        ezcon_error!("Failed to write session state to {:?}: {}", path, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn session_round_trips() {
        let temp = TempDir::new().unwrap();
        let snapshot = SessionSnapshot {
            data_file: Some("/work/Dish220615_03.txt".to_string()),
            folder_style: FolderStyle::DateFromMtime,
            last_output_dir: Some("/work/EZCONPNG_FILES/15062022".to_string()),
        };

        save_session(temp.path(), &snapshot);
        assert_eq!(load_session(temp.path()), snapshot);
    }

    #[test]
    fn missing_or_corrupt_state_is_default() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_session(temp.path()), SessionSnapshot::default());

        fs::write(temp.path().join(STATE_FILENAME), "not ron at all {").unwrap();
        assert_eq!(load_session(temp.path()), SessionSnapshot::default());
    }
}
