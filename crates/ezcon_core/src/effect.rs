use crate::{ConfigSnapshot, FolderStyle, Invocation, RunId, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Launch `invocation`, built from the configuration as it was when Run was clicked.
    StartRun {
        run_id: RunId,
        invocation: Invocation,
        working_dir: String,
        data_file: String,
        folder_style: FolderStyle,
    },
    CancelRun { run_id: RunId },
    SaveSettings {
        path: Option<String>,
        snapshot: ConfigSnapshot,
    },
    ProbeScript { script_path: String },
    PersistSession(SessionSnapshot),
    /// Derived views (thumbnails) should be rebuilt from `output_dir`.
    RefreshArtifacts { output_dir: String },
}
