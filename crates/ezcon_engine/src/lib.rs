//! ezCon engine: settings and defaults files, process supervision and
//! artifact collection.
mod artifacts;
mod defaults;
mod engine;
mod error;
mod persist;
mod session;
mod settings;
mod supervisor;
mod types;

pub use artifacts::{
    collect, date_run_in_name, output_directory, output_folder_name, resolve_output_directory,
    CollectReport, ARTIFACT_EXTENSION, OUTPUT_ROOT_DIR, UNKNOWN_DATE_FOLDER,
};
pub use defaults::{load_defaults_catalog, DEFAULTS_FILE_NAME};
pub use engine::{ChannelObserver, EngineHandle};
pub use error::{ArtifactError, PersistError, SettingsError, SupervisorError};
pub use persist::{ensure_dir, write_atomic};
pub use session::{run_session, start_session, ActiveSession, RunReport, SessionError};
pub use settings::{
    load_settings, parse_settings, read_settings, render_settings, save_settings,
    SETTINGS_FILE_NAME,
};
pub use supervisor::{ProcessSupervisor, RunCanceller, RunHandle, RunObserver};
pub use types::{EngineEvent, RunRequest};
