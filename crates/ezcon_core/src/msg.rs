use crate::{
    ConfigSnapshot, DefaultsCatalog, ErrorKind, FolderStyle, RunId, RunState, SessionSnapshot,
    StreamChannel,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Settings file was read (or defaulted) at startup or on user request.
    SettingsLoaded(ConfigSnapshot),
    /// Defaults file was read; only refreshes the read-only display fields.
    DefaultsLoaded(DefaultsCatalog),
    /// User asked to reseed every option from the defaults file.
    ReloadDefaultsClicked(DefaultsCatalog),
    /// Restore launcher state persisted by a previous session.
    SessionRestored(SessionSnapshot),
    /// User picked a data file.
    DataFileSelected(String),
    /// User changed the working directory.
    WorkingDirChanged(String),
    /// Result of checking whether the target script exists.
    ScriptProbed { found: bool },
    /// User edited an option value.
    OptionValueChanged { key: String, value: String },
    /// User toggled an option's checkbox.
    OptionToggled { key: String, enabled: bool },
    /// User cleared all options.
    ResetOptionsClicked,
    FolderStyleChanged(FolderStyle),
    StreamFilterChanged { channel: StreamChannel, visible: bool },
    /// Save to the default settings file, or to `path` for "save as".
    SaveSettingsClicked { path: Option<String> },
    SettingsSaved { path: String },
    RunClicked,
    CancelClicked,
    ClearOutputClicked,
    /// Engine lifecycle transition for a run.
    RunStateChanged { run_id: RunId, state: RunState },
    /// Engine captured a line from the child.
    OutputLine {
        run_id: RunId,
        channel: StreamChannel,
        text: String,
    },
    /// Engine finished a run that produced an exit code.
    RunCompleted {
        run_id: RunId,
        exit_code: i32,
        output_dir: Option<String>,
        relocated: Vec<String>,
    },
    /// Any error surfaced by the engine or the platform layer.
    ErrorReported {
        run_id: Option<RunId>,
        kind: ErrorKind,
        message: String,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
