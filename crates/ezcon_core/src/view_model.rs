use crate::{ErrorKind, FolderStyle, OptionGroup, RunState, StreamChannel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRowView {
    pub key: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub group: OptionGroup,
    pub value: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLineView {
    pub seq: u64,
    pub channel: Option<StreamChannel>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub run_state: RunState,
    /// Drives the indeterminate progress indicator.
    pub busy: bool,
    pub working_dir: String,
    pub data_file: Option<String>,
    pub folder_style: FolderStyle,
    pub command_preview: String,
    pub options: Vec<OptionRowView>,
    pub extra_option_count: usize,
    pub display_fields: Vec<DisplayFieldView>,
    pub output: Vec<OutputLineView>,
    pub show_stdout: bool,
    pub show_stderr: bool,
    pub last_exit_code: Option<i32>,
    pub last_output_dir: Option<String>,
    pub last_relocated: Vec<String>,
    pub last_error: Option<ErrorView>,
    pub unsaved_changes: bool,
    pub dirty: bool,
}
