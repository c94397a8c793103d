use std::collections::VecDeque;
use std::path::Path;

use crate::catalog::{find_option, DISPLAY_FIELDS};
use crate::command::{build_invocation, primary_argument_for, BaseInvocation, Invocation};
use crate::config::ConfigSnapshot;
use crate::defaults::DefaultsCatalog;
use crate::run::{ErrorKind, FolderStyle, RunId, RunState, StreamChannel};
use crate::view_model::{AppViewModel, DisplayFieldView, ErrorView, OptionRowView, OutputLineView};

/// Oldest lines are dropped once the log holds this many.
pub const MAX_OUTPUT_LINES: usize = 5_000;
pub const DEFAULT_SCRIPT_NAME: &str = "ezCon.py";

pub const PREVIEW_NO_FILE: &str = "No file selected.";

/// Which interpreter runs which script. Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    pub interpreter: String,
    pub script_name: String,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter().to_string(),
            script_name: DEFAULT_SCRIPT_NAME.to_string(),
        }
    }
}

pub fn default_interpreter() -> &'static str {
    if cfg!(windows) {
        "py"
    } else {
        "python3"
    }
}

/// Launcher state worth restoring on the next start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub data_file: Option<String>,
    pub folder_style: FolderStyle,
    pub last_output_dir: Option<String>,
}

/// One captured line; `channel` is `None` for the launcher's own notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub seq: u64,
    pub channel: Option<StreamChannel>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    launcher: LauncherSettings,
    config: ConfigSnapshot,
    defaults: DefaultsCatalog,
    data_file: Option<String>,
    folder_style: FolderStyle,
    script_found: Option<bool>,
    run_state: RunState,
    active_run: Option<RunId>,
    next_run_id: RunId,
    output: VecDeque<OutputLine>,
    next_seq: u64,
    show_stdout: bool,
    show_stderr: bool,
    last_exit_code: Option<i32>,
    last_output_dir: Option<String>,
    last_relocated: Vec<String>,
    last_error: Option<(ErrorKind, String)>,
    unsaved_changes: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_launcher(LauncherSettings::default())
    }

    pub fn with_launcher(launcher: LauncherSettings) -> Self {
        Self {
            launcher,
            next_run_id: 1,
            show_stdout: true,
            show_stderr: true,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let output = self.output_since(0).collect();

        let options = self
            .config
            .catalog_entries()
            .filter_map(|(key, option)| {
                find_option(key).map(|spec| OptionRowView {
                    key: spec.key,
                    label: spec.label,
                    help: spec.help,
                    group: spec.group,
                    value: option.value.clone(),
                    enabled: option.enabled,
                })
            })
            .collect();

        let display_fields = DISPLAY_FIELDS
            .iter()
            .map(|field| DisplayFieldView {
                key: field.key,
                label: field.label,
                value: self.defaults.get(field.key).unwrap_or("").to_string(),
            })
            .collect();

        AppViewModel {
            run_state: self.run_state,
            busy: self.is_busy(),
            working_dir: self.config.working_dir().to_string(),
            data_file: self.data_file.clone(),
            folder_style: self.folder_style,
            command_preview: self.command_preview(),
            options,
            extra_option_count: self.config.extra_entries().count(),
            display_fields,
            output,
            show_stdout: self.show_stdout,
            show_stderr: self.show_stderr,
            last_exit_code: self.last_exit_code,
            last_output_dir: self.last_output_dir.clone(),
            last_relocated: self.last_relocated.clone(),
            last_error: self.last_error.as_ref().map(|(kind, message)| ErrorView {
                kind: *kind,
                message: message.clone(),
            }),
            unsaved_changes: self.unsaved_changes,
            dirty: self.dirty,
        }
    }

    /// Visible log lines with `seq >= from`, oldest first.
    ///
    /// Costs only the lines returned, so a renderer can follow the log
    /// without building a full view per message.
    pub fn output_since(&self, from: u64) -> impl Iterator<Item = OutputLineView> + '_ {
        let start = self.output.partition_point(|line| line.seq < from);
        self.output
            .range(start..)
            .filter(|line| self.is_visible(line.channel))
            .map(|line| OutputLineView {
                seq: line.seq,
                channel: line.channel,
                text: line.text.clone(),
            })
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn launcher(&self) -> &LauncherSettings {
        &self.launcher
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_busy(&self) -> bool {
        self.active_run.is_some()
    }

    pub fn active_run_id(&self) -> Option<RunId> {
        self.active_run
    }

    pub fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            data_file: self.data_file.clone(),
            folder_style: self.folder_style,
            last_output_dir: self.last_output_dir.clone(),
        }
    }

    /// Path of the target script inside the working directory.
    pub fn script_path(&self) -> String {
        Path::new(self.config.working_dir())
            .join(&self.launcher.script_name)
            .display()
            .to_string()
    }

    /// Invocation for the selected data file, from the current snapshot.
    pub fn invocation(&self) -> Option<Invocation> {
        let data_file = self.data_file.as_deref()?;
        let base = BaseInvocation::new(self.launcher.interpreter.clone(), self.script_path());
        let primary =
            primary_argument_for(Path::new(self.config.working_dir()), Path::new(data_file));
        Some(build_invocation(&base, &primary, &self.config))
    }

    pub fn command_preview(&self) -> String {
        if self.data_file.is_none() {
            return PREVIEW_NO_FILE.to_string();
        }
        if self.script_found == Some(false) {
            return format!("{} not found.", self.launcher.script_name);
        }
        self.invocation()
            .map(|invocation| invocation.preview())
            .unwrap_or_else(|| PREVIEW_NO_FILE.to_string())
    }

    pub(crate) fn data_file(&self) -> Option<&str> {
        self.data_file.as_deref()
    }

    pub(crate) fn folder_style(&self) -> FolderStyle {
        self.folder_style
    }

    pub(crate) fn script_found(&self) -> Option<bool> {
        self.script_found
    }

    pub(crate) fn replace_config(&mut self, config: ConfigSnapshot) {
        self.config = config;
        self.unsaved_changes = false;
        self.dirty = true;
    }

    pub(crate) fn config_mut(&mut self) -> &mut ConfigSnapshot {
        self.unsaved_changes = true;
        self.dirty = true;
        &mut self.config
    }

    pub(crate) fn mark_saved(&mut self) {
        self.unsaved_changes = false;
        self.dirty = true;
    }

    pub(crate) fn set_defaults(&mut self, defaults: DefaultsCatalog) {
        self.defaults = defaults;
        self.dirty = true;
    }

    pub(crate) fn set_data_file(&mut self, data_file: Option<String>) {
        self.data_file = data_file;
        self.dirty = true;
    }

    pub(crate) fn set_folder_style(&mut self, style: FolderStyle) {
        self.folder_style = style;
        self.dirty = true;
    }

    pub(crate) fn set_script_found(&mut self, found: bool) {
        self.script_found = Some(found);
        self.dirty = true;
    }

    pub(crate) fn set_stream_visible(&mut self, channel: StreamChannel, visible: bool) {
        match channel {
            StreamChannel::Stdout => self.show_stdout = visible,
            StreamChannel::Stderr => self.show_stderr = visible,
        }
        self.dirty = true;
    }

    pub(crate) fn restore_session(&mut self, snapshot: SessionSnapshot) {
        self.data_file = snapshot.data_file;
        self.folder_style = snapshot.folder_style;
        self.last_output_dir = snapshot.last_output_dir;
        self.dirty = true;
    }

    /// Marks a new run as started and returns its id.
    pub(crate) fn begin_run(&mut self) -> RunId {
        let run_id = self.next_run_id;
        self.next_run_id += 1;
        self.active_run = Some(run_id);
        self.run_state = RunState::Starting;
        self.last_exit_code = None;
        self.last_relocated.clear();
        self.last_error = None;
        self.dirty = true;
        run_id
    }

    pub(crate) fn is_current_run(&self, run_id: RunId) -> bool {
        self.active_run_id() == Some(run_id)
    }

    pub(crate) fn apply_run_state(&mut self, state: RunState) {
        self.run_state = state;
        if state.is_terminal() {
            self.active_run = None;
        }
        self.dirty = true;
    }

    pub(crate) fn apply_completion(
        &mut self,
        exit_code: i32,
        output_dir: Option<String>,
        relocated: Vec<String>,
    ) {
        self.last_exit_code = Some(exit_code);
        if output_dir.is_some() {
            self.last_output_dir = output_dir;
        }
        self.last_relocated = relocated;
        self.dirty = true;
    }

    pub(crate) fn record_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.last_error = Some((kind, message.into()));
        self.dirty = true;
    }

    pub(crate) fn push_output(&mut self, channel: Option<StreamChannel>, text: impl Into<String>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.output.push_back(OutputLine {
            seq,
            channel,
            text: text.into(),
        });
        while self.output.len() > MAX_OUTPUT_LINES {
            self.output.pop_front();
        }
        self.dirty = true;
    }

    pub(crate) fn clear_output(&mut self) {
        self.output.clear();
        self.dirty = true;
    }

    fn is_visible(&self, channel: Option<StreamChannel>) -> bool {
        match channel {
            Some(StreamChannel::Stdout) => self.show_stdout,
            Some(StreamChannel::Stderr) => self.show_stderr,
            None => true,
        }
    }
}
