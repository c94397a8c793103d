use crate::config::is_storable_key;
use crate::{AppState, Effect, ErrorKind, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SettingsLoaded(mut config) => {
            if config.working_dir().is_empty() {
                config.set_working_dir(state.config().working_dir().to_string());
            }
            state.replace_config(config);
            vec![probe_script(&state)]
        }
        Msg::DefaultsLoaded(defaults) => {
            state.set_defaults(defaults);
            Vec::new()
        }
        Msg::ReloadDefaultsClicked(defaults) => {
            state.config_mut().seed_from_defaults(&defaults);
            state.set_defaults(defaults);
            state.push_output(None, "Default parameters updated.");
            Vec::new()
        }
        Msg::SessionRestored(snapshot) => {
            state.restore_session(snapshot);
            Vec::new()
        }
        Msg::DataFileSelected(path) => {
            let path = path.trim();
            if path.is_empty() {
                state.set_data_file(None);
            } else {
                state.push_output(None, format!("Selected file: {path}"));
                state.set_data_file(Some(path.to_string()));
            }
            vec![Effect::PersistSession(state.session_snapshot())]
        }
        Msg::WorkingDirChanged(dir) => {
            if state.is_busy() {
                state.record_error(
                    ErrorKind::Busy,
                    "The working directory cannot change while ezCon is running.",
                );
                return (state, Vec::new());
            }
            state.config_mut().set_working_dir(dir);
            let message = format!("Working directory changed to: {}", state.config().working_dir());
            state.push_output(None, message);
            vec![probe_script(&state)]
        }
        Msg::ScriptProbed { found } => {
            state.set_script_found(found);
            Vec::new()
        }
        Msg::OptionValueChanged { key, value } => {
            if is_storable_key(&key) {
                state.config_mut().set_value(&key, &value);
            } else {
                reject_key(&mut state, &key);
            }
            Vec::new()
        }
        Msg::OptionToggled { key, enabled } => {
            if is_storable_key(&key) {
                state.config_mut().set_enabled(&key, enabled);
            } else {
                reject_key(&mut state, &key);
            }
            Vec::new()
        }
        Msg::ResetOptionsClicked => {
            state.config_mut().reset();
            Vec::new()
        }
        Msg::FolderStyleChanged(style) => {
            state.set_folder_style(style);
            vec![Effect::PersistSession(state.session_snapshot())]
        }
        Msg::StreamFilterChanged { channel, visible } => {
            state.set_stream_visible(channel, visible);
            Vec::new()
        }
        Msg::SaveSettingsClicked { path } => vec![Effect::SaveSettings {
            path,
            snapshot: state.config().clone(),
        }],
        Msg::SettingsSaved { path } => {
            state.mark_saved();
            state.push_output(None, format!("Settings saved to {path}"));
            Vec::new()
        }
        Msg::RunClicked => start_run(&mut state),
        Msg::CancelClicked => match state.active_run_id() {
            Some(run_id) => vec![Effect::CancelRun { run_id }],
            None => Vec::new(),
        },
        Msg::ClearOutputClicked => {
            state.clear_output();
            Vec::new()
        }
        Msg::RunStateChanged { run_id, state: run_state } => {
            if state.is_current_run(run_id) {
                state.apply_run_state(run_state);
            }
            Vec::new()
        }
        Msg::OutputLine {
            run_id,
            channel,
            text,
        } => {
            if state.is_current_run(run_id) {
                state.push_output(Some(channel), text);
            }
            Vec::new()
        }
        Msg::RunCompleted {
            run_id,
            exit_code,
            output_dir,
            relocated,
        } => {
            if !state.is_current_run(run_id) {
                return (state, Vec::new());
            }
            state.push_output(None, format!("Process finished with return code: {exit_code}"));
            if exit_code == 0 && output_dir.is_some() {
                state.push_output(None, format!("Moved files: {}", relocated.join(", ")));
            }
            let refresh = match &output_dir {
                Some(dir) if exit_code == 0 => Some(dir.clone()),
                _ => None,
            };
            state.apply_completion(exit_code, output_dir, relocated);
            let mut effects = vec![Effect::PersistSession(state.session_snapshot())];
            if let Some(output_dir) = refresh {
                effects.push(Effect::RefreshArtifacts { output_dir });
            }
            effects
        }
        Msg::ErrorReported {
            run_id,
            kind,
            message,
        } => {
            let stale = run_id.is_some_and(|id| !state.is_current_run(id));
            if !stale {
                state.push_output(None, format!("{kind}: {message}"));
                state.record_error(kind, message);
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_run(state: &mut AppState) -> Vec<Effect> {
    if state.is_busy() {
        state.record_error(ErrorKind::Busy, "ezCon is already running.");
        return Vec::new();
    }
    let Some(data_file) = state.data_file().map(ToOwned::to_owned) else {
        state.record_error(ErrorKind::InvalidInput, "Please select a .txt data file first!");
        return Vec::new();
    };
    if state.script_found() == Some(false) {
        let message = format!("Cannot find {} at: {}", state.launcher().script_name, state.script_path());
        state.record_error(ErrorKind::InvalidInput, message);
        return Vec::new();
    }
    let Some(invocation) = state.invocation() else {
        return Vec::new();
    };

    let working_dir = state.config().working_dir().to_string();
    let folder_style = state.folder_style();
    let run_id = state.begin_run();
    state.push_output(None, "Running command:");
    state.push_output(None, format!("  {}", invocation.preview()));
    state.push_output(None, format!("Working directory: {working_dir}"));

    vec![Effect::StartRun {
        run_id,
        invocation,
        working_dir,
        data_file,
        folder_style,
    }]
}

fn probe_script(state: &AppState) -> Effect {
    Effect::ProbeScript {
        script_path: state.script_path(),
    }
}

fn reject_key(state: &mut AppState, key: &str) {
    state.record_error(
        ErrorKind::InvalidInput,
        format!("'{key}' cannot be stored in the settings file."),
    );
}
