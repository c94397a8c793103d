use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ezcon_core::{Effect, ErrorKind, Msg};
use ezcon_engine::{save_settings, EngineEvent, EngineHandle, RunRequest, ARTIFACT_EXTENSION};
use ezcon_logging::{ezcon_info, ezcon_warn};

use super::persistence::save_session;

/// Executes effects produced by `update` and turns their results into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    settings_path: PathBuf,
    session_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(settings_path: PathBuf, session_dir: PathBuf) -> Self {
        Self {
            engine: EngineHandle::new(),
            settings_path,
            session_dir,
        }
    }

    /// Runs `effects` in order; results that are known immediately come back as messages.
    pub fn execute(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut msgs = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartRun {
                    run_id,
                    invocation,
                    working_dir,
                    data_file,
                    folder_style,
                } => {
                    ezcon_info!("StartRun run_id={} cmd={}", run_id, invocation.preview());
                    self.engine.start_run(RunRequest {
                        run_id,
                        invocation,
                        working_dir: PathBuf::from(working_dir),
                        data_file: PathBuf::from(data_file),
                        folder_style,
                    });
                }
                Effect::CancelRun { run_id } => self.engine.cancel(run_id),
                Effect::SaveSettings { path, snapshot } => {
                    let target = path.map(PathBuf::from).unwrap_or_else(|| self.settings_path.clone());
                    msgs.push(match save_settings(&target, &snapshot) {
                        Ok(()) => Msg::SettingsSaved {
                            path: target.display().to_string(),
                        },
                        Err(err) => Msg::ErrorReported {
                            run_id: None,
                            kind: ErrorKind::ConfigSave,
                            message: err.to_string(),
                        },
                    });
                }
                Effect::ProbeScript { script_path } => {
                    let found = Path::new(&script_path).is_file();
                    if !found {
                        ezcon_warn!("{} not found", script_path);
                    }
                    msgs.push(Msg::ScriptProbed { found });
                }
                Effect::PersistSession(snapshot) => save_session(&self.session_dir, &snapshot),
                Effect::RefreshArtifacts { output_dir } => refresh_artifacts(Path::new(&output_dir)),
            }
        }
        msgs
    }

    /// Waits up to `timeout` for engine events and maps every pending one to a message.
    pub fn poll(&self, timeout: Duration) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if let Some(event) = self.engine.recv_timeout(timeout) {
            msgs.push(map_event(event));
            while let Some(event) = self.engine.try_recv() {
                msgs.push(map_event(event));
            }
        }
        msgs
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StateChanged { run_id, state } => Msg::RunStateChanged { run_id, state },
        EngineEvent::Output {
            run_id,
            channel,
            text,
        } => Msg::OutputLine {
            run_id,
            channel,
            text,
        },
        EngineEvent::RunCompleted {
            run_id,
            exit_code,
            output_dir,
            relocated,
        } => Msg::RunCompleted {
            run_id,
            exit_code,
            output_dir,
            relocated,
        },
        EngineEvent::Error {
            run_id,
            kind,
            message,
        } => Msg::ErrorReported {
            run_id,
            kind,
            message,
        },
    }
}

/// Lists the images now in `output_dir`, the set a thumbnail view would show.
fn refresh_artifacts(output_dir: &Path) {
    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(err) => {
            ezcon_warn!("Cannot list {}: {}", output_dir.display(), err);
            return;
        }
    };
    let mut images: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| {
            Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
        })
        .collect();
    images.sort();
    ezcon_info!(
        "{} images in {}: {}",
        images.len(),
        output_dir.display(),
        images.join(", ")
    );
}
