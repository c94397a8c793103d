//! One launch from validation to artifact collection.
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use ezcon_core::{ErrorKind, RunState, StreamChannel};
use ezcon_logging::{ezcon_info, ezcon_warn};
use thiserror::Error;

use crate::artifacts::{collect, resolve_output_directory};
use crate::error::SupervisorError;
use crate::supervisor::{ProcessSupervisor, RunCanceller, RunHandle, RunObserver};
use crate::types::RunRequest;

/// Stderr lines quoted when a run fails.
const STDERR_TAIL_LINES: usize = 10;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub state: RunState,
    pub output_dir: Option<PathBuf>,
    pub relocated: Vec<String>,
}

impl RunReport {
    pub fn exit_code(&self) -> Option<i32> {
        self.state.exit_code()
    }
}

/// A started session; call [`ActiveSession::finish`] to see it through.
pub struct ActiveSession {
    handle: RunHandle,
    observer: Arc<TailObserver>,
    working_dir: PathBuf,
    output_dir: Option<PathBuf>,
    started_at: SystemTime,
}

/// Validates `request`, prepares the output folder and spawns the child.
///
/// Every failure has already been reported to `observer`, ending with a
/// `LaunchError` state, when this returns `Err`.
pub fn start_session(
    supervisor: &ProcessSupervisor,
    request: &RunRequest,
    observer: Arc<dyn RunObserver>,
) -> Result<ActiveSession, SessionError> {
    if let Err(message) = validate(request) {
        observer.on_error(ErrorKind::InvalidInput, &message);
        observer.on_state_change(RunState::LaunchError);
        return Err(SessionError::InvalidInput(message));
    }
    if supervisor.is_busy() {
        return Err(reject_busy(observer.as_ref()));
    }

    let output_dir = match resolve_output_directory(
        &request.working_dir,
        &request.data_file,
        request.folder_style,
    ) {
        Ok(dir) => {
            observer.on_output_dir(&dir);
            Some(dir)
        }
        Err(err) => {
            ezcon_warn!("{err}");
            observer.on_error(ErrorKind::Artifact, &err.to_string());
            None
        }
    };

    let tail = Arc::new(TailObserver::new(observer));
    let started_at = SystemTime::now();
    let handle = match supervisor.start(
        request.run_id,
        &request.invocation,
        &request.working_dir,
        tail.clone(),
    ) {
        Ok(handle) => handle,
        Err(SupervisorError::Busy) => return Err(reject_busy(tail.inner.as_ref())),
        Err(err) => return Err(err.into()),
    };

    Ok(ActiveSession {
        handle,
        observer: tail,
        working_dir: request.working_dir.clone(),
        output_dir,
        started_at,
    })
}

impl ActiveSession {
    pub fn canceller(&self) -> RunCanceller {
        self.handle.canceller()
    }

    /// Waits for the child, collects artifacts on success, then announces
    /// completion followed by the terminal state.
    pub fn finish(self) -> RunReport {
        let ActiveSession {
            handle,
            observer,
            working_dir,
            output_dir,
            started_at,
        } = self;
        let state = handle.wait();
        let cancelled = handle.canceller().is_cancelled();
        drop(handle);

        let mut relocated = Vec::new();
        match state {
            RunState::Succeeded { .. } => {
                if let Some(dir) = &output_dir {
                    relocated = collect_into(&working_dir, dir, started_at, observer.as_ref());
                }
            }
            RunState::Failed { exit_code } => {
                let mut message = if cancelled {
                    "Run cancelled.".to_string()
                } else {
                    format!("ezCon.py failed with return code {exit_code}.")
                };
                let tail = observer.stderr_tail();
                if !tail.is_empty() {
                    message.push('\n');
                    message.push_str(&tail.join("\n"));
                }
                observer.on_error(ErrorKind::RuntimeFailure, &message);
            }
            _ => {}
        }

        let exit_code = state.exit_code().unwrap_or_default();
        observer.on_run_complete(exit_code, &relocated);
        observer.on_state_change(state);
        ezcon_info!("Run ended: {state}");

        RunReport {
            state,
            output_dir,
            relocated,
        }
    }
}

/// Runs `request` to completion on the calling thread.
pub fn run_session(
    supervisor: &ProcessSupervisor,
    request: &RunRequest,
    observer: Arc<dyn RunObserver>,
) -> Result<RunReport, SessionError> {
    Ok(start_session(supervisor, request, observer)?.finish())
}

/// Checks the inputs a run needs before anything is spawned.
///
/// The target is only checked when it is an absolute path inside the working
/// directory; other targets (`-c`, module names, files elsewhere) are left to
/// the interpreter.
fn validate(request: &RunRequest) -> Result<(), String> {
    if !request.data_file.is_file() {
        return Err(format!(
            "Data file not found: {}",
            request.data_file.display()
        ));
    }
    if !request.working_dir.is_dir() {
        return Err(format!(
            "Working directory not found: {}",
            request.working_dir.display()
        ));
    }
    if let Some(target) = request.invocation.args().first().map(Path::new) {
        if target.is_absolute() && target.starts_with(&request.working_dir) && !target.is_file() {
            let name = target
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(format!("Cannot find {name} at: {}", target.display()));
        }
    }
    Ok(())
}

fn reject_busy(observer: &dyn RunObserver) -> SessionError {
    let err = SupervisorError::Busy;
    observer.on_error(ErrorKind::Busy, &err.to_string());
    observer.on_state_change(RunState::LaunchError);
    err.into()
}

fn collect_into(
    working_dir: &Path,
    output_dir: &Path,
    since: SystemTime,
    observer: &dyn RunObserver,
) -> Vec<String> {
    match collect(working_dir, output_dir, since) {
        Ok(report) => {
            for (name, reason) in &report.failed {
                observer.on_error(
                    ErrorKind::Artifact,
                    &format!("Error moving file {name}: {reason}"),
                );
            }
            report.moved
        }
        Err(err) => {
            ezcon_warn!("{err}");
            observer.on_error(ErrorKind::Artifact, &err.to_string());
            Vec::new()
        }
    }
}

/// Forwards to the caller's observer and remembers the last stderr lines.
struct TailObserver {
    inner: Arc<dyn RunObserver>,
    stderr_tail: Mutex<VecDeque<String>>,
}

impl TailObserver {
    fn new(inner: Arc<dyn RunObserver>) -> Self {
        Self {
            inner,
            stderr_tail: Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)),
        }
    }

    fn stderr_tail(&self) -> Vec<String> {
        self.stderr_tail
            .lock()
            .map(|tail| tail.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl RunObserver for TailObserver {
    fn on_output_line(&self, channel: StreamChannel, text: &str) {
        if channel == StreamChannel::Stderr {
            if let Ok(mut tail) = self.stderr_tail.lock() {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(text.to_string());
            }
        }
        self.inner.on_output_line(channel, text);
    }

    fn on_state_change(&self, state: RunState) {
        self.inner.on_state_change(state);
    }

    fn on_run_complete(&self, exit_code: i32, relocated: &[String]) {
        self.inner.on_run_complete(exit_code, relocated);
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        self.inner.on_error(kind, message);
    }

    fn on_output_dir(&self, dir: &Path) {
        self.inner.on_output_dir(dir);
    }
}
