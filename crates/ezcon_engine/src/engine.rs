use std::collections::HashMap;
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use ezcon_core::{ErrorKind, RunId, RunState, StreamChannel};
use ezcon_logging::{ezcon_debug, ezcon_warn, set_run_tag};

use crate::session::start_session;
use crate::supervisor::{ProcessSupervisor, RunCanceller, RunObserver};
use crate::types::{EngineEvent, RunRequest};

enum EngineCommand {
    Run(RunRequest),
    Cancel { run_id: RunId },
}

/// Cancellation state of a run the worker has accepted.
#[derive(Default)]
struct ActiveRun {
    canceller: Option<RunCanceller>,
    cancel_requested: bool,
}

type ActiveRuns = Arc<Mutex<HashMap<RunId, ActiveRun>>>;

/// Background worker that runs sessions and reports them as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineHandle {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let supervisor = ProcessSupervisor::new();
        let active: ActiveRuns = Arc::default();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&supervisor, &active, command, &event_tx);
            }
            ezcon_debug!("engine command channel closed");
        });

        Self { cmd_tx, event_rx }
    }

    pub fn start_run(&self, request: RunRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Run(request));
    }

    pub fn cancel(&self, run_id: RunId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { run_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    supervisor: &ProcessSupervisor,
    active: &ActiveRuns,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Run(request) => {
            let run_id = request.run_id;
            if let Ok(mut runs) = active.lock() {
                runs.insert(run_id, ActiveRun::default());
            }
            let supervisor = supervisor.clone();
            let active = active.clone();
            let observer = Arc::new(ChannelObserver::new(run_id, event_tx.clone()));
            thread::spawn(move || {
                set_run_tag(run_id);
                if let Ok(session) = start_session(&supervisor, &request, observer) {
                    attach_canceller(&active, run_id, session.canceller());
                    session.finish();
                }
                if let Ok(mut runs) = active.lock() {
                    runs.remove(&run_id);
                }
            });
        }
        EngineCommand::Cancel { run_id } => {
            let Ok(mut runs) = active.lock() else {
                return;
            };
            match runs.get_mut(&run_id) {
                Some(run) => {
                    run.cancel_requested = true;
                    if let Some(canceller) = &run.canceller {
                        canceller.cancel();
                    }
                }
                None => ezcon_warn!("cancel for run {run_id} ignored: not running"),
            }
        }
    }
}

/// Stores the canceller, honouring a cancel that arrived before the spawn.
fn attach_canceller(active: &ActiveRuns, run_id: RunId, canceller: RunCanceller) {
    let Ok(mut runs) = active.lock() else {
        return;
    };
    if let Some(run) = runs.get_mut(&run_id) {
        if run.cancel_requested {
            canceller.cancel();
        }
        run.canceller = Some(canceller);
    }
}

/// Turns observer callbacks into events on the engine channel.
pub struct ChannelObserver {
    run_id: RunId,
    tx: mpsc::Sender<EngineEvent>,
    output_dir: Mutex<Option<String>>,
}

impl ChannelObserver {
    pub fn new(run_id: RunId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            run_id,
            tx,
            output_dir: Mutex::new(None),
        }
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl RunObserver for ChannelObserver {
    fn on_output_line(&self, channel: StreamChannel, text: &str) {
        self.emit(EngineEvent::Output {
            run_id: self.run_id,
            channel,
            text: text.to_string(),
        });
    }

    fn on_state_change(&self, state: RunState) {
        self.emit(EngineEvent::StateChanged {
            run_id: self.run_id,
            state,
        });
    }

    fn on_run_complete(&self, exit_code: i32, relocated: &[String]) {
        let output_dir = self.output_dir.lock().ok().and_then(|dir| dir.clone());
        self.emit(EngineEvent::RunCompleted {
            run_id: self.run_id,
            exit_code,
            output_dir,
            relocated: relocated.to_vec(),
        });
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        self.emit(EngineEvent::Error {
            run_id: Some(self.run_id),
            kind,
            message: message.to_string(),
        });
    }

    fn on_output_dir(&self, dir: &Path) {
        if let Ok(mut slot) = self.output_dir.lock() {
            *slot = Some(dir.display().to_string());
        }
    }
}
