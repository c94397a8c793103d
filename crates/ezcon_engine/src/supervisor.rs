//! Child process lifecycle: spawn, drain both pipes, await exit.
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use ezcon_core::{ErrorKind, Invocation, RunId, RunState, StreamChannel, TERMINATED_EXIT_CODE};
use ezcon_logging::{ezcon_debug, ezcon_info, ezcon_trace, ezcon_warn, set_run_tag};

use crate::error::SupervisorError;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Receives everything a run reports. Called from supervisor threads.
pub trait RunObserver: Send + Sync {
    fn on_output_line(&self, channel: StreamChannel, text: &str);
    fn on_state_change(&self, state: RunState);
    fn on_run_complete(&self, exit_code: i32, relocated: &[String]);
    fn on_error(&self, kind: ErrorKind, message: &str);
    /// Folder the run's artifacts will be moved to.
    fn on_output_dir(&self, _dir: &Path) {}
}

/// Launches at most one child at a time.
#[derive(Debug, Clone, Default)]
pub struct ProcessSupervisor {
    busy: Arc<AtomicBool>,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Spawns `invocation` in `working_dir` and starts draining it.
    ///
    /// The observer sees `Starting`, then `Running` and the output lines. The
    /// terminal state is returned by [`RunHandle::wait`] so the caller decides
    /// when to announce it. On spawn failure the observer sees the error and
    /// `LaunchError` and no output.
    pub fn start(
        &self,
        run_id: RunId,
        invocation: &Invocation,
        working_dir: &Path,
        observer: Arc<dyn RunObserver>,
    ) -> Result<RunHandle, SupervisorError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SupervisorError::Busy);
        }
        let busy = Arc::new(BusyGuard(self.busy.clone()));

        observer.on_state_change(RunState::Starting);
        ezcon_info!("Running command: {}", invocation.preview());
        let spawned = Command::new(invocation.program())
            .args(invocation.args())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                let error = SupervisorError::Launch {
                    program: invocation.program().to_string(),
                    message: err.to_string(),
                };
                ezcon_warn!("{error}");
                observer.on_error(ErrorKind::Launch, &error.to_string());
                observer.on_state_change(RunState::LaunchError);
                return Err(error);
            }
        };
        ezcon_debug!("spawned pid {}", child.id());
        observer.on_state_change(RunState::Running);

        let (line_tx, line_rx) = mpsc::channel();
        let mut drains = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            drains.push(spawn_drain(run_id, StreamChannel::Stdout, stdout, line_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            drains.push(spawn_drain(run_id, StreamChannel::Stderr, stderr, line_tx.clone()));
        }
        drop(line_tx);

        let canceller = RunCanceller {
            child: Arc::new(Mutex::new(child)),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        let (exit_tx, exit_rx) = mpsc::channel();
        let waiter = Waiter {
            run_id,
            canceller: canceller.clone(),
            observer,
            _busy: busy.clone(),
        };
        thread::spawn(move || {
            let exit_code = waiter.run(line_rx, drains);
            let _ = exit_tx.send(exit_code);
        });

        Ok(RunHandle {
            exit_rx,
            canceller,
            _busy: busy,
        })
    }
}

/// The active run. Dropping it after the child exits frees the supervisor.
pub struct RunHandle {
    exit_rx: mpsc::Receiver<i32>,
    canceller: RunCanceller,
    _busy: Arc<BusyGuard>,
}

impl RunHandle {
    pub fn canceller(&self) -> RunCanceller {
        self.canceller.clone()
    }

    pub fn cancel(&self) -> bool {
        self.canceller.cancel()
    }

    /// Blocks until both pipes are drained and the child has exited.
    pub fn wait(&self) -> RunState {
        let exit_code = self.exit_rx.recv().unwrap_or(TERMINATED_EXIT_CODE);
        RunState::from_exit_code(exit_code)
    }

    /// Terminal state if the run already finished.
    pub fn try_wait(&self) -> Option<RunState> {
        self.exit_rx.try_recv().ok().map(RunState::from_exit_code)
    }
}

/// Kills the child of a run from any thread.
#[derive(Debug, Clone)]
pub struct RunCanceller {
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
}

impl RunCanceller {
    /// Requests termination; the run then ends `Failed` with the sentinel code.
    ///
    /// Returns false when the run had already been cancelled.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        match self.child.lock() {
            Ok(mut child) => {
                if let Err(err) = child.kill() {
                    ezcon_debug!("kill after exit: {err}");
                }
            }
            Err(_) => ezcon_warn!("child lock poisoned; cannot cancel"),
        }
        ezcon_info!("Cancellation requested");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct Waiter {
    run_id: RunId,
    canceller: RunCanceller,
    observer: Arc<dyn RunObserver>,
    _busy: Arc<BusyGuard>,
}

impl Waiter {
    fn run(
        self,
        lines: mpsc::Receiver<(StreamChannel, String)>,
        drains: Vec<thread::JoinHandle<()>>,
    ) -> i32 {
        set_run_tag(self.run_id);
        // Ends once both drain threads dropped their senders.
        for (channel, text) in lines {
            ezcon_trace!("{channel}: {text}");
            self.observer.on_output_line(channel, &text);
        }
        for drain in drains {
            if drain.join().is_err() {
                ezcon_warn!("drain thread panicked");
            }
        }

        let exit_code = self.await_exit();
        ezcon_info!("Process finished with return code: {exit_code}");
        exit_code
    }

    fn await_exit(&self) -> i32 {
        loop {
            let status = match self.canceller.child.lock() {
                Ok(mut child) => child.try_wait(),
                Err(_) => return TERMINATED_EXIT_CODE,
            };
            match status {
                Ok(Some(status)) => {
                    if self.canceller.is_cancelled() {
                        return TERMINATED_EXIT_CODE;
                    }
                    return status.code().unwrap_or(TERMINATED_EXIT_CODE);
                }
                Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
                Err(err) => {
                    ezcon_warn!("waiting for child failed: {err}");
                    return TERMINATED_EXIT_CODE;
                }
            }
        }
    }
}

fn spawn_drain<R: Read + Send + 'static>(
    run_id: RunId,
    channel: StreamChannel,
    stream: R,
    tx: mpsc::Sender<(StreamChannel, String)>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        set_run_tag(run_id);
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    let text = text.trim_end_matches(['\n', '\r']).to_string();
                    // Keep draining even if nobody listens any more.
                    let _ = tx.send((channel, text));
                }
                Err(err) => {
                    ezcon_warn!("{channel} read failed: {err}");
                    break;
                }
            }
        }
        ezcon_debug!("{channel} reached end of stream");
    })
}
