#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ezcon_core::{
    build_invocation, BaseInvocation, ConfigSnapshot, ErrorKind, Invocation, RunState,
    StreamChannel, TERMINATED_EXIT_CODE,
};
use ezcon_engine::{ProcessSupervisor, RunObserver, SupervisorError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    ezcon_logging::initialize_for_tests();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Line(StreamChannel, String),
    State(RunState),
    Complete(i32, Vec<String>),
    Error(ErrorKind),
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<Seen>>,
}

impl Recorder {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn lines(&self, channel: StreamChannel) -> Vec<String> {
        self.seen()
            .into_iter()
            .filter_map(|event| match event {
                Seen::Line(c, text) if c == channel => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Seen) {
        self.seen.lock().unwrap().push(event);
    }
}

impl RunObserver for Recorder {
    fn on_output_line(&self, channel: StreamChannel, text: &str) {
        self.push(Seen::Line(channel, text.to_string()));
    }

    fn on_state_change(&self, state: RunState) {
        self.push(Seen::State(state));
    }

    fn on_run_complete(&self, exit_code: i32, relocated: &[String]) {
        self.push(Seen::Complete(exit_code, relocated.to_vec()));
    }

    fn on_error(&self, kind: ErrorKind, _message: &str) {
        self.push(Seen::Error(kind));
    }
}

/// `sh -c <script>` routed through the real command builder.
fn shell(script: &str) -> Invocation {
    let base = BaseInvocation::new("sh", "-c");
    build_invocation(&base, script, &ConfigSnapshot::new())
}

#[test]
fn delivers_every_line_of_both_streams_before_exit() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let supervisor = ProcessSupervisor::new();

    let script = "for i in 1 2 3 4 5; do echo out$i; echo err$i >&2; done; printf 'tail'";
    let handle = supervisor
        .start(1, &shell(script), temp.path(), recorder.clone())
        .unwrap();
    let state = handle.wait();

    assert_eq!(state, RunState::Succeeded { exit_code: 0 });
    assert_eq!(
        recorder.lines(StreamChannel::Stdout),
        vec!["out1", "out2", "out3", "out4", "out5", "tail"]
    );
    assert_eq!(
        recorder.lines(StreamChannel::Stderr),
        vec!["err1", "err2", "err3", "err4", "err5"]
    );
    let seen = recorder.seen();
    assert_eq!(seen[0], Seen::State(RunState::Starting));
    assert_eq!(seen[1], Seen::State(RunState::Running));
}

#[test]
fn output_larger_than_pipe_buffer_does_not_deadlock() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let supervisor = ProcessSupervisor::new();

    // Roughly 200 KiB on each stream.
    let script = "i=0; while [ $i -lt 4000 ]; do \
                  echo \"line $i ..................................\"; \
                  echo \"err $i ...................................\" >&2; \
                  i=$((i+1)); done";
    let handle = supervisor
        .start(2, &shell(script), temp.path(), recorder.clone())
        .unwrap();

    assert_eq!(handle.wait(), RunState::Succeeded { exit_code: 0 });
    assert_eq!(recorder.lines(StreamChannel::Stdout).len(), 4000);
    assert_eq!(recorder.lines(StreamChannel::Stderr).len(), 4000);
}

#[test]
fn non_zero_exit_is_failed_with_code() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let supervisor = ProcessSupervisor::new();

    let handle = supervisor
        .start(3, &shell("echo bad >&2; exit 3"), temp.path(), recorder.clone())
        .unwrap();

    assert_eq!(handle.wait(), RunState::Failed { exit_code: 3 });
    assert_eq!(recorder.lines(StreamChannel::Stderr), vec!["bad"]);
}

#[test]
fn spawn_failure_reports_launch_error_without_output() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let supervisor = ProcessSupervisor::new();

    let invocation = build_invocation(
        &BaseInvocation::new("definitely-not-an-interpreter-ezcon", "ezCon.py"),
        "data.txt",
        &ConfigSnapshot::new(),
    );
    let result = supervisor.start(4, &invocation, temp.path(), recorder.clone());

    assert!(matches!(result, Err(SupervisorError::Launch { .. })));
    assert_eq!(
        recorder.seen(),
        vec![
            Seen::State(RunState::Starting),
            Seen::Error(ErrorKind::Launch),
            Seen::State(RunState::LaunchError),
        ]
    );
    assert!(!supervisor.is_busy());
}

#[test]
fn second_start_while_active_is_busy() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let supervisor = ProcessSupervisor::new();

    let handle = supervisor
        .start(5, &shell("sleep 0.3"), temp.path(), recorder.clone())
        .unwrap();
    let second = supervisor.start(6, &shell("true"), temp.path(), recorder.clone());
    assert!(matches!(second, Err(SupervisorError::Busy)));

    assert_eq!(handle.wait(), RunState::Succeeded { exit_code: 0 });
    drop(handle);
    assert!(!supervisor.is_busy());

    let third = supervisor
        .start(7, &shell("true"), temp.path(), recorder)
        .unwrap();
    assert_eq!(third.wait(), RunState::Succeeded { exit_code: 0 });
}

#[test]
fn cancel_ends_run_with_sentinel_code() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let supervisor = ProcessSupervisor::new();

    let handle = supervisor
        .start(8, &shell("echo started; exec sleep 30"), temp.path(), recorder.clone())
        .unwrap();
    let begun = Instant::now();
    std::thread::sleep(Duration::from_millis(100));
    assert!(handle.cancel());
    assert!(!handle.cancel());

    assert_eq!(
        handle.wait(),
        RunState::Failed {
            exit_code: TERMINATED_EXIT_CODE
        }
    );
    assert!(begun.elapsed() < Duration::from_secs(10));
    assert_eq!(recorder.lines(StreamChannel::Stdout), vec!["started"]);
}
