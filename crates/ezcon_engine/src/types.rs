use std::path::PathBuf;

use ezcon_core::{ErrorKind, FolderStyle, Invocation, RunId, RunState, StreamChannel};

/// Everything a run needs, captured when Run was clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub run_id: RunId,
    pub invocation: Invocation,
    pub working_dir: PathBuf,
    pub data_file: PathBuf,
    pub folder_style: FolderStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StateChanged {
        run_id: RunId,
        state: RunState,
    },
    Output {
        run_id: RunId,
        channel: StreamChannel,
        text: String,
    },
    RunCompleted {
        run_id: RunId,
        exit_code: i32,
        output_dir: Option<String>,
        relocated: Vec<String>,
    },
    Error {
        run_id: Option<RunId>,
        kind: ErrorKind,
        message: String,
    },
}
