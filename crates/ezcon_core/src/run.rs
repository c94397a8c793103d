use std::fmt;

pub type RunId = u64;

/// Exit code reported for a child that was killed or ended by a signal.
pub const TERMINATED_EXIT_CODE: i32 = -1;

/// Lifecycle of one launch: `Idle -> Starting -> Running -> terminal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Starting,
    Running,
    Succeeded {
        exit_code: i32,
    },
    Failed {
        exit_code: i32,
    },
    LaunchError,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Succeeded { .. } | RunState::Failed { .. } | RunState::LaunchError
        )
    }

    /// True while a progress indicator should be shown.
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Starting | RunState::Running)
    }

    pub fn exit_code(self) -> Option<i32> {
        match self {
            RunState::Succeeded { exit_code } | RunState::Failed { exit_code } => Some(exit_code),
            _ => None,
        }
    }

    /// Terminal state for a child that exited with `exit_code`.
    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            RunState::Succeeded { exit_code }
        } else {
            RunState::Failed { exit_code }
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Starting => write!(f, "starting"),
            RunState::Running => write!(f, "running"),
            RunState::Succeeded { exit_code } => write!(f, "succeeded (exit {exit_code})"),
            RunState::Failed { exit_code } => write!(f, "failed (exit {exit_code})"),
            RunState::LaunchError => write!(f, "launch error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamChannel {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamChannel::Stdout => write!(f, "STDOUT"),
            StreamChannel::Stderr => write!(f, "STDERR"),
        }
    }
}

/// How the dated output folder name is derived from the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderStyle {
    /// `YYYYMMDD` from a `YYMMDD` run in the file name, else from its mtime.
    #[default]
    DateFromName,
    /// `DDMMYYYY` from the file's mtime.
    DateFromMtime,
}

/// Error taxonomy surfaced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigLoad,
    ConfigSave,
    Launch,
    RuntimeFailure,
    Artifact,
    Busy,
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::ConfigLoad => "settings load error",
            ErrorKind::ConfigSave => "settings save error",
            ErrorKind::Launch => "launch error",
            ErrorKind::RuntimeFailure => "ezCon error",
            ErrorKind::Artifact => "artifact error",
            ErrorKind::Busy => "busy",
            ErrorKind::InvalidInput => "invalid input",
        };
        f.write_str(label)
    }
}
