use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ezcon_core::{default_interpreter, DEFAULT_SCRIPT_NAME};

use crate::platform::logging::LogDestination;

#[derive(Parser)]
#[command(name = "ezcon")]
#[command(version)]
#[command(about = "Configure and launch ezCon radio-astronomy runs", long_about = None)]
pub struct Cli {
    /// Directory ezCon runs in [default: current directory]
    #[arg(short = 'C', long, global = true)]
    pub working_dir: Option<PathBuf>,
    /// Settings file [default: <working dir>/ezconguiset.txt]
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    /// Interpreter that runs the script
    #[arg(long, global = true, default_value = default_interpreter())]
    pub interpreter: String,
    /// Script file name inside the working directory
    #[arg(long, global = true, default_value = DEFAULT_SCRIPT_NAME)]
    pub script: String,
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Where log messages go
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the command a run over DATA_FILE would execute
    #[clap(visible_alias = "p")]
    Preview {
        /// ezRA data file (.txt)
        data_file: PathBuf,
    },
    /// Run ezCon over DATA_FILE and move the images it writes
    #[clap(visible_alias = "r")]
    Run {
        /// ezRA data file (.txt)
        data_file: PathBuf,
        /// Name the output folder DDMMYYYY from the file's modification date
        #[arg(long)]
        ddmmyyyy: bool,
        /// Do not echo the child's stdout
        #[arg(long)]
        hide_stdout: bool,
        /// Do not echo the child's stderr
        #[arg(long)]
        hide_stderr: bool,
        /// Print a JSON summary instead of the output log
        #[arg(long)]
        json: bool,
    },
    /// Show or edit the saved option settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Show the observer and antenna values from ezDefaults.txt
    Defaults,
    /// Print the output folder a run over DATA_FILE would use
    Folder {
        data_file: PathBuf,
        #[arg(long)]
        ddmmyyyy: bool,
    },
    /// Move images written since a point in time into a folder
    Collect {
        /// RFC 3339 timestamp, e.g. 2022-06-15T12:00:00+02:00
        #[arg(long)]
        since: String,
        #[arg(long)]
        into: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// List every option with its value and checkbox state
    Show,
    /// Set the value of an option and save
    Set {
        #[arg(allow_hyphen_values = true)]
        key: String,
        /// Value tokens; several are joined with spaces
        #[arg(allow_hyphen_values = true)]
        values: Vec<String>,
        /// Also tick the option's checkbox
        #[arg(long)]
        enable: bool,
    },
    /// Tick an option so it is passed to ezCon
    Enable {
        #[arg(allow_hyphen_values = true)]
        key: String,
    },
    /// Untick an option
    Disable {
        #[arg(allow_hyphen_values = true)]
        key: String,
    },
    /// Clear every option value and checkbox
    Reset,
    /// Seed option values from ezDefaults.txt, all unticked
    ReloadDefaults,
    /// Store a new working directory in the settings file
    WorkingDir { dir: PathBuf },
    /// Save the current settings to another file
    SaveAs { path: PathBuf },
}
