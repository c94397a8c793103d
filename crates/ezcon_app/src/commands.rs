use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context as _, Result};
use chrono::DateTime;
use ezcon_core::{AppViewModel, ErrorKind, FolderStyle, LauncherSettings, Msg, RunState, StreamChannel};
use ezcon_engine::{
    collect, ensure_dir, load_defaults_catalog, output_directory, SETTINGS_FILE_NAME,
};
use ezcon_logging::{ezcon_info, ezcon_warn};
use serde_json::json;

use crate::cli::{Cli, Commands, SettingsCommand};
use crate::platform::app::{Launcher, LauncherPaths};
use crate::platform::render::{render_display_fields, render_options, TerminalRenderer};

/// Exit code for a launch that never reached the child.
const EXIT_LAUNCH_FAILED: i32 = 127;
/// Exit code for a run rejected before launch.
const EXIT_REJECTED: i32 = 2;

/// Paths and launcher settings shared by every subcommand.
struct Context {
    paths: LauncherPaths,
    launcher: LauncherSettings,
}

impl Context {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let working_dir = match &cli.working_dir {
            Some(dir) => absolute(dir)?,
            None => std::env::current_dir().context("cannot read the current directory")?,
        };
        let settings_file = match &cli.settings {
            Some(path) => absolute(path)?,
            None => working_dir.join(SETTINGS_FILE_NAME),
        };
        Ok(Self {
            paths: LauncherPaths {
                working_dir,
                settings_file,
                override_working_dir: cli.working_dir.is_some(),
            },
            launcher: LauncherSettings {
                interpreter: cli.interpreter.clone(),
                script_name: cli.script.clone(),
            },
        })
    }

    fn launcher(&self, quiet: bool) -> Launcher {
        Launcher::start(&self.paths, self.launcher.clone(), TerminalRenderer::new(quiet))
    }

    /// Directory ezCon runs in once the settings file has been applied.
    fn run_dir(&self) -> PathBuf {
        PathBuf::from(self.launcher(true).state().config().working_dir())
    }
}

/// Runs the selected subcommand and returns the process exit code.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let ctx = Context::from_cli(&cli)?;
    match cli.command {
        Commands::Preview { data_file } => preview(&ctx, &data_file),
        Commands::Run {
            data_file,
            ddmmyyyy,
            hide_stdout,
            hide_stderr,
            json,
        } => run(
            &ctx,
            &data_file,
            RunFlags {
                folder_style: folder_style(ddmmyyyy),
                hide_stdout,
                hide_stderr,
                json,
            },
        ),
        Commands::Settings(command) => settings(&ctx, command),
        Commands::Defaults => {
            print!("{}", render_display_fields(&ctx.launcher(true).view()));
            Ok(0)
        }
        Commands::Folder {
            data_file,
            ddmmyyyy,
        } => {
            let dir = output_directory(
                &ctx.run_dir(),
                &absolute(&data_file)?,
                folder_style(ddmmyyyy),
            );
            println!("{}", dir.display());
            Ok(0)
        }
        Commands::Collect { since, into } => collect_since(&ctx, &since, &into),
    }
}

fn preview(ctx: &Context, data_file: &Path) -> Result<i32> {
    let mut launcher = ctx.launcher(true);
    launcher.dispatch(Msg::DataFileSelected(absolute(data_file)?.display().to_string()));
    println!("{}", launcher.view().command_preview);
    Ok(0)
}

struct RunFlags {
    folder_style: FolderStyle,
    hide_stdout: bool,
    hide_stderr: bool,
    json: bool,
}

fn run(ctx: &Context, data_file: &Path, flags: RunFlags) -> Result<i32> {
    let mut launcher = ctx.launcher(flags.json);
    launcher.dispatch(Msg::FolderStyleChanged(flags.folder_style));
    for (channel, hidden) in [
        (StreamChannel::Stdout, flags.hide_stdout),
        (StreamChannel::Stderr, flags.hide_stderr),
    ] {
        launcher.dispatch(Msg::StreamFilterChanged {
            channel,
            visible: !hidden,
        });
    }
    launcher.dispatch(Msg::DataFileSelected(absolute(data_file)?.display().to_string()));
    launcher.dispatch(Msg::RunClicked);

    if !launcher.state().is_busy() {
        let view = launcher.view();
        if flags.json {
            println!("{}", summary(&view));
        }
        if let Some(error) = &view.last_error {
            eprintln!("{}: {}", error.kind, error.message);
        }
        return Ok(EXIT_REJECTED);
    }

    launcher.wait_for_run();
    let view = launcher.view();
    if flags.json {
        println!("{}", summary(&view));
    }
    Ok(exit_code_for(&view))
}

fn exit_code_for(view: &AppViewModel) -> i32 {
    match view.run_state {
        RunState::Succeeded { .. } => 0,
        RunState::Failed { exit_code } if exit_code > 0 => exit_code,
        RunState::LaunchError => match view.last_error.as_ref().map(|error| error.kind) {
            Some(ErrorKind::Launch) => EXIT_LAUNCH_FAILED,
            _ => EXIT_REJECTED,
        },
        _ => 1,
    }
}

fn summary(view: &AppViewModel) -> serde_json::Value {
    json!({
        "state": view.run_state.to_string(),
        "exit_code": view.last_exit_code,
        "command": view.command_preview,
        "output_dir": view.last_output_dir,
        "moved": view.last_relocated,
        "error": view.last_error.as_ref().map(|error| json!({
            "kind": error.kind.to_string(),
            "message": error.message,
        })),
    })
}

fn settings(ctx: &Context, command: SettingsCommand) -> Result<i32> {
    let mut launcher = ctx.launcher(true);
    let save_to = match command {
        SettingsCommand::Show => {
            print!("{}", render_options(&launcher.view()));
            return Ok(0);
        }
        SettingsCommand::Set {
            key,
            values,
            enable,
        } => {
            launcher.dispatch(Msg::OptionValueChanged {
                key: key.clone(),
                value: values.join(" "),
            });
            if enable {
                launcher.dispatch(Msg::OptionToggled { key, enabled: true });
            }
            None
        }
        SettingsCommand::Enable { key } => {
            launcher.dispatch(Msg::OptionToggled { key, enabled: true });
            None
        }
        SettingsCommand::Disable { key } => {
            launcher.dispatch(Msg::OptionToggled { key, enabled: false });
            None
        }
        SettingsCommand::Reset => {
            launcher.dispatch(Msg::ResetOptionsClicked);
            None
        }
        SettingsCommand::ReloadDefaults => {
            let defaults_path = launcher.defaults_file();
            let defaults = load_defaults_catalog(&defaults_path);
            if defaults.is_empty() {
                ezcon_warn!("No defaults found in {}", defaults_path.display());
            }
            launcher.dispatch(Msg::ReloadDefaultsClicked(defaults));
            None
        }
        SettingsCommand::WorkingDir { dir } => {
            launcher.dispatch(Msg::WorkingDirChanged(absolute(&dir)?.display().to_string()));
            None
        }
        SettingsCommand::SaveAs { path } => Some(absolute(&path)?.display().to_string()),
    };

    if let Some(error) = launcher.view().last_error {
        bail!("{}", error.message);
    }
    launcher.dispatch(Msg::SaveSettingsClicked { path: save_to });
    let view = launcher.view();
    if let Some(error) = view.last_error {
        bail!("{}: {}", error.kind, error.message);
    }
    if let Some(line) = view.output.last() {
        println!("{}", line.text);
    }
    Ok(0)
}

fn collect_since(ctx: &Context, since: &str, into: &Path) -> Result<i32> {
    let since: SystemTime = DateTime::parse_from_rfc3339(since)
        .with_context(|| format!("'{since}' is not an RFC 3339 timestamp"))?
        .into();
    let into = absolute(into)?;
    ensure_dir(&into)?;
    let report = collect(&ctx.run_dir(), &into, since)?;
    for name in &report.moved {
        println!("{}", into.join(name).display());
    }
    for (name, reason) in &report.failed {
        eprintln!("Error moving file {name}: {reason}");
    }
    ezcon_info!(
        "Collected {} file(s) into {}",
        report.moved.len(),
        into.display()
    );
    Ok(if report.failed.is_empty() { 0 } else { 1 })
}

fn folder_style(ddmmyyyy: bool) -> FolderStyle {
    if ddmmyyyy {
        FolderStyle::DateFromMtime
    } else {
        FolderStyle::DateFromName
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("cannot resolve {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezcon_core::ErrorView;
    use pretty_assertions::assert_eq;

    fn view_with(run_state: RunState, error: Option<ErrorKind>) -> AppViewModel {
        AppViewModel {
            run_state,
            last_error: error.map(|kind| ErrorView {
                kind,
                message: "boom".to_string(),
            }),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn exit_code_follows_run_outcome() {
        assert_eq!(exit_code_for(&view_with(RunState::Succeeded { exit_code: 0 }, None)), 0);
        assert_eq!(exit_code_for(&view_with(RunState::Failed { exit_code: 3 }, None)), 3);
        assert_eq!(exit_code_for(&view_with(RunState::Failed { exit_code: -1 }, None)), 1);
        assert_eq!(
            exit_code_for(&view_with(RunState::LaunchError, Some(ErrorKind::Launch))),
            EXIT_LAUNCH_FAILED
        );
        assert_eq!(
            exit_code_for(&view_with(RunState::LaunchError, Some(ErrorKind::InvalidInput))),
            EXIT_REJECTED
        );
    }

    #[test]
    fn summary_reports_moved_files() {
        let mut view = view_with(RunState::Succeeded { exit_code: 0 }, None);
        view.last_exit_code = Some(0);
        view.last_relocated = vec!["ezCon100.png".to_string()];
        let value = summary(&view);
        assert_eq!(value["state"], "succeeded (exit 0)");
        assert_eq!(value["moved"][0], "ezCon100.png");
        assert!(value["error"].is_null());
    }
}
