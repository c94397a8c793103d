use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ezcon_core::{update, AppState, AppViewModel, LauncherSettings, Msg};
use ezcon_engine::{load_defaults_catalog, load_settings, DEFAULTS_FILE_NAME};
use ezcon_logging::ezcon_debug;

use super::effects::EffectRunner;
use super::persistence::load_session;
use super::render::TerminalRenderer;

const ENGINE_POLL: Duration = Duration::from_millis(75);

/// Where the launcher finds its files.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    /// Startup directory; holds the session state. The settings file may name
    /// another working directory.
    pub working_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Use `working_dir` even if the settings file names another one.
    pub override_working_dir: bool,
}

/// Owns the session state and drives the update/effect loop.
pub struct Launcher {
    state: AppState,
    effects: EffectRunner,
    inbox: VecDeque<Msg>,
    renderer: TerminalRenderer,
}

impl Launcher {
    /// Loads settings, defaults and the previous session, then probes the script.
    pub fn start(paths: &LauncherPaths, launcher: LauncherSettings, renderer: TerminalRenderer) -> Self {
        let mut this = Self {
            state: AppState::with_launcher(launcher),
            effects: EffectRunner::new(paths.settings_file.clone(), paths.working_dir.clone()),
            inbox: VecDeque::new(),
            renderer,
        };

        let mut snapshot = load_settings(&paths.settings_file);
        if paths.override_working_dir || snapshot.working_dir().is_empty() {
            snapshot.set_working_dir(paths.working_dir.display().to_string());
        }
        this.dispatch(Msg::SettingsLoaded(snapshot));
        this.dispatch(Msg::DefaultsLoaded(load_defaults_catalog(&this.defaults_file())));
        this.dispatch(Msg::SessionRestored(load_session(&paths.working_dir)));
        this
    }

    /// Applies `msg` and every message its effects produce.
    pub fn dispatch(&mut self, msg: Msg) {
        self.inbox.push_back(msg);
        while let Some(msg) = self.inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            let was_dirty = state.consume_dirty();
            self.state = state;
            if !effects.is_empty() {
                ezcon_debug!("executing {} effect(s)", effects.len());
            }
            self.inbox.extend(self.effects.execute(effects));
            if was_dirty {
                self.renderer.render(&self.state);
            }
        }
    }

    /// Feeds engine events into the loop until the active run has ended.
    pub fn wait_for_run(&mut self) {
        while self.state.is_busy() {
            for msg in self.effects.poll(ENGINE_POLL) {
                self.dispatch(msg);
            }
            self.dispatch(Msg::Tick);
        }
    }

    /// `ezDefaults.txt` in the working directory ezCon runs in.
    pub fn defaults_file(&self) -> PathBuf {
        Path::new(self.state.config().working_dir()).join(DEFAULTS_FILE_NAME)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::time::Instant;

    use ezcon_core::{ErrorKind, RunState, MAX_OUTPUT_LINES};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn launcher_in(work: &Path) -> Launcher {
        start_in(work, true)
    }

    fn start_in(work: &Path, override_working_dir: bool) -> Launcher {
        let paths = LauncherPaths {
            working_dir: work.to_path_buf(),
            settings_file: work.join("ezconguiset.txt"),
            override_working_dir,
        };
        let launcher = LauncherSettings {
            interpreter: "sh".to_string(),
            script_name: "ezCon.py".to_string(),
        };
        Launcher::start(&paths, launcher, TerminalRenderer::new(true))
    }

    #[test]
    fn run_executes_script_and_moves_images() {
        let temp = TempDir::new().unwrap();
        let work = temp.path();
        fs::write(
            work.join("ezCon.py"),
            "echo \"processing $1 $2 $3\"\nprintf png > ezCon100.png\n",
        )
        .unwrap();
        fs::write(work.join("Dish220615_03.txt"), "data").unwrap();
        fs::write(
            work.join("ezconguiset.txt"),
            "-ezConAntPluck = 29\n-ezConAntPluck_active = true\n",
        )
        .unwrap();

        let mut launcher = launcher_in(work);
        launcher.dispatch(Msg::DataFileSelected(
            work.join("Dish220615_03.txt").display().to_string(),
        ));
        launcher.dispatch(Msg::RunClicked);
        launcher.wait_for_run();

        let view = launcher.view();
        assert_eq!(view.run_state, RunState::Succeeded { exit_code: 0 });
        assert_eq!(view.last_relocated, vec!["ezCon100.png".to_string()]);
        assert!(view
            .output
            .iter()
            .any(|line| line.text == "processing Dish220615_03.txt -ezConAntPluck 29"));
        assert!(work.join("EZCONPNG_FILES/20220615/ezCon100.png").exists());
        assert!(work.join(super::super::persistence::STATE_FILENAME).exists());
    }

    #[test]
    fn missing_script_is_rejected_without_spawning() {
        let temp = TempDir::new().unwrap();
        let work = temp.path();
        fs::write(work.join("Dish220615_03.txt"), "data").unwrap();

        let mut launcher = launcher_in(work);
        launcher.dispatch(Msg::DataFileSelected(
            work.join("Dish220615_03.txt").display().to_string(),
        ));
        launcher.dispatch(Msg::RunClicked);

        assert!(!launcher.state().is_busy());
        assert_eq!(launcher.view().last_error.unwrap().kind, ErrorKind::InvalidInput);
        assert!(!work.join("EZCONPNG_FILES").exists());
    }

    #[test]
    fn save_settings_writes_to_settings_file() {
        let temp = TempDir::new().unwrap();
        let work = temp.path();
        let mut launcher = launcher_in(work);
        launcher.dispatch(Msg::OptionValueChanged {
            key: "-ezConRefMode".to_string(),
            value: "1".to_string(),
        });
        launcher.dispatch(Msg::SaveSettingsClicked { path: None });

        let text = fs::read_to_string(work.join("ezconguiset.txt")).unwrap();
        assert!(text.contains("-ezConRefMode = 1\n"));
        assert!(!launcher.view().unsaved_changes);
    }

    #[test]
    fn defaults_come_from_the_stored_working_dir() {
        let startup = TempDir::new().unwrap();
        let stored = TempDir::new().unwrap();
        fs::write(
            startup.path().join("ezconguiset.txt"),
            format!("WORKING_DIR = {}\n", stored.path().display()),
        )
        .unwrap();
        fs::write(stored.path().join("ezDefaults.txt"), "-ezRAObsName Lebanon\n").unwrap();
        fs::write(startup.path().join("ezDefaults.txt"), "-ezRAObsName Elsewhere\n").unwrap();

        let launcher = start_in(startup.path(), false);
        let view = launcher.view();
        assert_eq!(view.working_dir, stored.path().display().to_string());
        assert_eq!(launcher.defaults_file(), stored.path().join("ezDefaults.txt"));
        let observer = view
            .display_fields
            .iter()
            .find(|field| field.key == "-ezRAObsName")
            .unwrap();
        assert_eq!(observer.value, "Lebanon");
    }

    #[test]
    fn chatty_run_keeps_up_with_the_child() {
        let temp = TempDir::new().unwrap();
        let work = temp.path();
        fs::write(
            work.join("ezCon.py"),
            "i=0\nwhile [ $i -lt 60000 ]; do echo \"line $i\"; i=$((i+1)); done\n",
        )
        .unwrap();
        fs::write(work.join("Dish220615_03.txt"), "data").unwrap();

        let mut launcher = launcher_in(work);
        launcher.dispatch(Msg::DataFileSelected(
            work.join("Dish220615_03.txt").display().to_string(),
        ));
        let started = Instant::now();
        launcher.dispatch(Msg::RunClicked);
        launcher.wait_for_run();
        let elapsed = started.elapsed();

        let view = launcher.view();
        assert_eq!(view.run_state, RunState::Succeeded { exit_code: 0 });
        assert_eq!(view.output.len(), MAX_OUTPUT_LINES);
        assert!(view.output.iter().any(|line| line.text == "line 59999"));
        assert!(
            elapsed < Duration::from_secs(30),
            "60 000 lines took {elapsed:?}"
        );
    }
}
