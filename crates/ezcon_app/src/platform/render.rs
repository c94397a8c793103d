use std::io::{self, Write};

use ezcon_core::{
    AppState, AppViewModel, OptionGroup, OptionRowView, OutputLineView, RunState, StreamChannel,
};

/// Incremental terminal rendering of the output log and run status.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    next_seq: u64,
    last_state: RunState,
    quiet: bool,
}

impl TerminalRenderer {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Self::default()
        }
    }

    /// Prints lines and state changes not yet shown.
    pub fn render(&mut self, state: &AppState) {
        let text = self.pending_text(state.output_since(self.next_seq), state.run_state());
        if self.quiet || text.is_empty() {
            return;
        }
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn pending_text(
        &mut self,
        lines: impl Iterator<Item = OutputLineView>,
        run_state: RunState,
    ) -> String {
        let mut text = String::new();
        for line in lines {
            if line.seq < self.next_seq {
                continue;
            }
            text.push_str(&format_line(line.channel, &line.text));
            text.push('\n');
            self.next_seq = line.seq + 1;
        }
        if run_state != self.last_state {
            self.last_state = run_state;
            if run_state != RunState::Idle {
                text.push_str(&format!("[{run_state}]\n"));
            }
        }
        text
    }
}

fn format_line(channel: Option<StreamChannel>, text: &str) -> String {
    match channel {
        Some(channel) => format!("{channel}: {text}"),
        None => text.to_string(),
    }
}

/// Option table in catalog order, grouped the way the settings dialog is.
pub fn render_options(view: &AppViewModel) -> String {
    let mut text = format!("Working directory: {}\n", view.working_dir);
    for (group, title) in [
        (OptionGroup::Processing, "Processing options"),
        (OptionGroup::Display, "Display options"),
    ] {
        text.push_str(&format!("\n{title}:\n"));
        for row in view.options.iter().filter(|row| row.group == group) {
            text.push_str(&option_row(row));
        }
    }
    if view.extra_option_count > 0 {
        text.push_str(&format!(
            "\n{} unrecognised option(s) kept from the settings file.\n",
            view.extra_option_count
        ));
    }
    if view.unsaved_changes {
        text.push_str("\n(unsaved changes)\n");
    }
    text
}

fn option_row(row: &OptionRowView) -> String {
    let mark = if row.enabled { "x" } else { " " };
    let value = if row.value.is_empty() {
        format!("({})", row.help)
    } else {
        row.value.clone()
    };
    format!("  [{mark}] {:<40} {value}\n", row.key)
}

/// Read-only observer/antenna fields from the defaults file.
pub fn render_display_fields(view: &AppViewModel) -> String {
    view.display_fields
        .iter()
        .map(|field| format!("{:<26} {}\n", format!("{}:", field.label), field.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezcon_core::{update, DefaultsCatalog, Msg};
    use pretty_assertions::assert_eq;

    fn line(seq: u64, channel: Option<StreamChannel>, text: &str) -> OutputLineView {
        OutputLineView {
            seq,
            channel,
            text: text.to_string(),
        }
    }

    #[test]
    fn renders_each_line_once() {
        let mut renderer = TerminalRenderer::new(true);
        let mut lines = vec![line(0, None, "Running command:")];
        assert_eq!(
            renderer.pending_text(lines.clone().into_iter(), RunState::Idle),
            "Running command:\n"
        );

        lines.push(line(1, Some(StreamChannel::Stderr), "oops"));
        assert_eq!(
            renderer.pending_text(lines.clone().into_iter(), RunState::Running),
            "STDERR: oops\n[running]\n"
        );
        assert_eq!(renderer.pending_text(lines.into_iter(), RunState::Running), "");
    }

    #[test]
    fn hidden_lines_are_skipped_not_replayed() {
        let mut renderer = TerminalRenderer::new(true);
        let lines = vec![line(0, None, "a"), line(5, Some(StreamChannel::Stdout), "b")];
        assert_eq!(
            renderer.pending_text(lines.into_iter(), RunState::Idle),
            "a\nSTDOUT: b\n"
        );
        let later = vec![line(3, None, "late")];
        assert_eq!(renderer.pending_text(later.into_iter(), RunState::Idle), "");
    }

    #[test]
    fn follows_state_log_incrementally() {
        let mut renderer = TerminalRenderer::new(true);
        let (state, _) = update(
            AppState::new(),
            Msg::DataFileSelected("/work/Dish220615_03.txt".to_string()),
        );
        let first = renderer.pending_text(state.output_since(renderer.next_seq), state.run_state());
        assert_eq!(first, "Selected file: /work/Dish220615_03.txt\n");

        let (state, _) = update(state, Msg::ClearOutputClicked);
        let (state, _) = update(state, Msg::DataFileSelected("/work/b.txt".to_string()));
        let second = renderer.pending_text(state.output_since(renderer.next_seq), state.run_state());
        assert_eq!(second, "Selected file: /work/b.txt\n");
    }

    #[test]
    fn option_table_marks_enabled_rows() {
        let (state, _) = update(
            AppState::new(),
            Msg::OptionValueChanged {
                key: "-ezConAntPluck".to_string(),
                value: "29".to_string(),
            },
        );
        let (state, _) = update(
            state,
            Msg::OptionToggled {
                key: "-ezConAntPluck".to_string(),
                enabled: true,
            },
        );
        let text = render_options(&state.view());
        assert!(text.contains("[x] -ezConAntPluck"));
        assert!(text.contains("(unsaved changes)"));
    }

    #[test]
    fn display_fields_show_defaults() {
        let defaults = DefaultsCatalog::parse("-ezRAObsName Lebanon Kansas\n");
        let (state, _) = update(AppState::new(), Msg::DefaultsLoaded(defaults));
        let text = render_display_fields(&state.view());
        assert!(text.contains("Observer Name:"));
        assert!(text.contains("Lebanon Kansas"));
    }
}
