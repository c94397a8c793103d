use std::path::Path;

use crate::config::ConfigSnapshot;

/// Interpreter and script that every invocation starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseInvocation {
    pub interpreter: String,
    pub target_path: String,
}

impl BaseInvocation {
    pub fn new(interpreter: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            target_path: target_path.into(),
        }
    }
}

/// Argv handed to the target program. Never a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    tokens: Vec<String>,
}

impl Invocation {
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Space-joined rendering for the command preview.
    pub fn preview(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Builds `[interpreter, target, primary, (key, value tokens...)*]`.
///
/// Options are visited in snapshot order; an option contributes only when it
/// is enabled and its value has at least one non-whitespace token.
pub fn build_invocation(
    base: &BaseInvocation,
    primary_argument: &str,
    snapshot: &ConfigSnapshot,
) -> Invocation {
    let mut tokens = vec![
        base.interpreter.clone(),
        base.target_path.clone(),
        primary_argument.to_string(),
    ];
    for (key, option) in snapshot.iter() {
        let values = option.tokens();
        if values.is_empty() {
            continue;
        }
        tokens.push(key.to_string());
        tokens.extend(values.into_iter().map(ToOwned::to_owned));
    }
    Invocation { tokens }
}

/// Data file argument as ezCon expects it: relative when inside the working directory.
pub fn primary_argument_for(working_dir: &Path, data_file: &Path) -> String {
    match data_file.strip_prefix(working_dir) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.display().to_string(),
        _ => data_file.display().to_string(),
    }
}
