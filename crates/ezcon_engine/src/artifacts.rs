//! Output folder naming and relocation of the images ezCon writes.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use ezcon_core::FolderStyle;
use ezcon_logging::{ezcon_debug, ezcon_info, ezcon_warn};

use crate::error::ArtifactError;

/// Every output folder lives under this directory of the working directory.
pub const OUTPUT_ROOT_DIR: &str = "EZCONPNG_FILES";
pub const UNKNOWN_DATE_FOLDER: &str = "UnknownDate";
pub const ARTIFACT_EXTENSION: &str = "png";

/// Files moved by one `collect` call, plus the ones that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectReport {
    pub moved: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// First run of exactly six digits whose next character is not a digit.
///
/// Only the end of the run is checked, so "1234567_" yields "234567".
pub fn date_run_in_name(name: &str) -> Option<&str> {
    let bytes = name.as_bytes();
    if bytes.len() < 6 {
        return None;
    }
    (0..=bytes.len() - 6).find_map(|start| {
        let end = start + 6;
        let all_digits = bytes[start..end].iter().all(u8::is_ascii_digit);
        let followed_by_digit = bytes.get(end).is_some_and(u8::is_ascii_digit);
        (all_digits && !followed_by_digit).then(|| &name[start..end])
    })
}

/// Folder name for artifacts of a run over `source`.
pub fn output_folder_name(source: &Path, style: FolderStyle) -> String {
    match style {
        FolderStyle::DateFromMtime => mtime_folder(source, "%d%m%Y"),
        FolderStyle::DateFromName => {
            let base_name = source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match date_run_in_name(&base_name) {
                Some(run) if run.starts_with("20") => run.to_string(),
                Some(run) => format!("20{run}"),
                None => mtime_folder(source, "%Y%m%d"),
            }
        }
    }
}

/// `<working_dir>/EZCONPNG_FILES/<folder>`, without touching the filesystem.
pub fn output_directory(working_dir: &Path, source: &Path, style: FolderStyle) -> PathBuf {
    working_dir
        .join(OUTPUT_ROOT_DIR)
        .join(output_folder_name(source, style))
}

/// Computes the output directory for `source` and creates it.
pub fn resolve_output_directory(
    working_dir: &Path,
    source: &Path,
    style: FolderStyle,
) -> Result<PathBuf, ArtifactError> {
    let dir = output_directory(working_dir, source, style);
    fs::create_dir_all(&dir).map_err(|source| ArtifactError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    ezcon_info!("Output folder created: {}", dir.display());
    Ok(dir)
}

/// Moves images in `working_dir` modified at or after `since` into `output_dir`.
///
/// Only immediate regular files are considered, visited in name order. A file
/// that cannot be moved is logged and reported in `failed`; the rest still move.
pub fn collect(
    working_dir: &Path,
    output_dir: &Path,
    since: SystemTime,
) -> Result<CollectReport, ArtifactError> {
    let scan_error = |source| ArtifactError::Scan {
        path: working_dir.to_path_buf(),
        source,
    };
    let mut candidates = Vec::new();
    for entry in fs::read_dir(working_dir).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        let path = entry.path();
        if !is_artifact(&path) {
            continue;
        }
        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => {}
            _ => continue,
        }
        candidates.push(entry.file_name().to_string_lossy().into_owned());
    }
    candidates.sort();

    let mut report = CollectReport::default();
    for name in candidates {
        let from = working_dir.join(&name);
        let modified = match fs::metadata(&from).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                ezcon_warn!("Error moving file {name}: {err}");
                report.failed.push((name, err.to_string()));
                continue;
            }
        };
        if modified < since {
            continue;
        }
        match move_file(&from, &output_dir.join(&name)) {
            Ok(()) => {
                ezcon_debug!("moved {name} to {}", output_dir.display());
                report.moved.push(name);
            }
            Err(err) => {
                ezcon_warn!("Error moving file {name}: {err}");
                report.failed.push((name, err.to_string()));
            }
        }
    }
    ezcon_info!("Moved .{ARTIFACT_EXTENSION} files: {}", report.moved.join(", "));
    Ok(report)
}

fn is_artifact(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARTIFACT_EXTENSION))
}

fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Rename fails across filesystems; fall back to copy and delete.
    fs::copy(from, to)?;
    fs::remove_file(from)
}

fn mtime_folder(source: &Path, format: &str) -> String {
    match fs::metadata(source).and_then(|meta| meta.modified()) {
        Ok(modified) => DateTime::<Local>::from(modified).format(format).to_string(),
        Err(err) => {
            ezcon_warn!("Error determining subfolder name: {err}");
            UNKNOWN_DATE_FOLDER.to_string()
        }
    }
}
