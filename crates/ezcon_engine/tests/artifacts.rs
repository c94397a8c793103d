use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use ezcon_core::FolderStyle;
use ezcon_engine::{collect, output_folder_name, resolve_output_directory, OUTPUT_ROOT_DIR};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    ezcon_logging::initialize_for_tests();
}

fn touch(path: &Path, modified: SystemTime) {
    let file = File::create(path).unwrap();
    file.set_modified(modified).unwrap();
}

fn fixed_time() -> SystemTime {
    // 2021-03-04T12:00:00Z, midday so no local offset changes the day.
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_614_859_200)
}

#[test]
fn name_with_date_run_wins_over_mtime() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("Dish220615_03.txt");
    touch(&source, fixed_time());

    assert_eq!(
        output_folder_name(&source, FolderStyle::DateFromName),
        "20220615"
    );
}

#[test]
fn name_without_date_run_falls_back_to_mtime() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("observation.txt");
    touch(&source, fixed_time());

    let expected = DateTime::<Local>::from(fixed_time())
        .format("%Y%m%d")
        .to_string();
    assert_eq!(output_folder_name(&source, FolderStyle::DateFromName), expected);
}

#[test]
fn mtime_style_ignores_name() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("Dish220615_03.txt");
    touch(&source, fixed_time());

    let expected = DateTime::<Local>::from(fixed_time())
        .format("%d%m%Y")
        .to_string();
    assert_eq!(
        output_folder_name(&source, FolderStyle::DateFromMtime),
        expected
    );
}

#[test]
fn resolve_creates_folder_under_output_root() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("Dish220615_03.txt");
    touch(&source, fixed_time());

    let dir = resolve_output_directory(temp.path(), &source, FolderStyle::DateFromName).unwrap();
    assert_eq!(dir, temp.path().join(OUTPUT_ROOT_DIR).join("20220615"));
    assert!(dir.is_dir());
}

#[test]
fn resolve_reports_blocked_folder() {
    init_logging();
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(OUTPUT_ROOT_DIR), "not a folder").unwrap();

    let result = resolve_output_directory(
        temp.path(),
        Path::new("Dish220615_03.txt"),
        FolderStyle::DateFromName,
    );
    assert!(result.is_err());
}

#[test]
fn collect_moves_only_images_from_this_run() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let work = temp.path();
    let out = work.join(OUTPUT_ROOT_DIR).join("20220615");
    fs::create_dir_all(&out).unwrap();

    let t0 = fixed_time();
    touch(&work.join("before.png"), t0 - Duration::from_secs(1));
    touch(&work.join("at_start.PNG"), t0);
    touch(&work.join("after.png"), t0 + Duration::from_secs(5));
    touch(&work.join("notes.txt"), t0 + Duration::from_secs(5));
    fs::create_dir(work.join("folder.png")).unwrap();

    let report = collect(work, &out, t0).unwrap();

    assert_eq!(report.moved, vec!["after.png", "at_start.PNG"]);
    assert!(report.failed.is_empty());
    assert!(work.join("before.png").exists());
    assert!(work.join("notes.txt").exists());
    assert!(out.join("after.png").exists());
    assert!(out.join("at_start.PNG").exists());

    let again = collect(work, &out, t0).unwrap();
    assert!(again.moved.is_empty());
}
