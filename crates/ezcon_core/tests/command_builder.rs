use std::path::Path;

use ezcon_core::{build_invocation, BaseInvocation, ConfigSnapshot, OPTION_CATALOG};
use pretty_assertions::assert_eq;

fn base() -> BaseInvocation {
    BaseInvocation::new("python3", "/work/ezCon.py")
}

fn fully_populated(enabled: bool) -> ConfigSnapshot {
    let mut snapshot = ConfigSnapshot::new();
    for (index, spec) in OPTION_CATALOG.iter().enumerate() {
        snapshot.set_value(spec.key, &format!("{index} {}", index + 1));
        snapshot.set_enabled(spec.key, enabled);
    }
    snapshot
}

#[test]
fn disabled_options_never_reach_the_command() {
    let invocation = build_invocation(&base(), "data.txt", &fully_populated(false));
    assert_eq!(
        invocation.tokens().to_vec(),
        vec!["python3", "/work/ezCon.py", "data.txt"]
    );
}

#[test]
fn enabled_options_follow_catalog_order_then_extras() {
    let mut snapshot = fully_populated(true);
    snapshot.set_value("-ezConZeta", "z");
    snapshot.set_enabled("-ezConZeta", true);
    snapshot.set_value("-ezConAlpha", "a");
    snapshot.set_enabled("-ezConAlpha", true);

    let invocation = build_invocation(&base(), "data.txt", &snapshot);
    let keys: Vec<&str> = invocation
        .args()
        .iter()
        .map(String::as_str)
        .filter(|token| token.starts_with('-'))
        .collect();

    let mut expected: Vec<&str> = OPTION_CATALOG.iter().map(|spec| spec.key).collect();
    expected.push("-ezConZeta");
    expected.push("-ezConAlpha");
    assert_eq!(keys, expected);
    assert_eq!(invocation.program(), "python3");
}

#[test]
fn same_snapshot_builds_same_invocation() {
    let snapshot = fully_populated(true);
    let first = build_invocation(&base(), "data.txt", &snapshot);
    let second = build_invocation(&base(), "data.txt", &snapshot.clone());
    assert_eq!(first, second);
}

#[test]
fn primary_argument_is_relative_inside_working_dir() {
    let primary =
        ezcon_core::primary_argument_for(Path::new("/work"), Path::new("/work/sub/Dish.txt"));
    assert_eq!(Path::new(&primary), Path::new("sub").join("Dish.txt"));
}
