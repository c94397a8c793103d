use ezcon_core::{update, AppState, Effect, FolderStyle, Msg, SessionSnapshot};

fn init_logging() {
    ezcon_logging::initialize_for_tests();
}

#[test]
fn session_can_be_restored_for_resume() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::DataFileSelected("/work/Dish220615_03.txt".to_string()),
    );
    let snapshot = match &effects[..] {
        [Effect::PersistSession(snapshot)] => snapshot.clone(),
        other => panic!("unexpected effects {other:?}"),
    };
    let (_state, effects) = update(state, Msg::FolderStyleChanged(FolderStyle::DateFromMtime));
    let snapshot_after_style = match &effects[..] {
        [Effect::PersistSession(snapshot)] => snapshot.clone(),
        other => panic!("unexpected effects {other:?}"),
    };

    assert_eq!(snapshot.data_file.as_deref(), Some("/work/Dish220615_03.txt"));
    assert_eq!(snapshot.folder_style, FolderStyle::DateFromName);
    assert_eq!(snapshot_after_style.folder_style, FolderStyle::DateFromMtime);

    let (restored, effects) = update(AppState::new(), Msg::SessionRestored(snapshot_after_style.clone()));
    assert!(effects.is_empty());
    assert_eq!(restored.session_snapshot(), snapshot_after_style);
    let view = restored.view();
    assert_eq!(view.data_file.as_deref(), Some("/work/Dish220615_03.txt"));
    assert_eq!(view.folder_style, FolderStyle::DateFromMtime);
}

#[test]
fn restored_output_dir_survives_failed_run_without_dir() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::SessionRestored(SessionSnapshot {
            data_file: Some("d.txt".to_string()),
            folder_style: FolderStyle::DateFromName,
            last_output_dir: Some("/work/EZCONPNG_FILES/20220615".to_string()),
        }),
    );
    let (state, effects) = update(state, Msg::RunClicked);
    let run_id = match &effects[..] {
        [Effect::StartRun { run_id, .. }] => *run_id,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::RunCompleted {
            run_id,
            exit_code: 2,
            output_dir: None,
            relocated: Vec::new(),
        },
    );

    assert_eq!(
        state.session_snapshot().last_output_dir.as_deref(),
        Some("/work/EZCONPNG_FILES/20220615")
    );
}
