use sqlite_orm_demo::demo::{self, sample_records};
use sqlite_orm_demo::{AppConfig, DemoApp, OrmResult, Record, Screen, SqliteConfig, SqliteService};
use tracing::level_filters::LevelFilter;

#[test]
fn demo_sequence_report() -> OrmResult<()> {
    let service = SqliteService::start(SqliteConfig::in_memory(sqlite_orm_demo::config::DEFAULT_MAPPING))?;
    service.create_schema::<Record>()?;
    let report = demo::run(&service.helper())?;

    let ids = |records: &[Record]| records.iter().map(|r| r.id).collect::<Vec<_>>();
    let mut all = ids(&report.all);
    all.sort();
    assert_eq!(report.cleared, 0);
    assert_eq!(all, vec![1, 2, 3]);
    assert_eq!(ids(&report.ordered_by_id_desc), vec![3, 2, 1]);
    let mut filtered = ids(&report.filtered);
    filtered.sort();
    assert_eq!(filtered, vec![2, 3]);
    assert_eq!(ids(&report.filtered_by_date_desc), vec![3, 2]);

    assert_eq!(report.fetched, sample_records()?[1]);
    assert!(report.updated.flag);
    assert_eq!(report.updated.value, 2.22);
    assert_eq!(report.updated.label, "A2");

    let mut remaining = ids(&report.remaining);
    remaining.sort();
    assert_eq!(remaining, vec![1, 3]);

    // A second run starts by clearing what the first one left.
    let again = demo::run(&service.helper())?;
    assert_eq!(again.cleared, 2);
    service.close()
}

#[test]
fn app_shows_captured_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(dir.path()).with_log_level(LevelFilter::INFO);
    let log_path = config.log_path();
    let mut app = DemoApp::new(config);

    let text = match app.on_create() {
        Screen::Log(text) => text,
        Screen::Notice(notice) => panic!("unexpected notice: {notice}"),
    };
    assert!(app.is_open());
    assert!(text.contains("-- deleting all existing Record objects --"));
    assert!(text.contains("-- get_object_by_id for id=2 after updating the object --"));
    assert!(text.contains(r#""label":"A2""#));
    assert!(!text.contains("DELETE FROM"));
    assert_eq!(std::fs::read_to_string(log_path).unwrap(), text);

    app.on_destroy();
    assert!(!app.is_open());
    app.on_destroy();
}

#[test]
fn debug_log_includes_statements() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = DemoApp::new(AppConfig::new(dir.path()));
    match app.on_create() {
        Screen::Log(text) => assert!(text.contains("UPDATE sample_record SET")),
        Screen::Notice(notice) => panic!("unexpected notice: {notice}"),
    }
}

#[test]
fn bad_mapping_shows_notice_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(dir.path()).with_mapping("CLASS Record\n");
    let mut app = DemoApp::new(config);

    match app.on_create() {
        Screen::Notice(notice) => {
            assert!(notice.starts_with("Exception: "));
            assert!(notice.contains("not terminated"));
        }
        Screen::Log(text) => panic!("expected a notice, got log:\n{text}"),
    }
    assert!(!app.is_open());
}

#[test]
fn unmapped_class_shows_notice() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(dir.path()).with_mapping("CLASS Other\nPRIMARY_KEY id\n;\n");
    let mut app = DemoApp::new(config);

    let screen = app.on_create();
    assert!(matches!(&screen, Screen::Notice(n) if n.contains("'Record' is not declared")));
    assert!(!app.is_open());
}

#[test]
fn failure_during_demo_shows_notice_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(dir.path()).with_force_create_schema(false);

    // Existing table whose rows cannot be updated, so the demo stops after the inserts.
    let conn = rusqlite::Connection::open(config.db_path()).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE sample_record (
            id INTEGER,
            label TEXT NOT NULL,
            date TEXT NOT NULL,
            flag INTEGER NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (id)
        );
        CREATE TRIGGER reject_update BEFORE UPDATE ON sample_record
        BEGIN
            SELECT RAISE(ABORT, 'updates are locked');
        END;
        "#,
    )
    .unwrap();
    conn.close().unwrap();

    let mut app = DemoApp::new(config);
    match app.on_create() {
        Screen::Notice(notice) => {
            assert!(notice.starts_with("Exception: "));
            assert!(notice.contains("updates are locked"));
        }
        Screen::Log(text) => panic!("expected a notice, got log:\n{text}"),
    }
    assert!(!app.is_open());
}

#[test]
fn unreadable_mapping_file_shows_notice() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(dir.path()).with_mapping_file(dir.path().join("missing.mapping"));
    let mut app = DemoApp::new(config);

    let screen = app.on_create();
    assert!(matches!(&screen, Screen::Notice(n) if n.starts_with("Exception: failed to load the mapping")));
    assert!(!app.is_open());
}

#[test]
fn second_create_restarts_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = DemoApp::new(AppConfig::new(dir.path()).with_log_level(LevelFilter::INFO));

    assert!(matches!(app.on_create(), Screen::Log(_)));
    assert!(app.is_open());
    match app.on_create() {
        Screen::Log(text) => assert!(text.contains("-- deleting all existing Record objects --")),
        Screen::Notice(notice) => panic!("unexpected notice: {notice}"),
    }
    assert!(app.is_open());
    app.on_destroy();
    assert!(!app.is_open());
}
