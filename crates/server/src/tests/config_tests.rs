use super::{is_truthy, load_settings_from, normalize_database_url, prepare_database_url, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(None, env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.server_bind, "0.0.0.0:8000");
}

#[test]
fn file_values_are_overridden_by_env() {
    let file = r#"
        bind_addr = "127.0.0.1:9000"
        database_url = "sqlite://./file.db"
        debug = true
    "#;
    let from_file = load_settings_from(Some(file), env_from(&[]));
    assert_eq!(from_file.server_bind, "127.0.0.1:9000");
    assert_eq!(from_file.database_url, "sqlite://./file.db");
    assert!(from_file.debug);

    let overridden = load_settings_from(
        Some(file),
        env_from(&[
            ("SERVER_BIND", "127.0.0.1:1111"),
            ("APP__BIND_ADDR", "127.0.0.1:2222"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DEBUG", "off"),
        ]),
    );
    assert_eq!(overridden.server_bind, "127.0.0.1:2222");
    assert_eq!(overridden.database_url, "sqlite::memory:");
    assert!(!overridden.debug);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let settings = load_settings_from(Some("bind_addr = "), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn debug_flag_accepts_common_truthy_spellings() {
    for value in ["1", "true", "ON", " yes "] {
        assert!(is_truthy(value), "{value} should be truthy");
    }
    for value in ["", "0", "false", "nope"] {
        assert!(!is_truthy(value), "{value} should be falsy");
    }
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("  "), Settings::default().database_url);
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn creates_parent_dir_for_sqlite_url() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();

    let temp_root = env::temp_dir().join(format!("todo_server_config_test_{suffix}"));
    let db_path = temp_root.join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(temp_root.join("data").exists());

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn prepared_database_url_creates_openable_sqlite_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();

    let temp_root = env::temp_dir().join(format!("todo_server_open_test_{suffix}"));
    let db_path = temp_root.join("nested").join("server.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    let storage = storage::Storage::new(&prepared).await.expect("open sqlite");
    storage.pool().close().await;

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );

    fs::remove_dir_all(temp_root).expect("cleanup");
}
