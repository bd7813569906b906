use projects_core::db::migrations::latest_version;
use projects_core::db::{open_db, open_db_in_memory, DbError};
use projects_core::{
    ConnectionProvider, RepoError, SqliteConnectionProvider, SqliteProjectRepository,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["project", "step", "material", "category", "project_category"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opened_connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO material (project_id, material_name) VALUES (999, 'orphan');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn provider_hands_out_fresh_connections_to_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let provider = SqliteConnectionProvider::new(dir.path().join("projects.sqlite3"));

    let first = provider.get_connection().unwrap();
    first
        .execute("INSERT INTO category (category_name) VALUES ('Wood');", [])
        .unwrap();
    drop(first);

    let second = provider.get_connection().unwrap();
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM category;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(schema_version(&second), latest_version());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreachable_store_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider =
        SqliteConnectionProvider::new(dir.path().join("missing").join("projects.sqlite3"));

    let err = SqliteProjectRepository::try_new(provider).err().unwrap();
    assert!(matches!(err, RepoError::Connection(DbError::Sqlite(_))));
    assert_eq!(err.code(), "connection_failed");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
