use holygrail_core::db::migrations::latest_version;
use holygrail_core::db::{open_db, open_db_in_memory, DbError};
use holygrail_core::{Grail, RepoError, SqliteStore, DEFAULT_REALM_DESCRIPTION};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "realms");
    assert_table_exists(&conn, "quests");
    assert_table_exists(&conn, "missions");
    assert_table_exists(&conn, "mission_tags");
}

#[test]
fn fresh_store_has_exactly_one_default_realm_at_position_zero() {
    let conn = open_db_in_memory().unwrap();
    let grail = Grail::new(&conn).unwrap();

    let realms = grail.views().list_realms(true).unwrap();
    assert_eq!(realms.len(), 1);
    assert_eq!(realms[0].description, DEFAULT_REALM_DESCRIPTION);
    assert_eq!(realms[0].position, 0);
    assert!(realms[0].is_default);
    assert!(!realms[0].is_hidden);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holygrail.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    Grail::new(&conn_first)
        .unwrap()
        .realms()
        .add_realm("work", false, false)
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let realms = Grail::new(&conn_second)
        .unwrap()
        .views()
        .list_realms(true)
        .unwrap();
    let positions: Vec<u32> = realms.iter().map(|realm| realm.position).collect();
    assert_eq!(positions, vec![0, 1]);
    assert_eq!(realms.iter().filter(|realm| realm.is_default).count(), 1);
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
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteStore::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}

#[test]
fn second_default_realm_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO realms (uuid, description, is_default, is_hidden, created_at, position)
             VALUES ('00000000-0000-4000-8000-000000000001', 'rogue', 1, 0, 0, 1);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("UNIQUE"));
}

#[test]
fn reset_wipes_records_and_reseeds_default_realm() {
    let conn = open_db_in_memory().unwrap();
    let grail = Grail::new(&conn).unwrap();
    let work = grail.realms().add_realm("work", false, true).unwrap();
    let quest = grail
        .quests()
        .add_quest(holygrail_core::NewQuest::new("move"))
        .unwrap();
    let mut request = holygrail_core::NewMission::new("pack");
    request.realm = Some(work.uuid);
    request.quest = Some(quest.uuid);
    let mission = grail.missions().add_mission(request).unwrap();
    grail.missions().add_tag(mission.uuid, "boxes").unwrap();

    grail.reset().unwrap();

    let realms = grail.views().list_realms(true).unwrap();
    assert_eq!(realms.len(), 1);
    assert!(realms[0].is_default);
    assert_eq!(realms[0].description, DEFAULT_REALM_DESCRIPTION);
    assert!(grail.views().list_missions(true).unwrap().is_empty());
    assert!(grail.views().list_quests(true).unwrap().is_empty());
    assert!(grail.views().missions_with_tag("boxes").unwrap().is_empty());
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
