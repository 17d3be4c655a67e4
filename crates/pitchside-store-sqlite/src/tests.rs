//! Integration tests for `SqliteStorage` against in-memory and on-disk
//! databases.

use pitchside_core::{
  Storage, StorageKey,
  roster::{Child, Group},
  user::Role,
};
use pitchside_store::{DomainStore, IdentityStore};

use crate::{Error, SqliteStorage};

fn storage() -> SqliteStorage {
  SqliteStorage::open_in_memory().expect("in-memory storage")
}

fn temp_db(name: &str) -> std::path::PathBuf {
  let path = std::env::temp_dir().join(format!(
    "pitchside-{name}-{}.sqlite",
    std::process::id()
  ));
  let _ = std::fs::remove_file(&path);
  path
}

// ─── Key-value ───────────────────────────────────────────────────────────────

#[test]
fn missing_key_is_none() {
  let s = storage();
  assert!(s.load(StorageKey::Groups).unwrap().is_none());
}

#[test]
fn save_overwrites_previous_value() {
  let s = storage();
  s.save(StorageKey::Groups, "[1]").unwrap();
  s.save(StorageKey::Groups, "[1,2]").unwrap();

  assert_eq!(s.load(StorageKey::Groups).unwrap().as_deref(), Some("[1,2]"));
  assert_eq!(s.stored_keys().unwrap(), ["groups"]);
}

#[test]
fn remove_is_idempotent() {
  let s = storage();
  s.save(StorageKey::CurrentSession, "\"user-1\"").unwrap();
  s.remove(StorageKey::CurrentSession).unwrap();
  s.remove(StorageKey::CurrentSession).unwrap();
  assert!(s.load(StorageKey::CurrentSession).unwrap().is_none());
}

#[test]
fn keys_are_independent() {
  let s = storage();
  s.save(StorageKey::Sessions, "[]").unwrap();
  s.save(StorageKey::Reports, "[{}]").unwrap();
  s.remove(StorageKey::Sessions).unwrap();

  assert_eq!(s.load(StorageKey::Reports).unwrap().as_deref(), Some("[{}]"));
  assert_eq!(s.stored_keys().unwrap(), ["reports"]);
}

#[test]
fn clones_share_the_connection() {
  let s = storage();
  let other = s.clone();
  s.save_json(StorageKey::Users, &Vec::<String>::new()).unwrap();
  assert_eq!(other.load(StorageKey::Users).unwrap().as_deref(), Some("[]"));
}

// ─── On disk ─────────────────────────────────────────────────────────────────

#[test]
fn values_survive_reopen() {
  let path = temp_db("reopen");
  {
    let s = SqliteStorage::open(&path).unwrap();
    s.save(StorageKey::Attendance, "[]").unwrap();
  }
  let s = SqliteStorage::open(&path).unwrap();
  assert_eq!(s.load(StorageKey::Attendance).unwrap().as_deref(), Some("[]"));
  drop(s);
  let _ = std::fs::remove_file(&path);
}

#[test]
fn newer_schema_is_refused() {
  let path = temp_db("schema");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 99;").unwrap();
  }
  let err = SqliteStorage::open(&path).err().unwrap();
  assert!(matches!(
    err,
    Error::UnsupportedSchema { found: 99, supported: 1 }
  ));
  let _ = std::fs::remove_file(&path);
}

// ─── Through the stores ──────────────────────────────────────────────────────

#[test]
fn domain_store_round_trips_through_sqlite() {
  let s = storage();
  {
    let mut store = DomainStore::open(s.clone()).unwrap();
    store
      .add_group(Group {
        id:         "g1".into(),
        name:       "U10".into(),
        trainer_id: "t1".into(),
      })
      .unwrap();
    store.add_child(Child::new("c1", "Ola", "p1")).unwrap();
  }

  let store = DomainStore::open(s.clone()).unwrap();
  assert_eq!(store.group(&"g1".into()).unwrap().name, "U10");
  assert_eq!(store.children_for_parent(&"p1".into()).len(), 1);

  let raw = s.load(StorageKey::Groups).unwrap().unwrap();
  let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
  assert_eq!(json[0]["trainerId"], "t1");
}

#[test]
fn identity_and_domain_share_one_database() {
  let s = storage();
  let mut identity = IdentityStore::open(s.clone()).unwrap();
  let user = identity
    .register("Anna", "anna@example.com", "secret", Role::Trainer)
    .unwrap();
  let mut domain = DomainStore::open(s.clone()).unwrap();
  domain
    .add_group(Group {
      id:         "g1".into(),
      name:       "U10".into(),
      trainer_id: user.id.clone(),
    })
    .unwrap();

  let identity = IdentityStore::open(s.clone()).unwrap();
  assert_eq!(identity.current_user().map(|u| &u.id), Some(&user.id));
  assert_eq!(
    s.stored_keys().unwrap(),
    ["current-session", "groups", "users"]
  );
}
