#![allow(dead_code)]

use std::path::PathBuf;

use steps_core::DayCode;
use tempfile::TempDir;
use steps_db::Db;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn day(value: &str) -> DayCode {
    DayCode::parse(value).expect("day code")
}
