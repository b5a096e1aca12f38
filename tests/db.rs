use diesel::prelude::*;
use diesel::sql_types::Text;

mod common;

#[derive(QueryableByName)]
struct Pragma {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}

#[test]
fn test_creates_and_removes_db_files() {
    let path;
    {
        let test_db = common::TestDb::new("test_creates_and_removes_db_files.db");
        path = test_db.path().to_string();
        assert!(test_db.pool().get().is_ok());
        assert!(std::path::Path::new(&path).exists());
    }
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_primary_pool_uses_wal() {
    let test_db = common::TestDb::new("test_primary_pool_uses_wal.db");
    let mut conn = test_db.pool().get().unwrap();
    let pragma = diesel::sql_query("PRAGMA journal_mode")
        .get_result::<Pragma>(&mut conn)
        .unwrap();
    assert_eq!(pragma.journal_mode.to_lowercase(), "wal");
}
