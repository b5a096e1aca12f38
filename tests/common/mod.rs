#![allow(dead_code)]

use diesel::connection::SimpleConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

use medequip_erp::db::{DbPool, establish_connection_pool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// A migrated SQLite database living in a temporary directory that is
/// removed when the value is dropped.
pub struct TestDb {
    pool: DbPool,
    path: String,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name).to_string_lossy().into_owned();
        let pool = establish_connection_pool(&path).expect("build pool");
        {
            let mut conn = pool.get().expect("get connection");
            conn.run_pending_migrations(MIGRATIONS)
                .expect("run migrations");
        }
        Self {
            pool,
            path,
            _dir: dir,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Runs raw SQL, used to seed tables the API cannot write directly.
    pub fn execute(&self, sql: &str) {
        let mut conn = self.pool.get().expect("get connection");
        conn.batch_execute(sql).expect("execute sql");
    }
}
