use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::db::{Repository, SqliteRepository};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub repo: Arc<dyn Repository>,
    pub config: Config,
}

impl AppState {
    /// Wires the SQLite repository over an already migrated pool.
    pub fn new(db: DbPool, config: Config) -> Self {
        let repo: Arc<dyn Repository> = Arc::new(SqliteRepository::new(db.clone()));
        Self { db, repo, config }
    }
}
