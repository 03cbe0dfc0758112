use diesel_async::pooled_connection::deadpool;
use event_roster_assignment::StoreError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to create database pool {0}")]
    PoolBuild(#[from] deadpool::BuildError),
    #[error("Database pool failed {0}")]
    Pool(#[from] deadpool::PoolError),
    #[error("Database query failed {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Failed to encode rosters {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corrupt row in {table} with id {id}: {reason}")]
    CorruptRow {
        table: &'static str,
        id: i32,
        reason: String,
    },
}

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        Self::Backend(Box::new(error))
    }
}
