use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::AppResult;

const IN_MEMORY_URL: &str = "sqlite::memory:";

// The in-memory database lives exactly as long as its connection, so the pool
// must never reap or recycle it.
const CONNECTION_LIFETIME: Duration = Duration::from_secs(u32::MAX as u64);

/// Opens the live store: one in-memory SQLite connection shared by every
/// request. With a pool of one, all store access is serialized on it, and a
/// transaction holds it exclusively until commit or rollback.
pub async fn connect_and_migrate() -> AppResult<DatabaseConnection> {
    let mut opts = ConnectOptions::new(IN_MEMORY_URL);
    opts.max_connections(1)
        .min_connections(1)
        .idle_timeout(CONNECTION_LIFETIME)
        .max_lifetime(CONNECTION_LIFETIME)
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}
