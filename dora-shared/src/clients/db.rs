use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

const POOL_MAX_SIZE: u32 = 10;

/// Build the r2d2 Postgres pool. Connections are validated on checkout
/// so a dropped backend surfaces as a pool error, not a query error.
pub fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .min_idle(Some(2))
        .test_on_check_out(true)
        .build(manager)?;

    tracing::info!(max_size = POOL_MAX_SIZE, "database connection pool created");
    Ok(pool)
}
