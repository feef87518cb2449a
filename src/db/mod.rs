use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use std::ops::{Deref, DerefMut};

use crate::config::Settings;
use crate::types::ApiError;

pub mod schema;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub struct DbConnection(pub PooledConnection<ConnectionManager<PgConnection>>);

error_chain! {
    foreign_links {
        R2D2(r2d2::Error);
    }
}

impl DbConnection {
    /// Checks a connection out of the managed pool. Handlers call this only
    /// after their input has been validated. An exhausted or unreachable pool
    /// surfaces as `ApiError::Pool`, i.e. 503.
    pub fn checkout(pool: &Pool) -> std::result::Result<DbConnection, ApiError> {
        Ok(DbConnection(pool.get()?))
    }
}

// For the convenience of using a DbConnection wherever Diesel wants a
// &mut PgConnection.
impl Deref for DbConnection {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

fn builder(settings: &Settings) -> r2d2::Builder<ConnectionManager<PgConnection>> {
    Pool::builder()
        .max_size(settings.pool_size)
        .connection_timeout(settings.connection_timeout)
}

/// Builds the pool and waits for its initial connections, so a bad
/// `DATABASE_URL` fails at startup.
pub fn init_pool(settings: &Settings) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(settings.database_url.as_str());
    Ok(builder(settings).build(manager)?)
}

/// Builds a pool that opens no connection until one is requested.
pub fn lazy_pool(settings: &Settings) -> Pool {
    let manager = ConnectionManager::<PgConnection>::new(settings.database_url.as_str());
    builder(settings).min_idle(Some(0)).build_unchecked(manager)
}
