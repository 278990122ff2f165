//! deadpool-postgres pools as backends.
//!
//! A [`Pool`] is a [`Backend`](crate::Backend) on its own: every statement checks
//! a client out and returns it. Use [`connect`] when a run of statements must share
//! one session, e.g. for temporary tables.

use crate::connection::Connection;
use crate::error::{SqlError, SqlResult};
use deadpool_postgres::{Client, Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Pool size used by [`create_pool`].
pub const DEFAULT_MAX_SIZE: usize = 16;

/// Pool of [`DEFAULT_MAX_SIZE`] plain-TCP clients for `database_url`.
///
/// No connection is opened until the first checkout.
pub fn create_pool(database_url: &str) -> SqlResult<Pool> {
    create_pool_with_config(database_url, DEFAULT_MAX_SIZE)
}

/// Like [`create_pool`] with an explicit size.
///
/// Returned clients are reset with `DISCARD ALL`, so session state such as
/// temporary tables never leaks to the next checkout.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> SqlResult<Pool> {
    let pg_config = database_url
        .parse::<tokio_postgres::Config>()
        .map_err(|e| SqlError::Connection(format!("invalid database url: {e}")))?;
    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Clean,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| SqlError::Pool(e.to_string()))
}

/// Pin one pooled client for the lifetime of the returned connection.
pub async fn connect(pool: &Pool) -> SqlResult<Connection<Client>> {
    Ok(Connection::new(pool.get().await?))
}
