use crate::config::config::Config;
use deadpool::managed::Object;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection,
};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub type DBPool = Pool<AsyncPgConnection>;
pub type DBConn = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("could not get database connection from pool: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("could not build the connection pool: {0}")]
    Build(#[from] diesel_async::pooled_connection::deadpool::BuildError),
    #[error("error executing query: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("transaction rolled back: {0}")]
    Transaction(diesel::result::Error),
    #[error("operation exceeded {0:?}")]
    Timeout(Duration),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl DatabaseError {
    /// Re-labels a statement failure that happened inside a transaction.
    pub(crate) fn rolled_back(self) -> Self {
        match self {
            DatabaseError::Query(e) => DatabaseError::Transaction(e),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

pub struct Database {
    pool: DBPool,
    query_timeout: Duration,
}

impl Database {
    /// Builds the pool. Connections are opened lazily on first use.
    pub fn new(config: &Config) -> Result<Self> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.as_str());
        let pool = Pool::builder(manager)
            .max_size(config.db_pool_max_size)
            .build()?;
        Ok(Database {
            pool,
            query_timeout: config.db_query_timeout,
        })
    }

    pub(crate) async fn get_db_conn(&self) -> Result<DBConn> {
        Ok(self.pool.get().await?)
    }

    /// Runs one repository operation, checkout included, under the configured timeout.
    pub(crate) async fn bounded<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.query_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(self.query_timeout)),
        }
    }
}
