//! # memoir-db
//!
//! Record store adapters for memoir.
//!
//! This crate provides:
//! - Connection pool management
//! - A PostgreSQL [`RecordRepository`] over the `autobiography` table
//! - An in-process [`RecordRepository`] for single-node and test use
//!
//! ## Example
//!
//! ```rust,ignore
//! use memoir_db::{AutobiographyRecord, Database, PoolConfig, RecordRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect_with_config("postgres://localhost/memoir", PoolConfig::from_env()).await?;
//!     db.migrate().await?;
//!
//!     let id = db.records.insert(&AutobiographyRecord::new_draft("user-1")).await?;
//!     println!("Created record: {}", id);
//!     Ok(())
//! }
//! ```
pub mod memory;
pub mod pool;
pub mod records;

// Note: Always compiled so integration tests (in tests/) can use it
pub mod test_fixtures;

// Re-export core types
pub use memoir_core::*;

pub use memory::MemoryRecordRepository;
pub use pool::{create_pool_with_config, log_pool_metrics, PoolConfig};
pub use records::PgRecordRepository;

/// Database context: the pool plus its repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Autobiography record repository.
    pub records: PgRecordRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            records: PgRecordRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
