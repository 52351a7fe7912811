//! Persistence seam. Each domain declares its own repository trait next to its
//! SQL (`recipes::repo`, `reviews::repo`, ...); `PgStore` implements all of
//! them on PostgreSQL and `MemoryStore` keeps the same contracts in process.

pub mod memory;

use sqlx::PgPool;
use thiserror::Error;

use crate::pantry::repo::PantryRepo;
use crate::planner::repo::PlannerRepo;
use crate::recipes::repo::RecipeRepo;
use crate::reviews::repo::ReviewLedgerRepo;
use crate::shopping::repo::ShoppingListRepo;

pub use memory::MemoryStore;

/// Postgres SQLSTATE for `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// Postgres SQLSTATE for `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Error, Debug)]
pub enum StoreError {
    /// An optimistic write lost against a concurrent writer. Safe to retry.
    #[error("concurrent modification detected")]
    Conflict,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if matches!(
                db.code().as_deref(),
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
            ) {
                return StoreError::Conflict;
            }
        }
        StoreError::Database(e)
    }
}

/// Everything the HTTP layer needs from a backing store.
pub trait Store:
    RecipeRepo + ReviewLedgerRepo + PantryRepo + ShoppingListRepo + PlannerRepo
{
}

impl<T> Store for T where
    T: RecipeRepo + ReviewLedgerRepo + PantryRepo + ShoppingListRepo + PlannerRepo
{
}

#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
