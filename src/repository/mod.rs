//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod borrowers;
pub mod groups;
pub mod librarians;
pub mod libraries;
pub mod loans;
pub mod publishers;
pub mod users;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

pub type Pool = SqlitePool;

/// Generic create/read/update/delete template shared by every entity repository
#[async_trait]
pub trait CrudRepository: Send + Sync {
    type Entity: Send;
    type New: Sync;

    /// Entity name used in error messages
    const ENTITY: &'static str;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Self::Entity>>;

    async fn get_by_id(&self, id: i64) -> AppResult<Self::Entity> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound(format!("{} with id {} not found", Self::ENTITY, id))
        })
    }

    async fn find_all(&self) -> AppResult<Vec<Self::Entity>>;

    async fn count(&self) -> AppResult<i64>;

    /// Validates, inserts and returns the stored entity with its generated id
    async fn create(&self, new: &Self::New) -> AppResult<Self::Entity>;

    /// Validates and merges the full entity, applying orphan removal to owned children
    async fn update(&self, entity: &Self::Entity) -> AppResult<Self::Entity>;

    /// Deletes by id; owned children go with it
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool,
    pub books: books::BooksRepository,
    pub authors: authors::AuthorsRepository,
    pub publishers: publishers::PublishersRepository,
    pub libraries: libraries::LibrariesRepository,
    pub librarians: librarians::LibrariansRepository,
    pub borrowers: borrowers::BorrowersRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
    pub groups: groups::GroupsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            publishers: publishers::PublishersRepository::new(pool.clone()),
            libraries: libraries::LibrariesRepository::new(pool.clone()),
            librarians: librarians::LibrariansRepository::new(pool.clone()),
            borrowers: borrowers::BorrowersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            groups: groups::GroupsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Applies the embedded migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Opens the pool described by `config`; foreign keys are enforced on every connection
pub async fn connect(config: &DatabaseConfig) -> AppResult<Pool> {
    let options = SqliteConnectOptions::from_str(&config.url)?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Single-connection in-memory pool, for tests
pub async fn connect_in_memory() -> AppResult<Pool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Builds `%value%` for substring `LIKE` matches
pub(crate) fn contains(value: &str) -> String {
    format!("%{}%", value)
}

/// Orphan removal for a one-to-many association.
///
/// Rows of `table` pointing at `parent_id` through `fk` that are not in `keep` are deleted;
/// rows listed in `keep` are attached to the parent.
pub(crate) async fn reconcile_children(
    conn: &mut SqliteConnection,
    table: &'static str,
    fk: &'static str,
    parent_id: i64,
    keep: &[i64],
) -> AppResult<()> {
    let current: Vec<i64> =
        sqlx::query_scalar(&format!("SELECT id FROM {} WHERE {} = ?", table, fk))
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?;

    for orphan in current.iter().filter(|id| !keep.contains(id)) {
        tracing::debug!("Removing orphan {} {} of parent {}", table, orphan, parent_id);
        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(orphan)
            .execute(&mut *conn)
            .await?;
    }

    for child in keep.iter().filter(|id| !current.contains(id)) {
        let result = sqlx::query(&format!("UPDATE {} SET {} = ? WHERE id = ?", table, fk))
            .bind(parent_id)
            .bind(child)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} row with id {} not found",
                table, child
            )));
        }
    }

    Ok(())
}

/// Maps an empty update or delete to `NotFound`
pub(crate) fn ensure_affected(rows: u64, entity: &str, id: i64) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::NotFound(format!("{} with id {} not found", entity, id)));
    }
    Ok(())
}
