//! Libraries repository for database operations

use async_trait::async_trait;
use validator::Validate;

use super::{contains, ensure_affected, reconcile_children, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::library::{Library, NewLibrary},
};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool,
}

impl LibrariesRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn with_loans(&self, mut library: Library) -> AppResult<Library> {
        library.loan_ids =
            sqlx::query_scalar("SELECT id FROM book_loans WHERE library_id = ? ORDER BY id")
                .bind(library.id)
                .fetch_all(&self.pool)
                .await?;
        Ok(library)
    }

    async fn load_all(&self, libraries: Vec<Library>) -> AppResult<Vec<Library>> {
        let mut result = Vec::with_capacity(libraries.len());
        for library in libraries {
            result.push(self.with_loans(library).await?);
        }
        Ok(result)
    }

    pub async fn search_by_name(&self, name: &str) -> AppResult<Vec<Library>> {
        let libraries = sqlx::query_as::<_, Library>(
            "SELECT * FROM libraries WHERE name LIKE ? ORDER BY name",
        )
        .bind(contains(name))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(libraries).await
    }

    pub async fn search_by_city(&self, city: &str) -> AppResult<Vec<Library>> {
        let libraries = sqlx::query_as::<_, Library>(
            "SELECT * FROM libraries WHERE city LIKE ? ORDER BY name",
        )
        .bind(contains(city))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(libraries).await
    }

    pub async fn find_by_state(&self, state: &str) -> AppResult<Vec<Library>> {
        let libraries = sqlx::query_as::<_, Library>(
            "SELECT * FROM libraries WHERE state = ? ORDER BY name",
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await?;
        self.load_all(libraries).await
    }

    pub async fn count_active_loans(&self, library_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE library_id = ? AND return_date IS NULL",
        )
        .bind(library_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_total_loans(&self, library_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM book_loans WHERE library_id = ?")
            .bind(library_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CrudRepository for LibrariesRepository {
    type Entity = Library;
    type New = NewLibrary;

    const ENTITY: &'static str = "Library";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Library>> {
        let library = sqlx::query_as::<_, Library>("SELECT * FROM libraries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match library {
            Some(library) => Ok(Some(self.with_loans(library).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<Library>> {
        let libraries = sqlx::query_as::<_, Library>("SELECT * FROM libraries ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.load_all(libraries).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM libraries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewLibrary) -> AppResult<Library> {
        new.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO libraries (name, address, city, state, zip_code, phone_number, email,
                                   opening_time, closing_time, capacity, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.zip_code)
        .bind(&new.phone_number)
        .bind(&new.email)
        .bind(new.opening_time)
        .bind(new.closing_time)
        .bind(new.capacity)
        .bind(new.active)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// Loans no longer listed in `loan_ids` are deleted
    async fn update(&self, library: &Library) -> AppResult<Library> {
        library.validate()?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE libraries SET
                name = ?, address = ?, city = ?, state = ?, zip_code = ?, phone_number = ?,
                email = ?, opening_time = ?, closing_time = ?, capacity = ?, active = ?
            WHERE id = ?
            "#,
        )
        .bind(&library.name)
        .bind(&library.address)
        .bind(&library.city)
        .bind(&library.state)
        .bind(&library.zip_code)
        .bind(&library.phone_number)
        .bind(&library.email)
        .bind(library.opening_time)
        .bind(library.closing_time)
        .bind(library.capacity)
        .bind(library.active)
        .bind(library.id)
        .execute(&mut *tx)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, library.id)?;

        reconcile_children(&mut *tx, "book_loans", "library_id", library.id, &library.loan_ids)
            .await?;
        tx.commit().await?;

        self.get_by_id(library.id).await
    }

    /// Refused with `Conflict` while librarians are still assigned
    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
