//! Librarians repository for database operations

use async_trait::async_trait;
use validator::Validate;

use super::{contains, ensure_affected, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::librarian::{Librarian, NewLibrarian},
};

#[derive(Clone)]
pub struct LibrariansRepository {
    pool: Pool,
}

impl LibrariansRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn with_loans(&self, mut librarian: Librarian) -> AppResult<Librarian> {
        librarian.processed_loan_ids =
            sqlx::query_scalar("SELECT id FROM book_loans WHERE processed_by_id = ? ORDER BY id")
                .bind(librarian.id)
                .fetch_all(&self.pool)
                .await?;
        Ok(librarian)
    }

    async fn load_all(&self, librarians: Vec<Librarian>) -> AppResult<Vec<Librarian>> {
        let mut result = Vec::with_capacity(librarians.len());
        for librarian in librarians {
            result.push(self.with_loans(librarian).await?);
        }
        Ok(result)
    }

    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<Librarian>> {
        let librarians = sqlx::query_as::<_, Librarian>(
            "SELECT * FROM librarians WHERE last_name LIKE ? ORDER BY last_name, first_name",
        )
        .bind(contains(last_name))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(librarians).await
    }

    pub async fn find_by_employee_id(&self, employee_id: &str) -> AppResult<Option<Librarian>> {
        let librarian =
            sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE employee_id = ?")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?;
        match librarian {
            Some(librarian) => Ok(Some(self.with_loans(librarian).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_employed(&self) -> AppResult<Vec<Librarian>> {
        let librarians = sqlx::query_as::<_, Librarian>(
            "SELECT * FROM librarians WHERE employed = TRUE ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;
        self.load_all(librarians).await
    }

    pub async fn find_by_library(&self, library_id: i64) -> AppResult<Vec<Librarian>> {
        let librarians = sqlx::query_as::<_, Librarian>(
            "SELECT * FROM librarians WHERE library_id = ? ORDER BY last_name, first_name",
        )
        .bind(library_id)
        .fetch_all(&self.pool)
        .await?;
        self.load_all(librarians).await
    }

    pub async fn count_processed_loans(&self, librarian_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM book_loans WHERE processed_by_id = ?")
            .bind(librarian_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_active_processed_loans(&self, librarian_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE processed_by_id = ? AND return_date IS NULL",
        )
        .bind(librarian_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl CrudRepository for LibrariansRepository {
    type Entity = Librarian;
    type New = NewLibrarian;

    const ENTITY: &'static str = "Librarian";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Librarian>> {
        let librarian = sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match librarian {
            Some(librarian) => Ok(Some(self.with_loans(librarian).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<Librarian>> {
        let librarians = sqlx::query_as::<_, Librarian>("SELECT * FROM librarians ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.load_all(librarians).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM librarians")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewLibrarian) -> AppResult<Librarian> {
        new.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO librarians (first_name, last_name, email, phone_number, employee_id,
                                    position, hire_date, salary, employed, department, library_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone_number)
        .bind(&new.employee_id)
        .bind(&new.position)
        .bind(new.hire_date)
        .bind(new.salary)
        .bind(new.employed)
        .bind(&new.department)
        .bind(new.library_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// Processed loans are not owned and are left untouched
    async fn update(&self, librarian: &Librarian) -> AppResult<Librarian> {
        librarian.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE librarians SET
                first_name = ?, last_name = ?, email = ?, phone_number = ?, employee_id = ?,
                position = ?, hire_date = ?, salary = ?, employed = ?, department = ?,
                library_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&librarian.first_name)
        .bind(&librarian.last_name)
        .bind(&librarian.email)
        .bind(&librarian.phone_number)
        .bind(&librarian.employee_id)
        .bind(&librarian.position)
        .bind(librarian.hire_date)
        .bind(librarian.salary)
        .bind(librarian.employed)
        .bind(&librarian.department)
        .bind(librarian.library_id)
        .bind(librarian.id)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, librarian.id)?;

        self.get_by_id(librarian.id).await
    }

    /// Loans they processed keep existing with `processed_by_id` cleared
    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM librarians WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
