//! Borrowers repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use validator::Validate;

use super::{contains, ensure_affected, reconcile_children, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::borrower::{Borrower, NewBorrower},
};

#[derive(Clone)]
pub struct BorrowersRepository {
    pool: Pool,
}

impl BorrowersRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn with_loans(&self, mut borrower: Borrower) -> AppResult<Borrower> {
        borrower.loan_ids =
            sqlx::query_scalar("SELECT id FROM book_loans WHERE borrower_id = ? ORDER BY id")
                .bind(borrower.id)
                .fetch_all(&self.pool)
                .await?;
        Ok(borrower)
    }

    async fn load_all(&self, borrowers: Vec<Borrower>) -> AppResult<Vec<Borrower>> {
        let mut result = Vec::with_capacity(borrowers.len());
        for borrower in borrowers {
            result.push(self.with_loans(borrower).await?);
        }
        Ok(result)
    }

    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<Borrower>> {
        let borrowers = sqlx::query_as::<_, Borrower>(
            "SELECT * FROM borrowers WHERE last_name LIKE ? ORDER BY last_name, first_name",
        )
        .bind(contains(last_name))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(borrowers).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Borrower>> {
        let borrower = sqlx::query_as::<_, Borrower>("SELECT * FROM borrowers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        match borrower {
            Some(borrower) => Ok(Some(self.with_loans(borrower).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_active_members(&self) -> AppResult<Vec<Borrower>> {
        let borrowers = sqlx::query_as::<_, Borrower>(
            "SELECT * FROM borrowers WHERE membership_active = TRUE ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;
        self.load_all(borrowers).await
    }

    /// Borrowers holding at least one loan overdue on `today`
    pub async fn find_with_overdue_loans(&self, today: NaiveDate) -> AppResult<Vec<Borrower>> {
        let borrowers = sqlx::query_as::<_, Borrower>(
            r#"
            SELECT DISTINCT b.* FROM borrowers b
            JOIN book_loans l ON l.borrower_id = b.id
            WHERE l.return_date IS NULL AND l.due_date < ?
            ORDER BY b.last_name, b.first_name
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        self.load_all(borrowers).await
    }

    pub async fn count_active_loans(&self, borrower_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE borrower_id = ? AND return_date IS NULL",
        )
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl CrudRepository for BorrowersRepository {
    type Entity = Borrower;
    type New = NewBorrower;

    const ENTITY: &'static str = "Borrower";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Borrower>> {
        let borrower = sqlx::query_as::<_, Borrower>("SELECT * FROM borrowers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match borrower {
            Some(borrower) => Ok(Some(self.with_loans(borrower).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<Borrower>> {
        let borrowers = sqlx::query_as::<_, Borrower>("SELECT * FROM borrowers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.load_all(borrowers).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM borrowers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewBorrower) -> AppResult<Borrower> {
        new.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO borrowers (first_name, last_name, email, phone_number, birth_date,
                                   address, city, state, zip_code, membership_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone_number)
        .bind(new.birth_date)
        .bind(&new.address)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.zip_code)
        .bind(new.membership_active)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// Loans no longer listed in `loan_ids` are deleted
    async fn update(&self, borrower: &Borrower) -> AppResult<Borrower> {
        borrower.validate()?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE borrowers SET
                first_name = ?, last_name = ?, email = ?, phone_number = ?, birth_date = ?,
                address = ?, city = ?, state = ?, zip_code = ?, membership_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&borrower.first_name)
        .bind(&borrower.last_name)
        .bind(&borrower.email)
        .bind(&borrower.phone_number)
        .bind(borrower.birth_date)
        .bind(&borrower.address)
        .bind(&borrower.city)
        .bind(&borrower.state)
        .bind(&borrower.zip_code)
        .bind(borrower.membership_active)
        .bind(borrower.id)
        .execute(&mut *tx)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, borrower.id)?;

        reconcile_children(&mut *tx, "book_loans", "borrower_id", borrower.id, &borrower.loan_ids)
            .await?;
        tx.commit().await?;

        self.get_by_id(borrower.id).await
    }

    /// Their loans and linked user account go with them
    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM borrowers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
