//! Loans repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use validator::Validate;

use super::{ensure_affected, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::loan::{BookLoan, NewBookLoan},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool,
}

impl LoansRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Loans not yet returned
    pub async fn find_active(&self) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>(
            "SELECT * FROM book_loans WHERE return_date IS NULL ORDER BY due_date, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Active loans whose due date is before `today`
    pub async fn find_overdue(&self, today: NaiveDate) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>(
            r#"
            SELECT * FROM book_loans
            WHERE return_date IS NULL AND due_date < ?
            ORDER BY due_date, id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    pub async fn find_by_borrower(&self, borrower_id: i64) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>(
            "SELECT * FROM book_loans WHERE borrower_id = ? ORDER BY loan_date DESC, id",
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    pub async fn find_by_book(&self, book_id: i64) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>(
            "SELECT * FROM book_loans WHERE book_id = ? ORDER BY loan_date DESC, id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    pub async fn find_by_library(&self, library_id: i64) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>(
            "SELECT * FROM book_loans WHERE library_id = ? ORDER BY loan_date DESC, id",
        )
        .bind(library_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Active loans recorded under an exact borrower name
    pub async fn find_active_by_borrower_name(&self, name: &str) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>(
            r#"
            SELECT * FROM book_loans
            WHERE borrower_name = ? AND return_date IS NULL
            ORDER BY due_date, id
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    pub async fn find_by_processed_by(&self, librarian_id: i64) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>(
            "SELECT * FROM book_loans WHERE processed_by_id = ? ORDER BY loan_date DESC, id",
        )
        .bind(librarian_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }
}

#[async_trait]
impl CrudRepository for LoansRepository {
    type Entity = BookLoan;
    type New = NewBookLoan;

    const ENTITY: &'static str = "BookLoan";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<BookLoan>> {
        let loan = sqlx::query_as::<_, BookLoan>("SELECT * FROM book_loans WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    async fn find_all(&self) -> AppResult<Vec<BookLoan>> {
        let loans = sqlx::query_as::<_, BookLoan>("SELECT * FROM book_loans ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM book_loans")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewBookLoan) -> AppResult<BookLoan> {
        new.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO book_loans (loan_date, due_date, borrower_name, borrower_email,
                                    borrower_phone, notes, book_id, library_id, borrower_id,
                                    processed_by_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.loan_date)
        .bind(new.due_date)
        .bind(&new.borrower_name)
        .bind(&new.borrower_email)
        .bind(&new.borrower_phone)
        .bind(&new.notes)
        .bind(new.book_id)
        .bind(new.library_id)
        .bind(new.borrower_id)
        .bind(new.processed_by_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    async fn update(&self, loan: &BookLoan) -> AppResult<BookLoan> {
        loan.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE book_loans SET
                loan_date = ?, due_date = ?, return_date = ?, borrower_name = ?,
                borrower_email = ?, borrower_phone = ?, fine_amount = ?, notes = ?,
                book_id = ?, library_id = ?, borrower_id = ?, processed_by_id = ?
            WHERE id = ?
            "#,
        )
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(&loan.borrower_name)
        .bind(&loan.borrower_email)
        .bind(&loan.borrower_phone)
        .bind(loan.fine_amount)
        .bind(&loan.notes)
        .bind(loan.book_id)
        .bind(loan.library_id)
        .bind(loan.borrower_id)
        .bind(loan.processed_by_id)
        .bind(loan.id)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, loan.id)?;

        self.get_by_id(loan.id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_loans WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
