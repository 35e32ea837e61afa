//! Loan management service

use std::sync::Arc;

use chrono::NaiveDate;

use super::found;
use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::loan::{BookLoan, NewBookLoan},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl LoansService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<BookLoan>> {
        self.repository.loans.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<BookLoan> {
        let loan = self.repository.loans.find_by_id(id).await?;
        found("BookLoan", id, loan)
    }

    pub async fn find_all(&self) -> AppResult<Vec<BookLoan>> {
        self.repository.loans.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.loans.count().await
    }

    pub async fn create(&self, loan: &NewBookLoan) -> AppResult<BookLoan> {
        tracing::info!(
            "Creating loan of book {} at library {} for {}",
            loan.book_id,
            loan.library_id,
            loan.borrower_name
        );
        if loan.due_date < loan.loan_date {
            tracing::warn!(
                "Refusing loan due {} before its loan date {}",
                loan.due_date,
                loan.loan_date
            );
            return Err(AppError::BusinessRule(
                "Due date must not precede the loan date".to_string(),
            ));
        }
        self.repository.loans.create(loan).await
    }

    /// Creates a loan for a registered borrower, copying their contact details onto it
    pub async fn create_for_borrower(
        &self,
        book_id: i64,
        library_id: i64,
        borrower_id: i64,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<BookLoan> {
        let borrower = self.repository.borrowers.find_by_id(borrower_id).await?;
        let borrower = found("Borrower", borrower_id, borrower)?;
        let loan = NewBookLoan::for_borrower(book_id, library_id, &borrower, loan_date, due_date);
        self.create(&loan).await
    }

    pub async fn update(&self, loan: &BookLoan) -> AppResult<BookLoan> {
        tracing::info!("Updating loan {}", loan.id);
        self.repository.loans.update(loan).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting loan {}", id);
        self.repository.loans.delete(id).await
    }

    /// Marks the loan returned today and charges any overdue fine
    pub async fn return_loan(&self, id: i64) -> AppResult<BookLoan> {
        let mut loan = self.get_by_id(id).await?;
        let today = self.clock.today();

        if let Some(returned) = loan.return_date {
            tracing::warn!("Loan {} was already returned on {}", id, returned);
        }

        loan.return_book_on(today);
        if loan.fine_amount > 0.0 {
            tracing::info!(
                "Loan {} returned {} day(s) late, fine {:.2}",
                id,
                (today - loan.due_date).num_days(),
                loan.fine_amount
            );
        } else {
            tracing::info!("Loan {} returned on {}", id, today);
        }

        self.repository.loans.update(&loan).await
    }

    pub async fn find_active(&self) -> AppResult<Vec<BookLoan>> {
        self.repository.loans.find_active().await
    }

    /// Active loans past their due date as of the service clock
    pub async fn find_overdue(&self) -> AppResult<Vec<BookLoan>> {
        let today = self.clock.today();
        self.repository.loans.find_overdue(today).await
    }

    pub async fn find_by_borrower(&self, borrower_id: i64) -> AppResult<Vec<BookLoan>> {
        self.repository.loans.find_by_borrower(borrower_id).await
    }

    pub async fn find_by_book(&self, book_id: i64) -> AppResult<Vec<BookLoan>> {
        self.repository.loans.find_by_book(book_id).await
    }

    pub async fn find_by_library(&self, library_id: i64) -> AppResult<Vec<BookLoan>> {
        self.repository.loans.find_by_library(library_id).await
    }

    pub async fn find_active_by_borrower_name(&self, name: &str) -> AppResult<Vec<BookLoan>> {
        self.repository.loans.find_active_by_borrower_name(name).await
    }

    pub async fn find_by_processed_by(&self, librarian_id: i64) -> AppResult<Vec<BookLoan>> {
        self.repository.loans.find_by_processed_by(librarian_id).await
    }

    pub async fn is_overdue(&self, id: i64) -> AppResult<bool> {
        let loan = self.get_by_id(id).await?;
        Ok(loan.is_overdue_on(self.clock.today()))
    }
}
