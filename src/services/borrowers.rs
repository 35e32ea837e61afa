//! Borrower service

use std::sync::Arc;

use super::found;
use crate::{
    clock::Clock,
    error::AppResult,
    models::borrower::{Borrower, NewBorrower},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct BorrowersService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl BorrowersService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Borrower>> {
        self.repository.borrowers.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Borrower> {
        let borrower = self.repository.borrowers.find_by_id(id).await?;
        found("Borrower", id, borrower)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Borrower>> {
        self.repository.borrowers.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.borrowers.count().await
    }

    pub async fn create(&self, borrower: &NewBorrower) -> AppResult<Borrower> {
        tracing::info!("Creating borrower: {}", borrower.email);
        self.repository.borrowers.create(borrower).await
    }

    /// Loans dropped from `loan_ids` are deleted
    pub async fn update(&self, borrower: &Borrower) -> AppResult<Borrower> {
        tracing::info!("Updating borrower {}: {}", borrower.id, borrower.email);
        self.repository.borrowers.update(borrower).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting borrower {} with their loans", id);
        self.repository.borrowers.delete(id).await
    }

    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<Borrower>> {
        self.repository.borrowers.search_by_last_name(last_name).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Borrower>> {
        self.repository.borrowers.find_by_email(email).await
    }

    pub async fn find_active_members(&self) -> AppResult<Vec<Borrower>> {
        self.repository.borrowers.find_active_members().await
    }

    pub async fn find_with_overdue_loans(&self) -> AppResult<Vec<Borrower>> {
        let today = self.clock.today();
        self.repository.borrowers.find_with_overdue_loans(today).await
    }

    pub async fn count_active_loans(&self, borrower_id: i64) -> AppResult<i64> {
        self.repository.borrowers.count_active_loans(borrower_id).await
    }
}
