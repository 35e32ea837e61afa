//! Librarian (staff) service

use std::sync::Arc;

use super::found;
use crate::{
    clock::Clock,
    error::AppResult,
    models::librarian::{Librarian, NewLibrarian},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct LibrariansService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl LibrariansService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Librarian>> {
        self.repository.librarians.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Librarian> {
        let librarian = self.repository.librarians.find_by_id(id).await?;
        found("Librarian", id, librarian)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Librarian>> {
        self.repository.librarians.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.librarians.count().await
    }

    pub async fn create(&self, librarian: &NewLibrarian) -> AppResult<Librarian> {
        tracing::info!(
            "Creating librarian: {} {} ({})",
            librarian.first_name,
            librarian.last_name,
            librarian.employee_id
        );
        self.repository.librarians.create(librarian).await
    }

    pub async fn update(&self, librarian: &Librarian) -> AppResult<Librarian> {
        tracing::info!("Updating librarian {}: {}", librarian.id, librarian.employee_id);
        self.repository.librarians.update(librarian).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting librarian {}", id);
        self.repository.librarians.delete(id).await
    }

    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<Librarian>> {
        self.repository.librarians.search_by_last_name(last_name).await
    }

    pub async fn find_by_employee_id(&self, employee_id: &str) -> AppResult<Option<Librarian>> {
        self.repository.librarians.find_by_employee_id(employee_id).await
    }

    pub async fn find_employed(&self) -> AppResult<Vec<Librarian>> {
        self.repository.librarians.find_employed().await
    }

    pub async fn find_by_library(&self, library_id: i64) -> AppResult<Vec<Librarian>> {
        self.repository.librarians.find_by_library(library_id).await
    }

    pub async fn count_processed_loans(&self, librarian_id: i64) -> AppResult<i64> {
        self.repository.librarians.count_processed_loans(librarian_id).await
    }

    pub async fn count_active_processed_loans(&self, librarian_id: i64) -> AppResult<i64> {
        self.repository
            .librarians
            .count_active_processed_loans(librarian_id)
            .await
    }

    /// Whole years of service as of the service clock
    pub async fn years_of_service(&self, librarian_id: i64) -> AppResult<u32> {
        let librarian = self.get_by_id(librarian_id).await?;
        Ok(librarian.years_of_service(self.clock.today()))
    }
}
