//! Library branch service

use super::found;
use crate::{
    error::AppResult,
    models::library::{Library, NewLibrary},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct LibrariesService {
    repository: Repository,
}

impl LibrariesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Library>> {
        self.repository.libraries.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Library> {
        let library = self.repository.libraries.find_by_id(id).await?;
        found("Library", id, library)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Library>> {
        self.repository.libraries.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.libraries.count().await
    }

    pub async fn create(&self, library: &NewLibrary) -> AppResult<Library> {
        tracing::info!("Creating library: {}", library.name);
        self.repository.libraries.create(library).await
    }

    pub async fn update(&self, library: &Library) -> AppResult<Library> {
        tracing::info!("Updating library {}: {}", library.id, library.name);
        self.repository.libraries.update(library).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting library {}", id);
        self.repository.libraries.delete(id).await
    }

    pub async fn search_by_name(&self, name: &str) -> AppResult<Vec<Library>> {
        self.repository.libraries.search_by_name(name).await
    }

    pub async fn search_by_city(&self, city: &str) -> AppResult<Vec<Library>> {
        self.repository.libraries.search_by_city(city).await
    }

    pub async fn find_by_state(&self, state: &str) -> AppResult<Vec<Library>> {
        self.repository.libraries.find_by_state(state).await
    }

    pub async fn count_active_loans(&self, library_id: i64) -> AppResult<i64> {
        self.repository.libraries.count_active_loans(library_id).await
    }

    pub async fn count_total_loans(&self, library_id: i64) -> AppResult<i64> {
        self.repository.libraries.count_total_loans(library_id).await
    }
}
