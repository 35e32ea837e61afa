//! Publisher service

use super::found;
use crate::{
    error::AppResult,
    models::publisher::{NewPublisher, Publisher},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct PublishersService {
    repository: Repository,
}

impl PublishersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Publisher>> {
        self.repository.publishers.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Publisher> {
        let publisher = self.repository.publishers.find_by_id(id).await?;
        found("Publisher", id, publisher)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.publishers.count().await
    }

    pub async fn create(&self, publisher: &NewPublisher) -> AppResult<Publisher> {
        tracing::info!("Creating publisher: {}", publisher.name);
        self.repository.publishers.create(publisher).await
    }

    /// Books dropped from `book_ids` are deleted along with their loans
    pub async fn update(&self, publisher: &Publisher) -> AppResult<Publisher> {
        tracing::info!("Updating publisher {}: {}", publisher.id, publisher.name);
        self.repository.publishers.update(publisher).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting publisher {} and its books", id);
        self.repository.publishers.delete(id).await
    }

    pub async fn search_by_name(&self, name: &str) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.search_by_name(name).await
    }

    pub async fn search_by_city(&self, city: &str) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.search_by_city(city).await
    }

    pub async fn find_by_country(&self, country: &str) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.find_by_country(country).await
    }
}
