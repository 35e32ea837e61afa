//! Author service

use super::found;
use crate::{
    error::AppResult,
    models::author::{Author, NewAuthor},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Author>> {
        self.repository.authors.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        let author = self.repository.authors.find_by_id(id).await?;
        found("Author", id, author)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.authors.count().await
    }

    pub async fn create(&self, author: &NewAuthor) -> AppResult<Author> {
        tracing::info!("Creating author: {} {}", author.first_name, author.last_name);
        self.repository.authors.create(author).await
    }

    pub async fn update(&self, author: &Author) -> AppResult<Author> {
        tracing::info!("Updating author {}: {}", author.id, author.full_name());
        self.repository.authors.update(author).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting author {}", id);
        self.repository.authors.delete(id).await
    }

    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<Author>> {
        self.repository.authors.search_by_last_name(last_name).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Author>> {
        self.repository.authors.find_by_email(email).await
    }
}
