//! Business logic services

pub mod authors;
pub mod books;
pub mod borrowers;
pub mod groups;
pub mod librarians;
pub mod libraries;
pub mod loans;
pub mod publishers;
pub mod users;

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub authors: authors::AuthorsService,
    pub publishers: publishers::PublishersService,
    pub libraries: libraries::LibrariesService,
    pub librarians: librarians::LibrariansService,
    pub borrowers: borrowers::BorrowersService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub groups: groups::GroupsService,
}

impl Services {
    /// Create all services with the given repository and calendar
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            publishers: publishers::PublishersService::new(repository.clone()),
            libraries: libraries::LibrariesService::new(repository.clone()),
            librarians: librarians::LibrariansService::new(repository.clone(), clock.clone()),
            borrowers: borrowers::BorrowersService::new(repository.clone(), clock.clone()),
            loans: loans::LoansService::new(repository.clone(), clock),
            users: users::UsersService::new(repository.clone()),
            groups: groups::GroupsService::new(repository),
        }
    }
}

/// Turns a missed lookup into `NotFound`, logging it
pub(crate) fn found<T>(entity: &str, id: i64, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| {
        tracing::warn!("{} with id {} not found", entity, id);
        AppError::NotFound(format!("{} with id {} not found", entity, id))
    })
}
