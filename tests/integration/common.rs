//! Shared fixtures

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use bookloan_core::{
    clock::FixedClock,
    models::{Book, Borrower, Library, NewBook, NewBorrower, NewLibrary},
    repository::{self, Repository},
    services::Services,
};

/// Day the test clock is pinned to
pub fn t0() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
}

pub struct TestContext {
    pub repository: Repository,
    pub services: Services,
}

/// Fresh migrated in-memory database with services on a clock fixed at `today`
pub async fn setup_at(today: NaiveDate) -> TestContext {
    let pool = repository::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    let repository = Repository::new(pool);
    repository.migrate().await.expect("Failed to run migrations");
    let services = Services::new(repository.clone(), Arc::new(FixedClock(today)));
    TestContext {
        repository,
        services,
    }
}

pub async fn setup() -> TestContext {
    setup_at(t0()).await
}

pub async fn create_library(ctx: &TestContext, name: &str) -> Library {
    ctx.services
        .libraries
        .create(&NewLibrary::new(
            name,
            "100 Library Way",
            "Chicago",
            "IL",
            "60601",
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            500,
        ))
        .await
        .expect("Failed to create library")
}

pub async fn create_book(ctx: &TestContext, title: &str, isbn: &str) -> Book {
    ctx.services
        .books
        .create(&NewBook::new(title, "Robert C. Martin", isbn))
        .await
        .expect("Failed to create book")
}

pub async fn create_borrower(ctx: &TestContext, email: &str) -> Borrower {
    ctx.services
        .borrowers
        .create(&NewBorrower::new("John", "Doe", email, "555-123-4567"))
        .await
        .expect("Failed to create borrower")
}
