//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::book::Book;
use super::validation::{self, not_blank, on_field};

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "author_rules"))]
pub struct Author {
    pub id: i64,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 500, message = "Biography must not exceed 500 characters"))]
    pub biography: Option<String>,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub nationality: String,
    /// Books credited to this author; the book side owns the link
    #[sqlx(skip)]
    #[serde(default)]
    pub book_ids: Vec<i64>,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "new_author_rules"))]
pub struct NewAuthor {
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 500, message = "Biography must not exceed 500 characters"))]
    pub biography: Option<String>,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub nationality: String,
}

fn birth_date_rule(birth_date: Option<NaiveDate>) -> Result<(), ValidationError> {
    match birth_date {
        Some(date) => on_field("birth_date", validation::past(&date)),
        None => Ok(()),
    }
}

fn author_rules(author: &Author) -> Result<(), ValidationError> {
    birth_date_rule(author.birth_date)
}

fn new_author_rules(author: &NewAuthor) -> Result<(), ValidationError> {
    birth_date_rule(author.birth_date)
}

impl NewAuthor {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        nationality: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date: None,
            email: None,
            biography: None,
            nationality: nationality.into(),
        }
    }
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Mirror of [`Book::add_author`]
    pub fn add_book(&mut self, book: &mut Book) {
        book.add_author(self);
    }

    /// Mirror of [`Book::remove_author`]
    pub fn remove_book(&mut self, book: &mut Book) {
        book.remove_author(self);
    }
}

/// Authors match on email when both have one, otherwise on full name
impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        match (&self.email, &other.email) {
            (Some(a), Some(b)) => a == b,
            (Some(_), None) | (None, Some(_)) => false,
            (None, None) => {
                self.first_name == other.first_name && self.last_name == other.last_name
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_author(id: i64, email: Option<&str>) -> Author {
    Author {
        id,
        first_name: "Alice".to_string(),
        last_name: "Smith".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1970, 3, 14),
        email: email.map(str::to_string),
        biography: None,
        nationality: "USA".to_string(),
        book_ids: Vec::new(),
    }
}
