//! Publisher model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::book::Book;
use super::validation::{self, not_blank, on_field, INTL_PHONE_RE};

/// Publisher record; owns its books
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "publisher_rules"))]
pub struct Publisher {
    pub id: i64,
    #[validate(
        length(min = 1, max = 100, message = "Publisher name must not exceed 100 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub address: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub city: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub country: String,
    #[validate(
        regex(path = *INTL_PHONE_RE, message = "Phone number must be valid"),
        length(max = 20)
    )]
    pub phone_number: Option<String>,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    pub founded_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub active: bool,
    /// Owned books; books dropped from this list are deleted on update
    #[sqlx(skip)]
    #[serde(default)]
    pub book_ids: Vec<i64>,
}

/// Create publisher request
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "new_publisher_rules"))]
pub struct NewPublisher {
    #[validate(
        length(min = 1, max = 100, message = "Publisher name must not exceed 100 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub address: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub city: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub country: String,
    #[validate(
        regex(path = *INTL_PHONE_RE, message = "Phone number must be valid"),
        length(max = 20)
    )]
    pub phone_number: Option<String>,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    pub founded_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

fn founded_rule(founded_date: Option<NaiveDate>) -> Result<(), ValidationError> {
    match founded_date {
        Some(date) => on_field("founded_date", validation::past(&date)),
        None => Ok(()),
    }
}

fn publisher_rules(publisher: &Publisher) -> Result<(), ValidationError> {
    founded_rule(publisher.founded_date)
}

fn new_publisher_rules(publisher: &NewPublisher) -> Result<(), ValidationError> {
    founded_rule(publisher.founded_date)
}

impl NewPublisher {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            city: city.into(),
            country: country.into(),
            phone_number: None,
            email: None,
            founded_date: None,
            description: None,
            active: true,
        }
    }
}

impl Publisher {
    pub fn add_book(&mut self, book: &mut Book) {
        if !self.book_ids.contains(&book.id) {
            self.book_ids.push(book.id);
        }
        book.publisher_id = Some(self.id);
    }

    pub fn remove_book(&mut self, book: &mut Book) {
        if self.book_ids.contains(&book.id) {
            self.book_ids.retain(|id| *id != book.id);
            book.publisher_id = None;
        }
    }
}

impl PartialEq for Publisher {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::sample_book;

    fn publisher(id: i64) -> Publisher {
        Publisher {
            id,
            name: "Tech Books Publishing".to_string(),
            address: "123 Tech Street".to_string(),
            city: "San Francisco".to_string(),
            country: "USA".to_string(),
            phone_number: Some("+14155550100".to_string()),
            email: Some("info@techbooks.com".to_string()),
            founded_date: NaiveDate::from_ymd_opt(1999, 1, 1),
            description: None,
            active: true,
            book_ids: Vec::new(),
        }
    }

    #[test]
    fn test_valid_publisher() {
        assert!(publisher(1).validate().is_ok());
    }

    #[test]
    fn test_bad_phone_rejected() {
        let mut p = publisher(1);
        p.phone_number = Some("(415) 555-0100".to_string());
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_book_ownership_sync() {
        let mut p = publisher(4);
        let mut book = sample_book(9, "1234567890");

        p.add_book(&mut book);
        assert_eq!(book.publisher_id, Some(4));
        assert_eq!(p.book_ids, vec![9]);

        p.remove_book(&mut book);
        assert_eq!(book.publisher_id, None);
        assert!(p.book_ids.is_empty());
    }
}
