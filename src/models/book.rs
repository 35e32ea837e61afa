//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::author::Author;
use super::loan::BookLoan;
use super::validation::{self, not_blank, on_field, ISBN_RE};

/// Book as stored, with the ids of its linked authors and loans
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "book_rules"))]
pub struct Book {
    pub id: i64,
    #[validate(
        length(min = 1, max = 200, message = "Title must not exceed 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    /// Display credit as printed on the cover
    #[validate(
        length(min = 1, max = 100, message = "Author must not exceed 100 characters"),
        custom(function = "not_blank")
    )]
    pub author: String,
    #[validate(regex(path = *ISBN_RE, message = "ISBN must be 10-13 digits"))]
    pub isbn: String,
    pub publication_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 9999, message = "Page count must be between 0 and 9999"))]
    pub page_count: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: Option<f64>,
    pub is_available: bool,
    pub due_date: Option<NaiveDate>,
    pub publisher_id: Option<i64>,
    #[sqlx(skip)]
    #[serde(default)]
    pub author_ids: Vec<i64>,
    #[sqlx(skip)]
    #[serde(default)]
    pub loan_ids: Vec<i64>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "new_book_rules"))]
pub struct NewBook {
    #[validate(
        length(min = 1, max = 200, message = "Title must not exceed 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[validate(
        length(min = 1, max = 100, message = "Author must not exceed 100 characters"),
        custom(function = "not_blank")
    )]
    pub author: String,
    #[validate(regex(path = *ISBN_RE, message = "ISBN must be 10-13 digits"))]
    pub isbn: String,
    pub publication_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 9999, message = "Page count must be between 0 and 9999"))]
    pub page_count: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: Option<f64>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub due_date: Option<NaiveDate>,
    pub publisher_id: Option<i64>,
    /// Authors to link on insert
    #[serde(default)]
    pub author_ids: Vec<i64>,
}

fn default_available() -> bool {
    true
}

fn date_and_price_rules(
    publication_date: Option<NaiveDate>,
    price: Option<f64>,
    due_date: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if let Some(date) = publication_date {
        on_field("publication_date", validation::past_or_present(&date))?;
    }
    if let Some(price) = price {
        on_field("price", validation::price_digits(price))?;
    }
    if let Some(date) = due_date {
        on_field("due_date", validation::future(&date))?;
    }
    Ok(())
}

fn book_rules(book: &Book) -> Result<(), ValidationError> {
    date_and_price_rules(book.publication_date, book.price, book.due_date)
}

fn new_book_rules(book: &NewBook) -> Result<(), ValidationError> {
    date_and_price_rules(book.publication_date, book.price, book.due_date)
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            publication_date: None,
            page_count: None,
            price: None,
            is_available: true,
            due_date: None,
            publisher_id: None,
            author_ids: Vec::new(),
        }
    }
}

impl Book {
    /// Links an author on both sides
    pub fn add_author(&mut self, author: &mut Author) {
        if !self.author_ids.contains(&author.id) {
            self.author_ids.push(author.id);
        }
        if !author.book_ids.contains(&self.id) {
            author.book_ids.push(self.id);
        }
    }

    /// Unlinks an author on both sides
    pub fn remove_author(&mut self, author: &mut Author) {
        self.author_ids.retain(|id| *id != author.id);
        author.book_ids.retain(|id| *id != self.id);
    }

    pub fn add_loan(&mut self, loan: &mut BookLoan) {
        if !self.loan_ids.contains(&loan.id) {
            self.loan_ids.push(loan.id);
        }
        loan.book_id = Some(self.id);
    }

    /// Detaches a loan; it becomes an orphan and is deleted on the next update of this book
    pub fn remove_loan(&mut self, loan: &mut BookLoan) {
        if self.loan_ids.contains(&loan.id) {
            self.loan_ids.retain(|id| *id != loan.id);
            loan.book_id = None;
        }
    }

    pub fn loan_count(&self) -> usize {
        self.loan_ids.len()
    }
}

/// Books are equal when they carry the same ISBN
impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.isbn == other.isbn
    }
}

impl Eq for Book {}

impl std::hash::Hash for Book {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.isbn.hash(state);
    }
}

#[cfg(test)]
pub(crate) fn sample_book(id: i64, isbn: &str) -> Book {
    Book {
        id,
        title: "Clean Code".to_string(),
        author: "Robert C. Martin".to_string(),
        isbn: isbn.to_string(),
        publication_date: NaiveDate::from_ymd_opt(2008, 8, 1),
        page_count: Some(464),
        price: Some(42.5),
        is_available: true,
        due_date: None,
        publisher_id: None,
        author_ids: Vec::new(),
        loan_ids: Vec::new(),
    }
}
