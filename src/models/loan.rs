//! Book loan model and the return/overdue rule

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::borrower::Borrower;
use super::validation::{self, not_blank, on_field};

/// Fine charged per day a loan is overdue when it is returned
pub const FINE_PER_DAY: f64 = 1.0;

/// Loan of a book at a library
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "loan_rules"))]
pub struct BookLoan {
    pub id: i64,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Set once the book is back; a loan without it is active
    pub return_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub borrower_name: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub borrower_email: Option<String>,
    #[validate(length(max = 20))]
    pub borrower_phone: Option<String>,
    #[validate(range(min = 0.0, message = "Fine amount must be non-negative"))]
    pub fine_amount: f64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    pub book_id: Option<i64>,
    pub library_id: Option<i64>,
    pub borrower_id: Option<i64>,
    pub processed_by_id: Option<i64>,
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBookLoan {
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub borrower_name: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub borrower_email: Option<String>,
    #[validate(length(max = 20))]
    pub borrower_phone: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    pub book_id: i64,
    pub library_id: i64,
    pub borrower_id: Option<i64>,
    pub processed_by_id: Option<i64>,
}

fn loan_rules(loan: &BookLoan) -> Result<(), ValidationError> {
    on_field("fine_amount", validation::price_digits(loan.fine_amount))?;
    if loan.book_id.is_none() {
        return on_field("book", Err(ValidationError::new("required")));
    }
    if loan.library_id.is_none() {
        return on_field("library", Err(ValidationError::new("required")));
    }
    Ok(())
}

impl NewBookLoan {
    pub fn new(
        book_id: i64,
        library_id: i64,
        borrower_name: impl Into<String>,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            loan_date,
            due_date,
            borrower_name: borrower_name.into(),
            borrower_email: None,
            borrower_phone: None,
            notes: None,
            book_id,
            library_id,
            borrower_id: None,
            processed_by_id: None,
        }
    }

    /// Loan for a registered borrower, with their contact details copied onto it
    pub fn for_borrower(
        book_id: i64,
        library_id: i64,
        borrower: &Borrower,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            borrower_email: Some(borrower.email.clone()),
            borrower_phone: Some(borrower.phone_number.clone()),
            borrower_id: Some(borrower.id),
            ..Self::new(book_id, library_id, borrower.full_name(), loan_date, due_date)
        }
    }
}

impl BookLoan {
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.is_active() && today > self.due_date
    }

    pub fn days_overdue_on(&self, today: NaiveDate) -> i64 {
        if !self.is_overdue_on(today) {
            return 0;
        }
        (today - self.due_date).num_days()
    }

    /// Marks the loan returned on `today`.
    ///
    /// The overdue check runs before the return date is written, so a late return is fined
    /// `days_overdue * FINE_PER_DAY`. A second call is not refused: the return date moves and,
    /// since the loan is no longer active, the fine stays as it was.
    pub fn return_book_on(&mut self, today: NaiveDate) {
        let days_overdue = self.days_overdue_on(today);
        self.return_date = Some(today);
        if days_overdue > 0 {
            self.fine_amount = days_overdue as f64 * FINE_PER_DAY;
        }
    }

    /// Copies a borrower's contact details and links the loan to them
    pub fn for_borrower(&mut self, borrower: &Borrower) {
        self.borrower_name = borrower.full_name();
        self.borrower_email = Some(borrower.email.clone());
        self.borrower_phone = Some(borrower.phone_number.clone());
        self.borrower_id = Some(borrower.id);
    }
}

/// Same book, same library, same day, same borrower name
impl PartialEq for BookLoan {
    fn eq(&self, other: &Self) -> bool {
        self.book_id == other.book_id
            && self.library_id == other.library_id
            && self.loan_date == other.loan_date
            && self.borrower_name == other.borrower_name
    }
}

#[cfg(test)]
pub(crate) fn sample_loan(id: i64, loan_date: NaiveDate, due_date: NaiveDate) -> BookLoan {
    BookLoan {
        id,
        loan_date,
        due_date,
        return_date: None,
        borrower_name: "John Doe".to_string(),
        borrower_email: Some("john.doe@student.edu".to_string()),
        borrower_phone: Some("(555) 123-4567".to_string()),
        fine_amount: 0.0,
        notes: None,
        book_id: Some(1),
        library_id: Some(1),
        borrower_id: None,
        processed_by_id: None,
    }
}
