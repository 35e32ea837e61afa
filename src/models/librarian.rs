//! Librarian (staff) model

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::loan::BookLoan;
use super::validation::{self, not_blank, on_field, STAFF_PHONE_RE};

/// Librarian employed at a library
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "librarian_rules"))]
pub struct Librarian {
    pub id: i64,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    #[validate(
        regex(path = *STAFF_PHONE_RE, message = "Phone number must be valid"),
        length(max = 20)
    )]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 20), custom(function = "not_blank"))]
    pub employee_id: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub position: String,
    pub hire_date: NaiveDate,
    #[validate(range(min = 0.0, message = "Salary must be non-negative"))]
    pub salary: Option<f64>,
    pub employed: bool,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub department: String,
    pub library_id: i64,
    /// Loans this librarian processed
    #[sqlx(skip)]
    #[serde(default)]
    pub processed_loan_ids: Vec<i64>,
}

/// Create librarian request
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "new_librarian_rules"))]
pub struct NewLibrarian {
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    #[validate(
        regex(path = *STAFF_PHONE_RE, message = "Phone number must be valid"),
        length(max = 20)
    )]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 20), custom(function = "not_blank"))]
    pub employee_id: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub position: String,
    pub hire_date: NaiveDate,
    #[validate(range(min = 0.0, message = "Salary must be non-negative"))]
    pub salary: Option<f64>,
    #[serde(default = "default_employed")]
    pub employed: bool,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub department: String,
    pub library_id: i64,
}

fn default_employed() -> bool {
    true
}

fn staff_rules(hire_date: NaiveDate, salary: Option<f64>) -> Result<(), ValidationError> {
    on_field("hire_date", validation::past_or_present(&hire_date))?;
    if let Some(salary) = salary {
        on_field("salary", validation::salary_digits(salary))?;
    }
    Ok(())
}

fn librarian_rules(librarian: &Librarian) -> Result<(), ValidationError> {
    staff_rules(librarian.hire_date, librarian.salary)
}

fn new_librarian_rules(librarian: &NewLibrarian) -> Result<(), ValidationError> {
    staff_rules(librarian.hire_date, librarian.salary)
}

impl Librarian {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whole years since the hire date
    pub fn years_of_service(&self, today: NaiveDate) -> u32 {
        let mut years = today.year() - self.hire_date.year();
        if (today.month(), today.day()) < (self.hire_date.month(), self.hire_date.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    pub fn processed_loans_count(&self) -> usize {
        self.processed_loan_ids.len()
    }

    pub fn add_processed_loan(&mut self, loan: &mut BookLoan) {
        if !self.processed_loan_ids.contains(&loan.id) {
            self.processed_loan_ids.push(loan.id);
        }
        loan.processed_by_id = Some(self.id);
    }

    pub fn remove_processed_loan(&mut self, loan: &mut BookLoan) {
        if self.processed_loan_ids.contains(&loan.id) {
            self.processed_loan_ids.retain(|id| *id != loan.id);
            loan.processed_by_id = None;
        }
    }
}

impl PartialEq for Librarian {
    fn eq(&self, other: &Self) -> bool {
        self.employee_id == other.employee_id
    }
}
