//! Borrower (library patron) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::loan::BookLoan;
use super::validation::{self, not_blank, on_field, BORROWER_PHONE_RE, STATE_CODE_RE, ZIP_RE};

/// Library patron; owns their loans
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "borrower_rules"))]
pub struct Borrower {
    pub id: i64,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: String,
    #[validate(
        regex(
            path = *BORROWER_PHONE_RE,
            message = "Phone must be in format XXX-XXX-XXXX, (XXX) XXX-XXXX, or XXXXXXXXXX"
        ),
        length(max = 20)
    )]
    pub phone_number: String,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[validate(regex(path = *STATE_CODE_RE, message = "State must be 2 uppercase letters"))]
    pub state: Option<String>,
    #[validate(regex(path = *ZIP_RE, message = "Zip code must be in format XXXXX or XXXXX-XXXX"))]
    pub zip_code: Option<String>,
    pub membership_active: bool,
    #[sqlx(skip)]
    #[serde(default)]
    pub loan_ids: Vec<i64>,
}

/// Create borrower request
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "new_borrower_rules"))]
pub struct NewBorrower {
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: String,
    #[validate(
        regex(
            path = *BORROWER_PHONE_RE,
            message = "Phone must be in format XXX-XXX-XXXX, (XXX) XXX-XXXX, or XXXXXXXXXX"
        ),
        length(max = 20)
    )]
    pub phone_number: String,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[validate(regex(path = *STATE_CODE_RE, message = "State must be 2 uppercase letters"))]
    pub state: Option<String>,
    #[validate(regex(path = *ZIP_RE, message = "Zip code must be in format XXXXX or XXXXX-XXXX"))]
    pub zip_code: Option<String>,
    #[serde(default = "default_active")]
    pub membership_active: bool,
}

fn default_active() -> bool {
    true
}

fn birth_date_rule(birth_date: Option<NaiveDate>) -> Result<(), ValidationError> {
    match birth_date {
        Some(date) => on_field("birth_date", validation::past(&date)),
        None => Ok(()),
    }
}

fn borrower_rules(borrower: &Borrower) -> Result<(), ValidationError> {
    birth_date_rule(borrower.birth_date)
}

fn new_borrower_rules(borrower: &NewBorrower) -> Result<(), ValidationError> {
    birth_date_rule(borrower.birth_date)
}

impl NewBorrower {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            birth_date: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            membership_active: true,
        }
    }
}

impl Borrower {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn add_loan(&mut self, loan: &mut BookLoan) {
        if !self.loan_ids.contains(&loan.id) {
            self.loan_ids.push(loan.id);
        }
        loan.borrower_id = Some(self.id);
    }

    pub fn remove_loan(&mut self, loan: &mut BookLoan) {
        if self.loan_ids.contains(&loan.id) {
            self.loan_ids.retain(|id| *id != loan.id);
            loan.borrower_id = None;
        }
    }
}

impl PartialEq for Borrower {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}
