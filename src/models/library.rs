//! Library (branch) model

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::loan::BookLoan;
use super::validation::{not_blank, LIBRARY_PHONE_RE, ZIP_RE};

/// Library branch; owns the loans issued there
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct Library {
    pub id: i64,
    #[validate(
        length(min = 1, max = 100, message = "Library name must not exceed 100 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub address: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub city: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub state: String,
    #[validate(regex(path = *ZIP_RE, message = "ZIP code must be valid"), length(max = 10))]
    pub zip_code: String,
    #[validate(
        regex(path = *LIBRARY_PHONE_RE, message = "Phone number must be valid"),
        length(max = 20)
    )]
    pub phone_number: Option<String>,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    #[validate(range(min = 1, max = 999_999, message = "Capacity must be between 1 and 999999"))]
    pub capacity: i32,
    pub active: bool,
    #[sqlx(skip)]
    #[serde(default)]
    pub loan_ids: Vec<i64>,
}

/// Create library request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewLibrary {
    #[validate(
        length(min = 1, max = 100, message = "Library name must not exceed 100 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub address: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub city: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub state: String,
    #[validate(regex(path = *ZIP_RE, message = "ZIP code must be valid"), length(max = 10))]
    pub zip_code: String,
    #[validate(
        regex(path = *LIBRARY_PHONE_RE, message = "Phone number must be valid"),
        length(max = 20)
    )]
    pub phone_number: Option<String>,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    #[validate(range(min = 1, max = 999_999, message = "Capacity must be between 1 and 999999"))]
    pub capacity: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewLibrary {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
        opening_time: NaiveTime,
        closing_time: NaiveTime,
        capacity: i32,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            phone_number: None,
            email: None,
            opening_time,
            closing_time,
            capacity,
            active: true,
        }
    }
}

impl Library {
    pub fn add_loan(&mut self, loan: &mut BookLoan) {
        if !self.loan_ids.contains(&loan.id) {
            self.loan_ids.push(loan.id);
        }
        loan.library_id = Some(self.id);
    }

    pub fn remove_loan(&mut self, loan: &mut BookLoan) {
        if self.loan_ids.contains(&loan.id) {
            self.loan_ids.retain(|id| *id != loan.id);
            loan.library_id = None;
        }
    }
}

impl PartialEq for Library {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours() -> (NaiveTime, NaiveTime) {
        (
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_zip_and_capacity() {
        let (open, close) = hours();
        let mut lib = NewLibrary::new(
            "Main Public Library",
            "100 Library Way",
            "Chicago",
            "IL",
            "60601",
            open,
            close,
            500,
        );
        assert!(lib.validate().is_ok());

        lib.zip_code = "60601-1234".to_string();
        assert!(lib.validate().is_ok());

        lib.zip_code = "6060".to_string();
        assert!(lib.validate().is_err());

        lib.zip_code = "60601".to_string();
        lib.capacity = 0;
        assert!(lib.validate().is_err());
    }

    #[test]
    fn test_phone_formats() {
        let (open, close) = hours();
        let mut lib = NewLibrary::new("West", "1 St", "Chicago", "IL", "60602", open, close, 10);
        lib.phone_number = Some("312-555-0200".to_string());
        assert!(lib.validate().is_ok());
        lib.phone_number = Some("call us".to_string());
        assert!(lib.validate().is_err());
    }
}
