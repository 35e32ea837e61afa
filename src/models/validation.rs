//! Shared validation rules used by the entity derives

use std::borrow::Cow;

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

pub static ISBN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10,13}$").unwrap());

pub static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

pub static STATE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

/// E.164-style number
pub static INTL_PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap());

pub static LIBRARY_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$|^[0-9]{3}-[0-9]{3}-[0-9]{4}$").unwrap());

pub static STAFF_PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[1-9]\d{1,14}$|^\([0-9]{3}\) [0-9]{3}-[0-9]{4}$|^[0-9]{3}-[0-9]{3}-[0-9]{4}$")
        .unwrap()
});

pub static BORROWER_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-\d{3}-\d{4}$|^\(\d{3}\) \d{3}-\d{4}$|^\d{10}$").unwrap());

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Prefixes a rule failure with the field it applies to.
/// Struct-level checks report under `__all__`, so the field name has to travel in the message.
pub fn on_field(
    field: &'static str,
    result: Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    result.map_err(|mut err| {
        let message = err
            .message
            .take()
            .unwrap_or_else(|| err.code.clone());
        err.message = Some(Cow::Owned(format!("{} {}", field, message)));
        err
    })
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "must not be blank"));
    }
    Ok(())
}

pub fn past(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value >= today() {
        return Err(error("past", "must be in the past"));
    }
    Ok(())
}

pub fn past_or_present(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value > today() {
        return Err(error("past_or_present", "must be in the past or present"));
    }
    Ok(())
}

pub fn future(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value <= today() {
        return Err(error("future", "must be in the future"));
    }
    Ok(())
}

/// Integer part fits in `integer` digits, fraction in two
fn digits(value: f64, integer: u32) -> bool {
    if !value.is_finite() {
        return false;
    }
    let cents = (value.abs() * 100.0).round();
    if (value.abs() * 100.0 - cents).abs() > 1e-6 {
        return false;
    }
    value.abs().trunc() < 10f64.powi(integer as i32)
}

pub fn price_digits(value: f64) -> Result<(), ValidationError> {
    if !digits(value, 6) {
        return Err(error(
            "digits",
            "must have at most 6 integer digits and 2 fraction digits",
        ));
    }
    Ok(())
}

pub fn salary_digits(value: f64) -> Result<(), ValidationError> {
    if !digits(value, 8) {
        return Err(error(
            "digits",
            "must have at most 8 integer digits and 2 fraction digits",
        ));
    }
    Ok(())
}
