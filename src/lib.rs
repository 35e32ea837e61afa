//! Bookloan core
//!
//! Catalogue, staff, borrower and loan management over a relational store:
//! validated entities, repositories with cascade and orphan-removal rules,
//! and a service layer carrying the loan return and fine rules.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
