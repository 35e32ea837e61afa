//! Integration tests against an in-memory database

mod catalog;
mod common;
mod loans;
mod security;
