//! Data models for the library domain

pub mod author;
pub mod book;
pub mod borrower;
pub mod group;
pub mod librarian;
pub mod library;
pub mod loan;
pub mod publisher;
pub mod user;
pub mod validation;

// Re-export commonly used types
pub use author::{Author, NewAuthor};
pub use book::{Book, NewBook};
pub use borrower::{Borrower, NewBorrower};
pub use group::{Group, NewGroup};
pub use librarian::{Librarian, NewLibrarian};
pub use library::{Library, NewLibrary};
pub use loan::{BookLoan, NewBookLoan, FINE_PER_DAY};
pub use publisher::{NewPublisher, Publisher};
pub use user::{GroupRef, NewUser, User};
