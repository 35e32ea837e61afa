//! Book catalogue service

use super::found;
use crate::{
    error::AppResult,
    models::{author::Author, book::{Book, NewBook}},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        tracing::debug!("Finding book by id {}", id);
        self.repository.books.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        let book = self.repository.books.find_by_id(id).await?;
        found("Book", id, book)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Book>> {
        self.repository.books.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.books.count().await
    }

    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        tracing::info!("Creating book: {} (ISBN {})", book.title, book.isbn);
        let created = self.repository.books.create(book).await?;
        tracing::info!("Book created with id {}", created.id);
        Ok(created)
    }

    pub async fn update(&self, book: &Book) -> AppResult<Book> {
        tracing::info!("Updating book {}: {}", book.id, book.title);
        self.repository.books.update(book).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting book {}", id);
        self.repository.books.delete(id).await
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        tracing::debug!("Finding book by ISBN {}", isbn);
        self.repository.books.find_by_isbn(isbn).await
    }

    pub async fn search_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        self.repository.books.search_by_title(title).await
    }

    pub async fn search_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        self.repository.books.search_by_author(author).await
    }

    pub async fn find_available(&self) -> AppResult<Vec<Book>> {
        self.repository.books.find_available().await
    }

    pub async fn find_by_publisher(&self, publisher_id: i64) -> AppResult<Vec<Book>> {
        self.repository.books.find_by_publisher(publisher_id).await
    }

    pub async fn find_by_author_id(&self, author_id: i64) -> AppResult<Vec<Book>> {
        self.repository.books.find_by_author_id(author_id).await
    }

    /// Links an author to a book and returns both sides as now stored
    pub async fn add_author(&self, book_id: i64, author_id: i64) -> AppResult<(Book, Author)> {
        let mut book = self.get_by_id(book_id).await?;
        let author = self.repository.authors.find_by_id(author_id).await?;
        let mut author = found("Author", author_id, author)?;

        tracing::info!("Adding author {} to book {}", author.full_name(), book.title);
        book.add_author(&mut author);
        self.repository.books.link_author(book.id, author.id).await?;
        Ok((book, author))
    }

    /// Unlinks an author from a book and returns both sides as now stored
    pub async fn remove_author(&self, book_id: i64, author_id: i64) -> AppResult<(Book, Author)> {
        let mut book = self.get_by_id(book_id).await?;
        let author = self.repository.authors.find_by_id(author_id).await?;
        let mut author = found("Author", author_id, author)?;

        tracing::info!("Removing author {} from book {}", author.full_name(), book.title);
        book.remove_author(&mut author);
        self.repository.books.unlink_author(book.id, author.id).await?;
        Ok((book, author))
    }
}
