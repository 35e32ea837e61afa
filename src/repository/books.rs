//! Books repository for database operations

use async_trait::async_trait;
use validator::Validate;

use super::{contains, ensure_affected, reconcile_children, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::book::{Book, NewBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool,
}

impl BooksRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Fill in author and loan ids
    async fn with_links(&self, mut book: Book) -> AppResult<Book> {
        book.author_ids = sqlx::query_scalar(
            "SELECT author_id FROM book_authors WHERE book_id = ? ORDER BY author_id",
        )
        .bind(book.id)
        .fetch_all(&self.pool)
        .await?;
        book.loan_ids =
            sqlx::query_scalar("SELECT id FROM book_loans WHERE book_id = ? ORDER BY id")
                .bind(book.id)
                .fetch_all(&self.pool)
                .await?;
        Ok(book)
    }

    async fn load_all(&self, books: Vec<Book>) -> AppResult<Vec<Book>> {
        let mut result = Vec::with_capacity(books.len());
        for book in books {
            result.push(self.with_links(book).await?);
        }
        Ok(result)
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = ?")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        match book {
            Some(book) => Ok(Some(self.with_links(book).await?)),
            None => Ok(None),
        }
    }

    pub async fn search_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE title LIKE ? ORDER BY title, id",
        )
        .bind(contains(title))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(books).await
    }

    /// Matches the display credit, not the linked authors
    pub async fn search_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author LIKE ? ORDER BY title, id",
        )
        .bind(contains(author))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(books).await
    }

    pub async fn find_available(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE is_available = TRUE ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;
        self.load_all(books).await
    }

    pub async fn find_by_publisher(&self, publisher_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE publisher_id = ? ORDER BY title, id",
        )
        .bind(publisher_id)
        .fetch_all(&self.pool)
        .await?;
        self.load_all(books).await
    }

    pub async fn find_by_author_id(&self, author_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.* FROM books b
            JOIN book_authors ba ON ba.book_id = b.id
            WHERE ba.author_id = ?
            ORDER BY b.title, b.id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        self.load_all(books).await
    }

    /// Idempotent
    pub async fn link_author(&self, book_id: i64, author_id: i64) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO book_authors (book_id, author_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn unlink_author(&self, book_id: i64, author_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_authors WHERE book_id = ? AND author_id = ?")
            .bind(book_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CrudRepository for BooksRepository {
    type Entity = Book;
    type New = NewBook;

    const ENTITY: &'static str = "Book";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match book {
            Some(book) => Ok(Some(self.with_links(book).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.load_all(books).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewBook) -> AppResult<Book> {
        new.validate()?;

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn, publication_date, page_count, price,
                               is_available, due_date, publisher_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.isbn)
        .bind(new.publication_date)
        .bind(new.page_count)
        .bind(new.price)
        .bind(new.is_available)
        .bind(new.due_date)
        .bind(new.publisher_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for author_id in &new.author_ids {
            sqlx::query("INSERT OR IGNORE INTO book_authors (book_id, author_id) VALUES (?, ?)")
                .bind(id)
                .bind(author_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        book.validate()?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = ?, author = ?, isbn = ?, publication_date = ?, page_count = ?,
                price = ?, is_available = ?, due_date = ?, publisher_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_date)
        .bind(book.page_count)
        .bind(book.price)
        .bind(book.is_available)
        .bind(book.due_date)
        .bind(book.publisher_id)
        .bind(book.id)
        .execute(&mut *tx)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, book.id)?;

        // The book side owns the author links
        sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;
        for author_id in &book.author_ids {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES (?, ?)")
                .bind(book.id)
                .bind(author_id)
                .execute(&mut *tx)
                .await?;
        }

        reconcile_children(&mut *tx, "book_loans", "book_id", book.id, &book.loan_ids).await?;
        tx.commit().await?;

        self.get_by_id(book.id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
