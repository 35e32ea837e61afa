//! Authors repository for database operations

use async_trait::async_trait;
use validator::Validate;

use super::{contains, ensure_affected, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::author::{Author, NewAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool,
}

impl AuthorsRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn with_books(&self, mut author: Author) -> AppResult<Author> {
        author.book_ids = sqlx::query_scalar(
            "SELECT book_id FROM book_authors WHERE author_id = ? ORDER BY book_id",
        )
        .bind(author.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(author)
    }

    async fn load_all(&self, authors: Vec<Author>) -> AppResult<Vec<Author>> {
        let mut result = Vec::with_capacity(authors.len());
        for author in authors {
            result.push(self.with_books(author).await?);
        }
        Ok(result)
    }

    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors WHERE last_name LIKE ? ORDER BY last_name, first_name",
        )
        .bind(contains(last_name))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(authors).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        match author {
            Some(author) => Ok(Some(self.with_books(author).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CrudRepository for AuthorsRepository {
    type Entity = Author;
    type New = NewAuthor;

    const ENTITY: &'static str = "Author";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match author {
            Some(author) => Ok(Some(self.with_books(author).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.load_all(authors).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewAuthor) -> AppResult<Author> {
        new.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO authors (first_name, last_name, birth_date, email, biography, nationality)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.birth_date)
        .bind(&new.email)
        .bind(&new.biography)
        .bind(&new.nationality)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// Book links belong to the book side and are left untouched
    async fn update(&self, author: &Author) -> AppResult<Author> {
        author.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE authors SET
                first_name = ?, last_name = ?, birth_date = ?, email = ?, biography = ?,
                nationality = ?
            WHERE id = ?
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.birth_date)
        .bind(&author.email)
        .bind(&author.biography)
        .bind(&author.nationality)
        .bind(author.id)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, author.id)?;

        self.get_by_id(author.id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
