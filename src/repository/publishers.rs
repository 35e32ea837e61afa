//! Publishers repository for database operations

use async_trait::async_trait;
use validator::Validate;

use super::{contains, ensure_affected, reconcile_children, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::publisher::{NewPublisher, Publisher},
};

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool,
}

impl PublishersRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn with_books(&self, mut publisher: Publisher) -> AppResult<Publisher> {
        publisher.book_ids =
            sqlx::query_scalar("SELECT id FROM books WHERE publisher_id = ? ORDER BY id")
                .bind(publisher.id)
                .fetch_all(&self.pool)
                .await?;
        Ok(publisher)
    }

    async fn load_all(&self, publishers: Vec<Publisher>) -> AppResult<Vec<Publisher>> {
        let mut result = Vec::with_capacity(publishers.len());
        for publisher in publishers {
            result.push(self.with_books(publisher).await?);
        }
        Ok(result)
    }

    pub async fn search_by_name(&self, name: &str) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>(
            "SELECT * FROM publishers WHERE name LIKE ? ORDER BY name",
        )
        .bind(contains(name))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(publishers).await
    }

    pub async fn search_by_city(&self, city: &str) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>(
            "SELECT * FROM publishers WHERE city LIKE ? ORDER BY name",
        )
        .bind(contains(city))
        .fetch_all(&self.pool)
        .await?;
        self.load_all(publishers).await
    }

    pub async fn find_by_country(&self, country: &str) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>(
            "SELECT * FROM publishers WHERE country = ? ORDER BY name",
        )
        .bind(country)
        .fetch_all(&self.pool)
        .await?;
        self.load_all(publishers).await
    }
}

#[async_trait]
impl CrudRepository for PublishersRepository {
    type Entity = Publisher;
    type New = NewPublisher;

    const ENTITY: &'static str = "Publisher";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Publisher>> {
        let publisher = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match publisher {
            Some(publisher) => Ok(Some(self.with_books(publisher).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.load_all(publishers).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM publishers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewPublisher) -> AppResult<Publisher> {
        new.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO publishers (name, address, city, country, phone_number, email,
                                    founded_date, description, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.city)
        .bind(&new.country)
        .bind(&new.phone_number)
        .bind(&new.email)
        .bind(new.founded_date)
        .bind(&new.description)
        .bind(new.active)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// Books no longer listed in `book_ids` are deleted
    async fn update(&self, publisher: &Publisher) -> AppResult<Publisher> {
        publisher.validate()?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE publishers SET
                name = ?, address = ?, city = ?, country = ?, phone_number = ?, email = ?,
                founded_date = ?, description = ?, active = ?
            WHERE id = ?
            "#,
        )
        .bind(&publisher.name)
        .bind(&publisher.address)
        .bind(&publisher.city)
        .bind(&publisher.country)
        .bind(&publisher.phone_number)
        .bind(&publisher.email)
        .bind(publisher.founded_date)
        .bind(&publisher.description)
        .bind(publisher.active)
        .bind(publisher.id)
        .execute(&mut *tx)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, publisher.id)?;

        reconcile_children(&mut *tx, "books", "publisher_id", publisher.id, &publisher.book_ids)
            .await?;
        tx.commit().await?;

        self.get_by_id(publisher.id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
