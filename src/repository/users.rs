//! Users repository for database operations

use async_trait::async_trait;
use validator::Validate;

use super::{ensure_affected, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::user::{GroupRef, NewUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool,
}

impl UsersRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn with_groups(&self, mut user: User) -> AppResult<User> {
        user.groups = sqlx::query_as::<_, GroupRef>(
            r#"
            SELECT g.id, g.group_name FROM security_groups g
            JOIN user_groups ug ON ug.group_id = g.id
            WHERE ug.user_id = ?
            ORDER BY g.id
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        match user {
            Some(user) => Ok(Some(self.with_groups(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_borrower(&self, borrower_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE borrower_id = ?")
            .bind(borrower_id)
            .fetch_optional(&self.pool)
            .await?;
        match user {
            Some(user) => Ok(Some(self.with_groups(user).await?)),
            None => Ok(None),
        }
    }

    /// Group names the user belongs to, the identity-store view of roles
    pub async fn group_names(&self, username: &str) -> AppResult<Vec<String>> {
        let names = sqlx::query_scalar(
            r#"
            SELECT g.group_name FROM security_groups g
            JOIN user_groups ug ON ug.group_id = g.id
            JOIN users u ON u.id = ug.user_id
            WHERE u.username = ?
            ORDER BY g.group_name
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Idempotent
    pub async fn add_group_link(&self, user_id: i64, group_id: i64) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove_group_link(&self, user_id: i64, group_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_groups WHERE user_id = ? AND group_id = ?")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CrudRepository for UsersRepository {
    type Entity = User;
    type New = NewUser;

    const ENTITY: &'static str = "User";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match user {
            Some(user) => Ok(Some(self.with_groups(user).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let mut result = Vec::with_capacity(users.len());
        for user in users {
            result.push(self.with_groups(user).await?);
        }
        Ok(result)
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Stores `password` as given; hashing happens in the service
    async fn create(&self, new: &NewUser) -> AppResult<User> {
        new.validate()?;

        let id = sqlx::query(
            r#"
            INSERT INTO users (username, password, email, is_active, borrower_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.username)
        .bind(&new.password)
        .bind(&new.email)
        .bind(new.is_active.unwrap_or(true))
        .bind(new.borrower_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// The user side owns group membership; links are rewritten from `groups`
    async fn update(&self, user: &User) -> AppResult<User> {
        user.validate()?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?, password = ?, email = ?, is_active = ?, borrower_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(user.is_active)
        .bind(user.borrower_id)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, user.id)?;

        sqlx::query("DELETE FROM user_groups WHERE user_id = ?")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        for group_id in user.group_ids() {
            sqlx::query("INSERT INTO user_groups (user_id, group_id) VALUES (?, ?)")
                .bind(user.id)
                .bind(group_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.get_by_id(user.id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
