//! Groups repository for database operations

use async_trait::async_trait;
use validator::Validate;

use super::{ensure_affected, CrudRepository, Pool};
use crate::{
    error::AppResult,
    models::group::{Group, NewGroup},
};

#[derive(Clone)]
pub struct GroupsRepository {
    pool: Pool,
}

impl GroupsRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn with_users(&self, mut group: Group) -> AppResult<Group> {
        group.user_ids =
            sqlx::query_scalar("SELECT user_id FROM user_groups WHERE group_id = ? ORDER BY user_id")
                .bind(group.id)
                .fetch_all(&self.pool)
                .await?;
        Ok(group)
    }

    pub async fn find_by_group_name(&self, group_name: &str) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM security_groups WHERE group_name = ?")
            .bind(group_name)
            .fetch_optional(&self.pool)
            .await?;
        match group {
            Some(group) => Ok(Some(self.with_users(group).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CrudRepository for GroupsRepository {
    type Entity = Group;
    type New = NewGroup;

    const ENTITY: &'static str = "Group";

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM security_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match group {
            Some(group) => Ok(Some(self.with_users(group).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> AppResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>("SELECT * FROM security_groups ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let mut result = Vec::with_capacity(groups.len());
        for group in groups {
            result.push(self.with_users(group).await?);
        }
        Ok(result)
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM security_groups")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, new: &NewGroup) -> AppResult<Group> {
        new.validate()?;

        let id = sqlx::query("INSERT INTO security_groups (group_name, description) VALUES (?, ?)")
            .bind(&new.group_name)
            .bind(&new.description)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        self.get_by_id(id).await
    }

    /// Membership is owned by the user side and is left untouched
    async fn update(&self, group: &Group) -> AppResult<Group> {
        group.validate()?;

        let result = sqlx::query("UPDATE security_groups SET group_name = ?, description = ? WHERE id = ?")
            .bind(&group.group_name)
            .bind(&group.description)
            .bind(group.id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, group.id)?;

        self.get_by_id(group.id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM security_groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Self::ENTITY, id)
    }
}
