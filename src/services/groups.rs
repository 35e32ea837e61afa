//! Security group service

use super::found;
use crate::{
    error::{AppError, AppResult},
    models::group::{Group, NewGroup},
    repository::{CrudRepository, Repository},
};

/// Groups every installation starts with
pub const DEFAULT_GROUPS: [(&str, &str); 3] = [
    ("ADMIN", "System Administrators with full access"),
    ("LIBRARIAN", "Librarians with book management access"),
    ("USER", "Regular users with borrowing privileges"),
];

#[derive(Clone)]
pub struct GroupsService {
    repository: Repository,
}

impl GroupsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Group>> {
        self.repository.groups.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Group> {
        let group = self.repository.groups.find_by_id(id).await?;
        found("Group", id, group)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Group>> {
        self.repository.groups.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.groups.count().await
    }

    pub async fn find_by_group_name(&self, group_name: &str) -> AppResult<Option<Group>> {
        self.repository.groups.find_by_group_name(group_name).await
    }

    pub async fn group_exists(&self, group_name: &str) -> AppResult<bool> {
        Ok(self.find_by_group_name(group_name).await?.is_some())
    }

    pub async fn create(&self, group: &NewGroup) -> AppResult<Group> {
        tracing::info!("Creating group {}", group.group_name);
        if self.group_exists(&group.group_name).await? {
            tracing::warn!("Group {} already exists", group.group_name);
            return Err(AppError::Conflict(format!(
                "Group already exists: {}",
                group.group_name
            )));
        }
        self.repository.groups.create(group).await
    }

    pub async fn update(&self, group: &Group) -> AppResult<Group> {
        tracing::info!("Updating group {}", group.group_name);
        self.repository.groups.update(group).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting group {}", id);
        self.repository.groups.delete(id).await
    }

    /// Returns `false` when the group does not exist
    pub async fn add_user_to_group(&self, user_id: i64, group_name: &str) -> AppResult<bool> {
        let Some(mut group) = self.find_by_group_name(group_name).await? else {
            tracing::warn!("Cannot add user {}: group {} not found", user_id, group_name);
            return Ok(false);
        };
        let user = self.repository.users.find_by_id(user_id).await?;
        let mut user = found("User", user_id, user)?;

        group.add_user(&mut user);
        self.repository.users.add_group_link(user.id, group.id).await?;
        tracing::info!("User {} added to group {}", user.username, group_name);
        Ok(true)
    }

    /// Returns `false` when the group does not exist
    pub async fn remove_user_from_group(&self, user_id: i64, group_name: &str) -> AppResult<bool> {
        let Some(mut group) = self.find_by_group_name(group_name).await? else {
            tracing::warn!("Cannot remove user {}: group {} not found", user_id, group_name);
            return Ok(false);
        };
        let user = self.repository.users.find_by_id(user_id).await?;
        let mut user = found("User", user_id, user)?;

        group.remove_user(&mut user);
        self.repository.users.remove_group_link(user.id, group.id).await?;
        tracing::info!("User {} removed from group {}", user.username, group_name);
        Ok(true)
    }

    /// Creates ADMIN, LIBRARIAN and USER when missing; safe to call repeatedly
    pub async fn create_default_groups(&self) -> AppResult<Vec<Group>> {
        let mut groups = Vec::with_capacity(DEFAULT_GROUPS.len());
        for (name, description) in DEFAULT_GROUPS {
            let group = match self.find_by_group_name(name).await? {
                Some(existing) => existing,
                None => self.create(&NewGroup::new(name, Some(description))).await?,
            };
            groups.push(group);
        }
        Ok(groups)
    }
}
