//! User account and authentication service

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use super::found;
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User},
    repository::{CrudRepository, Repository},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check credentials; inactive accounts are refused
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let user = self
            .repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Login attempt for unknown user {}", username);
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !self.verify_password(&user, password)? {
            tracing::warn!("Wrong password for user {}", username);
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        if !user.is_active {
            tracing::warn!("Login attempt for inactive user {}", username);
            return Err(AppError::Authentication("Account is inactive".to_string()));
        }

        tracing::info!("User {} authenticated", username);
        Ok(user)
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.repository.users.find_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        let user = self.repository.users.find_by_id(id).await?;
        found("User", id, user)
    }

    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        self.repository.users.find_all().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.users.count().await
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.repository.users.find_by_username(username).await
    }

    /// Create a user with a plain-text password, stored as an Argon2 hash
    pub async fn create(&self, user: &NewUser) -> AppResult<User> {
        tracing::info!("Creating user {}", user.username);

        if self
            .repository
            .users
            .find_by_username(&user.username)
            .await?
            .is_some()
        {
            tracing::warn!("Username {} already exists", user.username);
            return Err(AppError::Conflict(format!(
                "Username already exists: {}",
                user.username
            )));
        }

        // Check the plain-text rules before they are lost to hashing
        validator::Validate::validate(user)?;

        let stored = NewUser {
            password: self.hash_password(&user.password)?,
            is_active: Some(user.is_active.unwrap_or(true)),
            ..user.clone()
        };
        self.repository.users.create(&stored).await
    }

    /// Full merge; `password` must already be a hash, see [`Self::change_password`]
    pub async fn update(&self, user: &User) -> AppResult<User> {
        tracing::info!("Updating user {}", user.username);
        self.repository.users.update(user).await
    }

    pub async fn change_password(&self, id: i64, new_password: &str) -> AppResult<User> {
        let mut user = self.get_by_id(id).await?;
        tracing::info!("Changing password for user {}", user.username);
        user.password = self.hash_password(new_password)?;
        self.repository.users.update(&user).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        tracing::info!("Deleting user {}", id);
        self.repository.users.delete(id).await
    }

    pub async fn has_role(&self, username: &str, role: &str) -> AppResult<bool> {
        Ok(self
            .repository
            .users
            .find_by_username(username)
            .await?
            .map(|user| user.has_role(role))
            .unwrap_or(false))
    }

    pub async fn activate(&self, id: i64) -> AppResult<User> {
        self.set_active(id, true).await
    }

    pub async fn deactivate(&self, id: i64) -> AppResult<User> {
        self.set_active(id, false).await
    }

    async fn set_active(&self, id: i64, active: bool) -> AppResult<User> {
        let mut user = self.get_by_id(id).await?;
        tracing::info!("Setting user {} active = {}", user.username, active);
        user.is_active = active;
        self.repository.users.update(&user).await
    }

    /// Returns the user with the group added; unknown group names are `NotFound`
    pub async fn add_to_group(&self, user_id: i64, group_name: &str) -> AppResult<User> {
        let mut user = self.get_by_id(user_id).await?;
        let mut group = self
            .repository
            .groups
            .find_by_group_name(group_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_name)))?;

        tracing::info!("Adding user {} to group {}", user.username, group_name);
        user.add_group(&mut group);
        self.repository.users.add_group_link(user.id, group.id).await?;
        Ok(user)
    }

    pub async fn remove_from_group(&self, user_id: i64, group_name: &str) -> AppResult<User> {
        let mut user = self.get_by_id(user_id).await?;
        let mut group = self
            .repository
            .groups
            .find_by_group_name(group_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_name)))?;

        tracing::info!("Removing user {} from group {}", user.username, group_name);
        user.remove_group(&mut group);
        self.repository.users.remove_group_link(user.id, group.id).await?;
        Ok(user)
    }

    pub async fn group_names(&self, username: &str) -> AppResult<Vec<String>> {
        self.repository.users.group_names(username).await
    }
}
