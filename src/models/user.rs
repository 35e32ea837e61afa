//! User account model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::group::Group;
use super::validation::not_blank;

/// Group membership as carried on a loaded user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GroupRef {
    pub id: i64,
    pub group_name: String,
}

/// User account; `password` holds the Argon2 hash
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct User {
    pub id: i64,
    #[validate(
        length(min = 1, max = 50, message = "Username must not exceed 50 characters"),
        custom(function = "not_blank")
    )]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub password: String,
    #[validate(
        email(message = "Email must be valid"),
        length(min = 1, max = 100, message = "Email must not exceed 100 characters")
    )]
    pub email: String,
    pub is_active: bool,
    pub borrower_id: Option<i64>,
    #[sqlx(skip)]
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

/// Create user request; `password` is plain text until the service hashes it
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(
        length(min = 1, max = 50, message = "Username must not exceed 50 characters"),
        custom(function = "not_blank")
    )]
    pub username: String,
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub password: String,
    #[validate(
        email(message = "Email must be valid"),
        length(min = 1, max = 100, message = "Email must not exceed 100 characters")
    )]
    pub email: String,
    pub is_active: Option<bool>,
    pub borrower_id: Option<i64>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            is_active: None,
            borrower_id: None,
        }
    }
}

impl User {
    pub fn is_in_group(&self, group_name: &str) -> bool {
        self.groups.iter().any(|g| g.group_name == group_name)
    }

    /// Roles are group names
    pub fn has_role(&self, role: &str) -> bool {
        self.is_in_group(role)
    }

    pub fn add_group(&mut self, group: &mut Group) {
        if !self.groups.iter().any(|g| g.id == group.id) {
            self.groups.push(GroupRef {
                id: group.id,
                group_name: group.group_name.clone(),
            });
        }
        if !group.user_ids.contains(&self.id) {
            group.user_ids.push(self.id);
        }
    }

    pub fn remove_group(&mut self, group: &mut Group) {
        self.groups.retain(|g| g.id != group.id);
        group.user_ids.retain(|id| *id != self.id);
    }

    pub fn group_ids(&self) -> Vec<i64> {
        self.groups.iter().map(|g| g.id).collect()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

#[cfg(test)]
pub(crate) fn sample_user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        password: "$argon2id$v=19$stub".to_string(),
        email: format!("{}@library.org", username),
        is_active: true,
        borrower_id: None,
        groups: Vec::new(),
    }
}
