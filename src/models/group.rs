//! Security group model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::user::User;
use super::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct Group {
    pub id: i64,
    #[validate(
        length(min = 1, max = 50, message = "Group name must not exceed 50 characters"),
        custom(function = "not_blank")
    )]
    pub group_name: String,
    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    pub description: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGroup {
    #[validate(
        length(min = 1, max = 50, message = "Group name must not exceed 50 characters"),
        custom(function = "not_blank")
    )]
    pub group_name: String,
    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    pub description: Option<String>,
}

impl NewGroup {
    pub fn new(group_name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            group_name: group_name.into(),
            description: description.map(str::to_string),
        }
    }
}

impl Group {
    pub fn user_count(&self) -> usize {
        self.user_ids.len()
    }

    /// Mirror of [`User::add_group`]
    pub fn add_user(&mut self, user: &mut User) {
        user.add_group(self);
    }

    /// Mirror of [`User::remove_group`]
    pub fn remove_user(&mut self, user: &mut User) {
        user.remove_group(self);
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.group_name == other.group_name
    }
}

#[cfg(test)]
pub(crate) fn sample_group(id: i64, group_name: &str) -> Group {
    Group {
        id,
        group_name: group_name.to_string(),
        description: None,
        user_ids: Vec::new(),
    }
}
