//! System user model.
//!
//! Users are stored in `sys_user` but no endpoint reads or writes them yet.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin = 1,
    Regular = 2,
}

impl UserRole {
    /// Code 1 is an administrator; every other code is a regular user.
    pub fn from_code(code: i32) -> Self {
        if code == Self::Admin as i32 {
            Self::Admin
        } else {
            Self::Regular
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Admin => "administrator",
            Self::Regular => "regular user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub real_name: Option<String>,
    pub role: i32,
    pub create_time: NaiveDateTime,
}

impl User {
    pub fn user_role(&self) -> UserRole {
        UserRole::from_code(self.role)
    }

    pub fn role_text(&self) -> &'static str {
        self.user_role().text()
    }

    pub fn is_admin(&self) -> bool {
        self.user_role() == UserRole::Admin
    }
}
