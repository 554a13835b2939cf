//! User records.
//!
//! Users are referenced by id and name only. The role is a trusted string
//! chosen at registration; nothing here verifies credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Admin,
  #[default]
  User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:         Uuid,
  pub username:   String,
  pub email:      String,
  pub role:       UserRole,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn is_admin(&self) -> bool { self.role == UserRole::Admin }
}
