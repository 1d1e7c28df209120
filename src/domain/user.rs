use serde::{Deserialize, Serialize};

use crate::domain::common::Displayable;

/// Signed-in profile persisted under the auth key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Name to greet the user with, falling back to the email local part.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => email_local_part(&self.email),
        }
    }
}

impl Displayable for User {
    fn display_label(&self) -> String {
        format!("{} <{}>", self.display_name(), self.email)
    }
}

pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
