use serde::{Deserialize, Serialize};

/// A user record as held by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload for creating a user; the id is chosen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NewUser {
    /// Build a payload with a freshly generated id
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: new_user_id(),
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}

/// Generate a random id for a user about to be created
pub fn new_user_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
