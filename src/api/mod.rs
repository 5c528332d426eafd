//! Access to the remote user service
//!
//! The rest of the crate talks to the service only through [`UsersApi`], so
//! the terminal page can be driven by the HTTP client in production and by an
//! in-memory double in tests.

pub mod client;
pub mod errors;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::models::{NewUser, User};

pub use client::HttpUsersApi;
pub use errors::ApiError;

/// The three operations the user service exposes
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Fetch the full user list, in the order the service returns it
    async fn fetch_users(&self) -> Result<Vec<User>, ApiError>;

    /// Create a user
    async fn create_user(&self, user: NewUser) -> Result<(), ApiError>;

    /// Delete a user by id
    async fn delete_user(&self, id: &str) -> Result<(), ApiError>;
}
