use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use tracing::{debug, info};

use super::{ApiError, UsersApi};
use crate::config::Config;
use crate::models::{NewUser, User};

/// HTTP implementation of [`UsersApi`]
#[derive(Debug, Clone)]
pub struct HttpUsersApi {
    client: Client,
    base_url: Url,
}

impl HttpUsersApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(config.http_timeout())
            .build()?;

        Self::with_client(client, &config.api_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self { client, base_url })
    }

    /// Build `{base}/seg1/seg2...`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Turn a non-2xx response into [`ApiError::Status`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status_code: status.as_u16(),
        message: if message.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            message
        },
    })
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.endpoint(&["users"]);
        debug!("GET {}", url);

        let response = check_status(self.client.get(url).send().await?).await?;
        let users: Vec<User> = response.json().await?;

        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<(), ApiError> {
        let url = self.endpoint(&["users"]);
        debug!("POST {} id={}", url, user.id);

        check_status(self.client.post(url).json(&user).send().await?).await?;

        info!("Created user {} <{}>", user.id, user.email);
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["users", id]);
        debug!("DELETE {}", url);

        check_status(self.client.delete(url).send().await?).await?;

        info!("Deleted user {}", id);
        Ok(())
    }
}
