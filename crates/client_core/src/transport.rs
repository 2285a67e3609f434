use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::UserRecord, protocol::USERS_ROUTE};
use tracing::{debug, info, warn};
use url::Url;

use crate::{FetchError, UserListProvider};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub server_url: String,
    pub users_path: String,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            users_path: USERS_ROUTE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Fetches the user list as a JSON array with a single GET. No retries.
pub struct HttpUserListProvider {
    http: Client,
    endpoint: Url,
}

impl HttpUserListProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, FetchError> {
        let endpoint = users_endpoint(&config.server_url, &config.users_path)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| FetchError::new(format!("failed to build http client: {err}")))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl UserListProvider for HttpUserListProvider {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError> {
        debug!(endpoint = %self.endpoint, "fetching user list");
        let result = async {
            let users: Vec<UserRecord> = self
                .http
                .get(self.endpoint.clone())
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, reqwest::Error>(users)
        }
        .await;

        match result {
            Ok(users) => {
                info!(endpoint = %self.endpoint, count = users.len(), "fetched user list");
                Ok(users)
            }
            Err(err) => {
                let err = FetchError::from(err);
                warn!(endpoint = %self.endpoint, error = %err, "user list fetch failed");
                Err(err)
            }
        }
    }
}

/// Appends `users_path` to whatever path `server_url` already carries.
fn users_endpoint(server_url: &str, users_path: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(server_url.trim())
        .map_err(|err| FetchError::new(format!("invalid server url '{server_url}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::new(format!(
            "unsupported server url scheme '{}'",
            url.scheme()
        )));
    }

    let path = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        users_path.trim().trim_start_matches('/')
    );
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
