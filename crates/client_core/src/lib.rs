//! Client side of the user list: providers that obtain user records, the view
//! that holds and renders them, and the lifecycle glue that triggers the single
//! fetch when a view first appears.

use async_trait::async_trait;
use shared::domain::UserRecord;
use tracing::debug;

pub mod error;
pub mod lifecycle;
pub mod transport;
pub mod view;

pub use error::FetchError;
pub use lifecycle::{FetchHandle, UserListScreen};
pub use transport::{HttpUserListProvider, ProviderConfig};
pub use view::{UserListView, UserRow, ViewState};

/// Source of the current user list. Implementations are shared across tasks as
/// `Arc<dyn UserListProvider>`.
#[async_trait]
pub trait UserListProvider: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError>;
}

pub struct MissingUserListProvider;

#[async_trait]
impl UserListProvider for MissingUserListProvider {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError> {
        Err(FetchError::new("user list provider is unavailable"))
    }
}

/// Serves a fixed list, e.g. one loaded from a fixture file.
#[derive(Debug, Clone, Default)]
pub struct StaticUserListProvider {
    users: Vec<UserRecord>,
}

impl StaticUserListProvider {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    pub fn from_json(raw: &str) -> Result<Self, FetchError> {
        let users = serde_json::from_str(raw)
            .map_err(|err| FetchError::new(format!("malformed user list: {err}")))?;
        Ok(Self { users })
    }
}

#[async_trait]
impl UserListProvider for StaticUserListProvider {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError> {
        debug!(count = self.users.len(), "serving static user list");
        Ok(self.users.clone())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
