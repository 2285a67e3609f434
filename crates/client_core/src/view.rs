use std::{collections::HashSet, sync::Arc};

use shared::domain::{UserId, UserRecord};
use tracing::{info, warn};

use crate::{lifecycle::FetchHandle, FetchError, UserListProvider};

/// Held user list. A failed fetch leaves whatever was held before, so there is
/// no loading or error variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Empty,
    Loaded(Vec<UserRecord>),
}

/// One rendered line, keyed by the user's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub key: UserId,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct UserListView {
    state: ViewState,
    appeared: bool,
}

impl UserListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn users(&self) -> &[UserRecord] {
        match &self.state {
            ViewState::Empty => &[],
            ViewState::Loaded(users) => users,
        }
    }

    pub fn has_appeared(&self) -> bool {
        self.appeared
    }

    /// Returns `true` only the first time the view becomes visible.
    pub fn begin_appear(&mut self) -> bool {
        if self.appeared {
            return false;
        }
        self.appeared = true;
        true
    }

    /// Spawns the fetch on the current tokio runtime the first time the view
    /// appears. Must be called from within a runtime.
    pub fn on_appear(&mut self, provider: Arc<dyn UserListProvider>) -> Option<FetchHandle> {
        if !self.begin_appear() {
            return None;
        }
        Some(FetchHandle::spawn(provider))
    }

    /// Replaces the held list on success and returns the new row count. On
    /// failure the held list is untouched and the error is handed back.
    pub fn apply_fetch(
        &mut self,
        result: Result<Vec<UserRecord>, FetchError>,
    ) -> Result<usize, FetchError> {
        match result.and_then(ensure_unique_ids) {
            Ok(users) => {
                let count = users.len();
                self.state = ViewState::Loaded(users);
                info!(count, "user list loaded");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, held = self.users().len(), "keeping previous user list");
                Err(err)
            }
        }
    }

    pub fn render(&self) -> Vec<UserRow> {
        self.users()
            .iter()
            .map(|user| UserRow {
                key: user.id,
                text: user.name.clone(),
            })
            .collect()
    }
}

fn ensure_unique_ids(users: Vec<UserRecord>) -> Result<Vec<UserRecord>, FetchError> {
    let mut seen = HashSet::with_capacity(users.len());
    if let Some(duplicate) = users.iter().find(|user| !seen.insert(user.id)) {
        return Err(FetchError::new(format!(
            "user list contains duplicate id {}",
            duplicate.id.0
        )));
    }
    Ok(users)
}
