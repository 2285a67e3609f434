use std::sync::Arc;

use shared::domain::UserRecord;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    view::{UserListView, UserRow},
    FetchError, UserListProvider,
};

/// A running user fetch. Dropping the handle detaches the task; call
/// [`FetchHandle::cancel`] to stop it.
pub struct FetchHandle {
    task: JoinHandle<Result<Vec<UserRecord>, FetchError>>,
    cancelled: bool,
}

impl FetchHandle {
    pub fn spawn(provider: Arc<dyn UserListProvider>) -> Self {
        let task = tokio::spawn(async move { provider.fetch_users().await });
        Self {
            task,
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.task.abort();
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub async fn join(self) -> Result<Vec<UserRecord>, FetchError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(FetchError::cancelled()),
            Err(err) => Err(FetchError::new(format!("user fetch task failed: {err}"))),
        }
    }
}

/// Owns a view, its provider and the in-flight fetch for one screen lifetime.
/// Tearing the screen down cancels a fetch that has not settled.
pub struct UserListScreen {
    view: UserListView,
    provider: Arc<dyn UserListProvider>,
    inflight: Option<FetchHandle>,
}

impl UserListScreen {
    pub fn new(provider: Arc<dyn UserListProvider>) -> Self {
        Self {
            view: UserListView::new(),
            provider,
            inflight: None,
        }
    }

    pub fn view(&self) -> &UserListView {
        &self.view
    }

    pub fn rows(&self) -> Vec<UserRow> {
        self.view.render()
    }

    /// False once the in-flight fetch has been cancelled, even before
    /// [`UserListScreen::settle`] collects it.
    pub fn is_fetching(&self) -> bool {
        self.inflight
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    /// Starts the fetch on first appearance; returns whether one was started.
    pub fn appear(&mut self) -> bool {
        match self.view.on_appear(Arc::clone(&self.provider)) {
            Some(handle) => {
                self.inflight = Some(handle);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        match &mut self.inflight {
            Some(handle) if !handle.is_cancelled() => {
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    /// Waits for the in-flight fetch and applies its outcome to the view.
    /// Returns `None` when nothing was in flight.
    pub async fn settle(&mut self) -> Option<Result<usize, FetchError>> {
        let handle = self.inflight.take()?;
        let result = handle.join().await;
        Some(self.view.apply_fetch(result))
    }
}

impl Drop for UserListScreen {
    fn drop(&mut self) {
        if let Some(mut handle) = self.inflight.take() {
            handle.cancel();
            debug!("cancelled unsettled user fetch on teardown");
        }
    }
}
