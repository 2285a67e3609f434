//! Backend commands queued from UI to backend worker.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    FetchUsers,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchUsers => "fetch_users",
        }
    }
}
