//! UI layer for desktop GUI: the user list window.

pub mod app;

pub use app::{StartupConfig, UserListApp};
