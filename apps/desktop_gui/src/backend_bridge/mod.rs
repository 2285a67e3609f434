//! Backend worker: owns the tokio runtime and the user list provider.

pub mod commands;
pub mod runtime;
