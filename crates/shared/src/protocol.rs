use serde::{Deserialize, Serialize};

use crate::domain::NewUser;

pub const USERS_ROUTE: &str = "/users";

/// Replaces both mutable fields of an existing user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
}

impl From<UpdateUserRequest> for NewUser {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub rows_affected: u64,
}
