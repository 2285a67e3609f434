use shared::{
    domain::{NewUser, UserId, UserRecord},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::info;

const MAX_NAME_CHARS: usize = 120;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_users(ctx: &ApiContext) -> Result<Vec<UserRecord>, ApiError> {
    ctx.storage.list_users().await.map_err(internal)
}

pub async fn get_user(ctx: &ApiContext, user_id: UserId) -> Result<UserRecord, ApiError> {
    ctx.storage
        .get_user(user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn create_user(ctx: &ApiContext, user: NewUser) -> Result<UserRecord, ApiError> {
    let user = validate_user(user)?;
    let created = ctx.storage.create_user(&user).await.map_err(internal)?;
    info!(user_id = created.id.0, "user created");
    Ok(created)
}

/// Returns the number of rows touched, which is always 1 on success.
pub async fn update_user(
    ctx: &ApiContext,
    user_id: UserId,
    user: NewUser,
) -> Result<u64, ApiError> {
    let record = validate_user(user)?.with_id(user_id);
    let rows_affected = ctx.storage.update_user(&record).await.map_err(internal)?;
    if rows_affected == 0 {
        return Err(user_not_found(user_id));
    }
    info!(user_id = user_id.0, rows_affected, "user updated");
    Ok(rows_affected)
}

pub async fn delete_user(ctx: &ApiContext, user_id: UserId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_user(user_id).await.map_err(internal)?;
    if !removed {
        return Err(user_not_found(user_id));
    }
    info!(user_id = user_id.0, "user deleted");
    Ok(())
}

fn validate_user(user: NewUser) -> Result<NewUser, ApiError> {
    let name = user.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::validation(format!(
            "name exceeds {MAX_NAME_CHARS} characters"
        )));
    }

    let email = user.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("email must not be empty"));
    }
    if !email.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(ApiError::validation("invalid email address"));
    }

    Ok(NewUser::new(name, email))
}

fn user_not_found(user_id: UserId) -> ApiError {
    ApiError::not_found(format!("user {} not found", user_id.0))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, format!("{err:#}"))
}
