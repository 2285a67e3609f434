use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::{create_user, delete_user, get_user, list_users, update_user};
use shared::{
    domain::{NewUser, UserId, UserRecord},
    error::{ApiError, ErrorCode},
    protocol::{UpdateUserRequest, UpdateUserResponse, USERS_ROUTE},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::warn;

use crate::app_state::AppState;

const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

type ApiFailure = (StatusCode, Json<ApiError>);

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(USERS_ROUTE, get(http_list_users).post(http_create_user))
        .route(
            "/users/:user_id",
            get(http_get_user)
                .put(http_update_user)
                .delete(http_delete_user),
        )
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn http_list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserRecord>>, ApiFailure> {
    let users = list_users(&state.api).await.map_err(api_failure)?;
    Ok(Json(users))
}

async fn http_get_user(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserRecord>, ApiFailure> {
    let user_id = path_user_id(user_id)?;
    let user = get_user(&state.api, user_id)
        .await
        .map_err(api_failure)?;
    Ok(Json(user))
}

async fn http_create_user(
    State(state): State<Arc<AppState>>,
    req: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRecord>), ApiFailure> {
    let req = json_body(req)?;
    let created = create_user(&state.api, req).await.map_err(api_failure)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn http_update_user(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i64>, PathRejection>,
    req: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UpdateUserResponse>, ApiFailure> {
    let user_id = path_user_id(user_id)?;
    let req = json_body(req)?;
    let rows_affected = update_user(&state.api, user_id, req.into())
        .await
        .map_err(api_failure)?;
    Ok(Json(UpdateUserResponse { rows_affected }))
}

async fn http_delete_user(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiFailure> {
    let user_id = path_user_id(user_id)?;
    delete_user(&state.api, user_id)
        .await
        .map_err(api_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

fn path_user_id(extracted: Result<Path<i64>, PathRejection>) -> Result<UserId, ApiFailure> {
    extracted
        .map(|Path(user_id)| UserId(user_id))
        .map_err(|rejection| {
            api_failure(ApiError::validation(format!(
                "invalid user id: {}",
                rejection.body_text()
            )))
        })
}

/// Malformed or incomplete bodies answer with an `ApiError` instead of axum's
/// plain-text rejection.
fn json_body<T>(extracted: Result<Json<T>, JsonRejection>) -> Result<T, ApiFailure> {
    extracted.map(|Json(body)| body).map_err(|rejection| {
        api_failure(ApiError::validation(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    })
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_failure(err: ApiError) -> ApiFailure {
    if err.code == ErrorCode::Internal {
        warn!(message = %err.message, "user directory request failed");
    }
    (status_for(err.code), Json(err))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
