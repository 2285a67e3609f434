use super::*;
use axum::{
    body::{self, Body},
    http::Request,
};
use server_api::ApiContext;
use storage::Storage;
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = build_router(Arc::new(AppState {
        api: ApiContext {
            storage: storage.clone(),
        },
    }));
    (app, storage)
}

fn json_request(method: &str, uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn list_users_returns_bare_json_array_in_id_order() {
    let (app, storage) = test_app().await;
    storage
        .create_user(&NewUser::new("Ann", "a@x.com"))
        .await
        .expect("ann");
    storage
        .create_user(&NewUser::new("Bo", "b@x.com"))
        .await
        .expect("bo");

    let response = app
        .oneshot(Request::get("/users").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let users: serde_json::Value = read_json(response).await;
    assert_eq!(
        users,
        serde_json::json!([
            { "id": 1, "name": "Ann", "email": "a@x.com" },
            { "id": 2, "name": "Bo", "email": "b@x.com" },
        ])
    );
}

#[tokio::test]
async fn create_get_update_delete_round_trip() {
    let (app, _storage) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            serde_json::json!({ "name": "testuser", "email": "test@example.com" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: UserRecord = read_json(response).await;

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/users/{}", created.id.0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: UserRecord = read_json(response).await;
    assert_eq!(fetched, created);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/users/{}", created.id.0),
            serde_json::json!({ "name": "updateduser", "email": "updated@example.com" }),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let updated: UpdateUserResponse = read_json(response).await;
    assert_eq!(updated.rows_affected, 1);

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/users/{}", created.id.0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get(format!("/users/{}", created.id.0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("get after delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn invalid_create_payload_is_bad_request() {
    let (app, storage) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/users",
            serde_json::json!({ "name": "", "email": "test@example.com" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(storage.list_users().await.expect("list").is_empty());
}

async fn assert_validation_failure(app: Router, request: Request<Body>, expected: &str) {
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.message.starts_with(expected), "{}", err.message);
}

#[tokio::test]
async fn undecodable_requests_answer_with_api_error_json() {
    let (app, storage) = test_app().await;

    assert_validation_failure(
        app.clone(),
        json_request("POST", "/users", serde_json::json!({ "name": "Ann" })),
        "invalid request body:",
    )
    .await;

    let malformed = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": \"Ann\","))
        .expect("request");
    assert_validation_failure(app.clone(), malformed, "invalid request body:").await;

    assert_validation_failure(
        app.clone(),
        json_request(
            "PUT",
            "/users/1",
            serde_json::json!({ "email": "a@x.com" }),
        ),
        "invalid request body:",
    )
    .await;

    assert_validation_failure(
        app.clone(),
        Request::get("/users/abc").body(Body::empty()).expect("request"),
        "invalid user id:",
    )
    .await;

    assert_validation_failure(
        app,
        Request::delete("/users/abc").body(Body::empty()).expect("request"),
        "invalid user id:",
    )
    .await;

    assert!(storage.list_users().await.expect("list").is_empty());
}

#[tokio::test]
async fn update_of_unknown_user_is_not_found() {
    let (app, _storage) = test_app().await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/users/41",
            serde_json::json!({ "name": "ghost", "email": "ghost@example.com" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn error_codes_map_to_http_statuses() {
    assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
    assert_eq!(status_for(ErrorCode::Validation), StatusCode::BAD_REQUEST);
    assert_eq!(
        status_for(ErrorCode::Internal),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
