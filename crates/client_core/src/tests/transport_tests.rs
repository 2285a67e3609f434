use super::*;
use anyhow::Result;
use axum::{http::StatusCode, routing::get, Json, Router};
use tokio::net::TcpListener;

async fn spawn_user_server(app: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn provider_for(server_url: String, users_path: &str) -> HttpUserListProvider {
    HttpUserListProvider::new(&ProviderConfig {
        server_url,
        users_path: users_path.to_string(),
        timeout: Duration::from_secs(5),
    })
    .expect("provider")
}

#[test]
fn endpoint_appends_users_path_to_server_path() {
    let url = users_endpoint("http://localhost:8080", "/users").expect("url");
    assert_eq!(url.as_str(), "http://localhost:8080/users");

    let url = users_endpoint("https://example.com/api/v1/?x=1", "people").expect("url");
    assert_eq!(url.as_str(), "https://example.com/api/v1/people");
}

#[test]
fn endpoint_rejects_bad_urls() {
    let err = users_endpoint("not a url", "/users").expect_err("unparseable");
    assert!(err.message().starts_with("invalid server url"), "{err}");

    let err = users_endpoint("ftp://example.com", "/users").expect_err("scheme");
    assert!(err.message().contains("unsupported server url scheme"), "{err}");
}

#[test]
fn default_config_targets_local_users_route() {
    let provider = HttpUserListProvider::new(&ProviderConfig::default()).expect("provider");
    assert_eq!(provider.endpoint().as_str(), "http://127.0.0.1:8080/users");
}

#[tokio::test]
async fn fetches_json_user_list_in_order() {
    let app = Router::new().route(
        "/users",
        get(|| async {
            Json(serde_json::json!([
                { "id": 1, "name": "Ann", "email": "a@x.com" },
                { "id": 2, "name": "Bo", "email": "b@x.com" },
            ]))
        }),
    );
    let server_url = spawn_user_server(app).await.expect("spawn server");

    let users = provider_for(server_url, "/users")
        .fetch_users()
        .await
        .expect("fetch");
    assert_eq!(
        users,
        vec![
            UserRecord::new(1, "Ann", "a@x.com"),
            UserRecord::new(2, "Bo", "b@x.com"),
        ]
    );
}

#[tokio::test]
async fn server_error_status_becomes_fetch_error() {
    let app = Router::new().route(
        "/users",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let server_url = spawn_user_server(app).await.expect("spawn server");

    let err = provider_for(server_url, "/users")
        .fetch_users()
        .await
        .expect_err("500 must fail");
    assert!(err.message().contains("500"), "{err}");
}

#[tokio::test]
async fn malformed_body_becomes_fetch_error() {
    let app = Router::new().route(
        "/users",
        get(|| async { Json(serde_json::json!({ "users": "nope" })) }),
    );
    let server_url = spawn_user_server(app).await.expect("spawn server");

    let err = provider_for(server_url, "/users")
        .fetch_users()
        .await
        .expect_err("object is not a list");
    assert!(err.message().starts_with("malformed user list"), "{err}");
}

#[tokio::test]
async fn unreachable_server_becomes_fetch_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = provider_for(format!("http://{addr}"), "/users")
        .fetch_users()
        .await
        .expect_err("nothing listening");
    assert!(err.message().starts_with("user service"), "{err}");
}

#[tokio::test]
async fn slow_server_hits_request_timeout() {
    let app = Router::new().route(
        "/users",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(serde_json::json!([]))
        }),
    );
    let server_url = spawn_user_server(app).await.expect("spawn server");
    let provider = HttpUserListProvider::new(&ProviderConfig {
        server_url,
        users_path: "/users".to_string(),
        timeout: Duration::from_millis(100),
    })
    .expect("provider");

    let err = provider
        .fetch_users()
        .await
        .expect_err("server is slower than the timeout");
    assert!(
        err.message().starts_with("user service request timed out"),
        "{err}"
    );
}
