use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use remote_cache_gateway::{routes, AppState, ConfigError, GatewayConfig};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "test-secret-123";

fn test_config() -> GatewayConfig {
    GatewayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: Some(SECRET.to_string()),
        aws_access_key_id: Some("AKIDEXAMPLE".to_string()),
        aws_secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
        aws_region: Some("us-east-1".to_string()),
        s3_bucket: Some("turbo-artifacts".to_string()),
        ..Default::default()
    }
}

fn app() -> Router {
    let state = Arc::new(AppState::new(test_config()).unwrap());
    routes::create_router(state)
}

fn token(claims: serde_json::Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn team_token(team_id: &str) -> String {
    token(
        json!({
            "teamId": team_id,
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        }),
        SECRET,
    )
}

fn preflight(path: &str, hint: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("OPTIONS")
        .uri(path)
        .header(header::HOST, "cache.example.com")
        .header("x-forwarded-proto", "https")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, hint);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> url::Url {
    let raw = response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap();
    url::Url::parse(raw).unwrap()
}

fn query_value(url: &url::Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[rstest]
#[case("GET", "/")]
#[case("GET", "/status")]
#[case("GET", "/v7/artifacts/status")]
#[case("POST", "/v2/events")]
#[case("OPTIONS", "/artifacts/h1")]
#[tokio::test]
async fn test_outside_prefix_is_not_found(#[case] method: &str, #[case] path: &str) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", team_token("team_abc123")))
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "Not found");
}

#[tokio::test]
async fn test_status_needs_no_auth() {
    let request = Request::builder()
        .method("GET")
        .uri("/v8/artifacts/status")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();

    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"enabled":true}"#);
}

#[tokio::test]
async fn test_events_needs_no_auth() {
    let request = Request::builder()
        .method("POST")
        .uri("/v8/artifacts/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"[{"source":"LOCAL","event":"HIT","hash":"h1"}]"#))
        .unwrap();

    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "{}");
}

#[rstest]
#[case("GET")]
#[case("PUT")]
#[case("POST")]
#[case("DELETE")]
#[case("HEAD")]
#[tokio::test]
async fn test_artifact_path_requires_preflight(#[case] method: &str) {
    let request = Request::builder()
        .method(method)
        .uri("/v8/artifacts/h1")
        .header(header::AUTHORIZATION, format!("Bearer {}", team_token("team_abc123")))
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::missing(None)]
#[case::garbage(Some("Bearer not-a-token".to_string()))]
#[case::expired(Some(format!("Bearer {}", token(
    json!({ "teamId": "team_abc123", "exp": (Utc::now() - Duration::hours(1)).timestamp() }),
    SECRET,
))))]
#[case::wrong_signature(Some(format!("Bearer {}", token(json!({ "teamId": "team_abc123" }), "other-secret"))))]
#[case::bad_team_id(Some(format!("Bearer {}", token(json!({ "teamId": "org_abc123" }), SECRET))))]
#[case::no_team_id(Some(format!("Bearer {}", token(json!({ "sub": "user" }), SECRET))))]
#[tokio::test]
async fn test_invalid_auth_is_uniform_401(
    #[case] authorization: Option<String>,
    #[values("GET", "PUT")] hint: &str,
) {
    let response = send(
        app(),
        preflight("/v8/artifacts/h1", hint, authorization.as_deref()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(body_string(response).await, "Unauthorized");
}

#[test_log::test(tokio::test)]
async fn test_read_grant_targets_team_key() {
    let auth = format!("Bearer {}", team_token("team_abc123"));
    let response = send(app(), preflight("/v8/artifacts/h1", "GET", Some(&auth))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let url = location(&response);
    assert_eq!(url.scheme(), "https");
    assert_eq!(url.host_str(), Some("turbo-artifacts.s3.us-east-1.amazonaws.com"));
    assert_eq!(url.path(), "/team_abc123/h1");
    assert_eq!(query_value(&url, "teamId").as_deref(), Some("team_abc123"));
    assert_eq!(query_value(&url, "X-Amz-Expires").as_deref(), Some("3600"));
    assert!(query_value(&url, "X-Amz-Signature").is_some());
    assert!(response.headers().get("x-request-id").is_some());
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_write_grant_targets_team_key() {
    let auth = format!("Bearer {}", team_token("team_abc123"));
    let response = send(app(), preflight("/v8/artifacts/h2", "PUT", Some(&auth))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let url = location(&response);
    assert_eq!(url.path(), "/team_abc123/h2");
    assert_eq!(query_value(&url, "teamId").as_deref(), Some("team_abc123"));
}

#[tokio::test]
async fn test_encoded_hash_is_signed_once() {
    let auth = format!("Bearer {}", team_token("team_a"));
    let response = send(app(), preflight("/v8/artifacts/h1%20x", "GET", Some(&auth))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(location(&response).path(), "/team_a/h1%20x");
}

#[tokio::test]
async fn test_hash_with_invalid_utf8_is_not_found() {
    let auth = format!("Bearer {}", team_token("team_a"));
    let response = send(app(), preflight("/v8/artifacts/h1%FF", "GET", Some(&auth))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grant_without_bearer_prefix() {
    let response = send(
        app(),
        preflight("/v8/artifacts/h1", "GET", Some(&team_token("team_abc123"))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_teams_cannot_share_keys() {
    let app = app();
    let a = format!("Bearer {}", team_token("team_a"));
    let b = format!("Bearer {}", team_token("team_b"));

    let response_a = send(app.clone(), preflight("/v8/artifacts/h1", "GET", Some(&a))).await;
    let response_b = send(app, preflight("/v8/artifacts/h1", "GET", Some(&b))).await;

    assert_eq!(location(&response_a).path(), "/team_a/h1");
    assert_eq!(location(&response_b).path(), "/team_b/h1");
}

#[rstest]
#[case("DELETE")]
#[case("POST")]
#[case("get")]
#[case("")]
#[tokio::test]
async fn test_unsupported_hint_is_not_found(#[case] hint: &str) {
    let auth = format!("Bearer {}", team_token("team_abc123"));
    let response = send(app(), preflight("/v8/artifacts/h1", hint, Some(&auth))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "Not found");
}

#[tokio::test]
async fn test_missing_hash_is_not_found() {
    let auth = format!("Bearer {}", team_token("team_abc123"));
    let response = send(app(), preflight("/v8/artifacts/", "GET", Some(&auth))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grants_are_not_memoized() {
    let app = app();
    let auth = format!("Bearer {}", team_token("team_abc123"));

    let first = send(app.clone(), preflight("/v8/artifacts/h1", "GET", Some(&auth))).await;
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let second = send(app, preflight("/v8/artifacts/h1", "GET", Some(&auth))).await;

    let first = location(&first);
    let second = location(&second);
    assert_eq!(first.path(), second.path());
    assert_ne!(
        query_value(&first, "X-Amz-Date"),
        query_value(&second, "X-Amz-Date")
    );
    assert_ne!(
        query_value(&first, "X-Amz-Signature"),
        query_value(&second, "X-Amz-Signature")
    );
}

#[tokio::test]
async fn test_missing_secret_is_a_startup_fault() {
    let mut config = test_config();
    config.jwt_secret = None;

    let err = remote_cache_gateway::run_server(config).await.unwrap_err();
    let config_err = err.downcast_ref::<ConfigError>().expect("configuration fault");
    assert!(matches!(config_err, ConfigError::Missing("JWT_SECRET")));
}

#[tokio::test]
async fn test_server_stops_on_shutdown_signal() {
    let result = remote_cache_gateway::run_server_with_shutdown(test_config(), async {}).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_missing_bucket_is_a_startup_fault() {
    let mut config = test_config();
    config.s3_bucket = None;

    assert!(matches!(
        AppState::new(config),
        Err(ConfigError::Missing("S3_BUCKET"))
    ));
}
