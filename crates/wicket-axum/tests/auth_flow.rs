//! End-to-end behavior of a guarded router: statuses, reason messages, and
//! credential propagation, exercised through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
    routing::post,
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;
use wicket_auth::{
    AuthOptions, Claims, CookieTokenAuthenticator, IdentityResolver, Resolution,
};
use wicket_axum::{AuthCredentials, require_auth};

const PRIVATE_KEY: &str = "8F6DA9E8-4A86-4B3E-ABBB-199E17EE5B70";

fn sign(claims: &Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(PRIVATE_KEY.as_bytes()),
    )
    .unwrap()
}

fn token_cookie(username: &str) -> String {
    format!("access_token={}", sign(&json!({"username": username})))
}

/// User-store double: one known user, one erroring lookup, two
/// broken-credentials lookups, everyone else unknown.
struct AccountResolver;

#[async_trait]
impl IdentityResolver for AccountResolver {
    async fn resolve(&self, claims: Claims) -> Resolution {
        match claims.get("username").and_then(Value::as_str) {
            Some("johndoe") => Resolution::accept(json!({"user": "johndoe", "scope": ["a"]})),
            Some("jane") => Resolution::fail("identity store unreachable"),
            Some("invalid1") => Resolution::accept(json!("bad")),
            Some("nullman") => Resolution::accept(Value::Null),
            _ => Resolution::reject(),
        }
    }
}

async fn token_handler(AuthCredentials(credentials): AuthCredentials) -> Json<Value> {
    Json(json!({"text": "ok", "credentials": credentials}))
}

async fn open_handler() -> Json<Value> {
    Json(json!({"text": "no token needed"}))
}

fn app(resolver: Option<Arc<dyn IdentityResolver>>) -> Router {
    let scheme = Arc::new(
        CookieTokenAuthenticator::new(AuthOptions {
            key: PRIVATE_KEY.to_string(),
            resolver,
            ..AuthOptions::default()
        })
        .unwrap(),
    );

    let guarded = require_auth(Router::new().route("/token", post(token_handler)), scheme);
    guarded.route("/open", post(open_handler))
}

async fn call(app: Router, cookie: Option<&str>) -> (StatusCode, HeaderMap, Value) {
    call_path(app, "/token", cookie).await
}

async fn call_path(app: Router, path: &str, cookie: Option<&str>) -> (StatusCode, HeaderMap, Value) {
    let mut request = Request::builder().method("POST").uri(path);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn returns_a_reply_on_successful_auth() {
    let (status, _, body) = call(
        app(Some(Arc::new(AccountResolver))),
        Some(&token_cookie("johndoe")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], json!("ok"));
    assert_eq!(
        body["credentials"],
        json!({"user": "johndoe", "scope": ["a"]})
    );
}

#[tokio::test]
async fn returns_decoded_token_when_no_resolver_is_set() {
    let (status, _, body) = call(app(None), Some(&token_cookie("johndoe"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials"]["username"], json!("johndoe"));
}

#[tokio::test]
async fn returns_an_error_on_wrong_cookie() {
    let (status, headers, body) = call(
        app(Some(Arc::new(AccountResolver))),
        Some("JUST_A_EXAMPLE=BLAH"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "Missing access token");
    assert_eq!(
        headers.get(header::WWW_AUTHENTICATE).unwrap(),
        "AccessToken"
    );
}

#[tokio::test]
async fn returns_an_error_without_cookie_header() {
    let (status, _, body) = call(app(Some(Arc::new(AccountResolver))), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "Missing access token");
}

#[tokio::test]
async fn returns_an_error_with_expired_token() {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        - 600;
    let cookie = format!(
        "access_token={}",
        sign(&json!({"username": "johndoe", "exp": exp}))
    );

    let (status, _, body) = call(app(Some(Arc::new(AccountResolver))), Some(&cookie)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        message(&body),
        "Expired token received for JSON Web Token validation"
    );
}

#[tokio::test]
async fn returns_an_error_with_tampered_token() {
    let cookie = format!("{}15643287619", token_cookie("johndoe"));

    let (status, _, body) = call(app(Some(Arc::new(AccountResolver))), Some(&cookie)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        message(&body),
        "Invalid signature received for JSON Web Token validation"
    );
}

#[tokio::test]
async fn returns_an_error_on_bad_token_format() {
    for value in ["Bearer", "bearer", "bearer 123"] {
        let cookie = format!("access_token={value}");
        let (status, _, body) =
            call(app(Some(Arc::new(AccountResolver))), Some(&cookie)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "value {value:?}");
        assert_eq!(message(&body), "Bad HTTP authentication header format");
    }
}

#[tokio::test]
async fn returns_an_error_on_unknown_user() {
    let (status, _, body) = call(
        app(Some(Arc::new(AccountResolver))),
        Some(&token_cookie("doe")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "Invalid token");
}

#[tokio::test]
async fn returns_an_error_on_resolver_failure_without_leaking_the_cause() {
    let (status, _, body) = call(
        app(Some(Arc::new(AccountResolver))),
        Some(&token_cookie("jane")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message(&body), "An internal server error occurred");
    assert!(!body.to_string().contains("unreachable"));
}

#[tokio::test]
async fn returns_an_error_on_non_object_credentials() {
    for username in ["invalid1", "nullman"] {
        let (status, _, body) = call(
            app(Some(Arc::new(AccountResolver))),
            Some(&token_cookie(username)),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "username {username:?}");
        assert_eq!(message(&body), "An internal server error occurred");
    }
}

#[tokio::test]
async fn finds_the_token_among_other_cookies() {
    let cookie = format!("session=abc; {}; theme=dark", token_cookie("johndoe"));

    let (status, _, body) = call(app(Some(Arc::new(AccountResolver))), Some(&cookie)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials"]["user"], json!("johndoe"));
}

#[tokio::test]
async fn repeating_a_request_gives_the_same_outcome() {
    let app = app(Some(Arc::new(AccountResolver)));
    let cookie = token_cookie("johndoe");

    let (first_status, _, first_body) = call(app.clone(), Some(&cookie)).await;
    let (second_status, _, second_body) = call(app, Some(&cookie)).await;

    assert_eq!(first_status, second_status);
    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn open_routes_need_no_token() {
    let (status, _, body) =
        call_path(app(Some(Arc::new(AccountResolver))), "/open", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], json!("no token needed"));
}

/// Accepts any username after a per-identity delay; used to interleave
/// in-flight attempts.
struct SlowEchoResolver;

#[async_trait]
impl IdentityResolver for SlowEchoResolver {
    async fn resolve(&self, claims: Claims) -> Resolution {
        let username = claims
            .get("username")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let delay = (username.len() as u64) * 9 % 50;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Resolution::accept(json!({"user": username}))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_requests_resolve_independently() {
    let app = app(Some(Arc::new(SlowEchoResolver)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let app = app.clone();
            let username = format!("user-{}{}", i, "x".repeat(i));
            tokio::spawn(async move {
                let cookie = token_cookie(&username);
                let (status, _, body) = call(app, Some(&cookie)).await;
                (username, status, body)
            })
        })
        .collect();

    for handle in handles {
        let (username, status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "user {username}");
        assert_eq!(body["credentials"]["user"], json!(username));
    }
}
