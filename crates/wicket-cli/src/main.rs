use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, Subcommand};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wicket_auth::{
    AuthOptions, Claims, CookieOptions, CookieTokenAuthenticator, IdentityResolver, Resolution,
    build_clear_cookie, build_set_cookie,
};
use wicket_axum::{AuthCredentials, require_auth};

#[derive(Debug, Parser)]
#[command(name = "wicket", about = "Wicket CLI — mint access tokens, run the demo gate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign an access token for manual testing
    Mint {
        /// Signing secret shared with the server
        #[arg(long)]
        key: String,

        /// Claim to embed, repeatable: --claim accountId=123
        #[arg(long = "claim", value_parser = parse_key_val)]
        claims: Vec<(String, String)>,

        /// Lifetime in seconds; negative mints an already-expired token
        #[arg(long)]
        expires_in: Option<i64>,

        /// Print a ready-to-paste Cookie header value instead of the bare token
        #[arg(long)]
        cookie: bool,
    },

    /// Run the demo server: guarded /protected, open /open, cookie-issuing /login
    Serve {
        /// Signing secret
        #[arg(long)]
        key: String,

        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Mint {
            key,
            claims,
            expires_in,
            cookie,
        } => {
            let token = mint_token(&key, &claims, expires_in)?;
            if cookie {
                println!("access_token={token}");
            } else {
                println!("{token}");
            }
        }
        Commands::Serve { key, addr } => serve(key, &addr).await?,
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let pos = s.find('=').ok_or_else(|| "must be KEY=VALUE".to_string())?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

fn sign_payload(key: &str, payload: &Value) -> Result<String> {
    jsonwebtoken::encode(
        &Header::default(),
        payload,
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .context("failed to sign token")
}

fn mint_token(key: &str, claims: &[(String, String)], expires_in: Option<i64>) -> Result<String> {
    let mut payload = serde_json::Map::new();
    for (name, raw) in claims {
        // Claim values given as valid JSON keep their type; the rest are strings.
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
        payload.insert(name.clone(), value);
    }
    if let Some(expires_in) = expires_in {
        payload.insert("exp".to_string(), json!(unix_now() + expires_in));
    }
    sign_payload(key, &Value::Object(payload))
}

/// Fixed account table backing the demo resolver.
struct AccountDirectory {
    accounts: BTreeMap<i64, Value>,
}

impl AccountDirectory {
    fn demo() -> Self {
        Self {
            accounts: BTreeMap::from([(
                123,
                json!({"id": 123, "user": "john", "fullName": "John Doe"}),
            )]),
        }
    }
}

#[async_trait]
impl IdentityResolver for AccountDirectory {
    async fn resolve(&self, claims: Claims) -> Resolution {
        let Some(account_id) = claims.get("accountId").and_then(Value::as_i64) else {
            return Resolution::reject();
        };
        match self.accounts.get(&account_id) {
            Some(account) => Resolution::accept(account.clone()),
            None => Resolution::reject(),
        }
    }
}

#[derive(Clone)]
struct DemoState {
    key: Arc<String>,
    accounts: Arc<BTreeMap<i64, Value>>,
}

// The demo listens on plain HTTP, so the cookie cannot be Secure.
fn demo_cookie_options() -> CookieOptions {
    CookieOptions {
        secure: false,
        ..CookieOptions::default()
    }
}

async fn protected_handler(AuthCredentials(credentials): AuthCredentials) -> Json<Value> {
    Json(json!({
        "text": "I am a JSON response, and you needed a token to get me.",
        "credentials": credentials,
    }))
}

async fn open_handler() -> Json<Value> {
    Json(json!({
        "text": "I am a JSON response, but you did not need a token to get me",
    }))
}

async fn login_handler(
    Path(account_id): Path<i64>,
    State(state): State<DemoState>,
) -> Response {
    if !state.accounts.contains_key(&account_id) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let Ok(token) = sign_payload(&state.key, &json!({"accountId": account_id})) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let cookie = build_set_cookie(&token, &demo_cookie_options());
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({"text": "token issued"})),
    )
        .into_response()
}

async fn logout_handler() -> impl IntoResponse {
    let cookie = build_clear_cookie(&demo_cookie_options());
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({"text": "token cleared"})),
    )
}

async fn serve(key: String, addr: &str) -> Result<()> {
    let directory = AccountDirectory::demo();
    let state = DemoState {
        key: Arc::new(key.clone()),
        accounts: Arc::new(directory.accounts.clone()),
    };

    let scheme = Arc::new(CookieTokenAuthenticator::new(
        AuthOptions::with_key(key.clone()).resolver(Arc::new(directory)),
    )?);

    let token = sign_payload(&key, &json!({"accountId": 123}))?;
    println!("demo token: {token}");
    println!("try: curl -H 'Cookie: access_token={token}' http://{addr}/protected");
    println!("     curl http://{addr}/open");

    let guarded = require_auth(
        Router::<DemoState>::new().route("/protected", get(protected_handler)),
        scheme,
    );
    let app = guarded
        .route("/open", get(open_handler))
        .route("/login/{account_id}", get(login_handler))
        .route("/logout", get(logout_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "wicket demo listening");
    axum::serve(listener, app).await?;
    Ok(())
}
