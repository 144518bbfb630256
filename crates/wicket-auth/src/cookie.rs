//! Cookie helpers: extracting the access token from a request and building
//! `Set-Cookie` values for callers that place or clear it.

use httpdate::fmt_http_date;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extract a named cookie value from a raw `Cookie` header.
///
/// Pairs are `;`-separated, names are matched exactly after trimming, and
/// the first match wins. Values may themselves contain `=`.
pub fn token_from_cookie_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (pair_name, value) = pair.split_once('=')?;
        (pair_name.trim() == name).then_some(value.trim())
    })
}

/// SameSite attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// SameSite=Strict
    Strict,
    /// SameSite=Lax
    Lax,
    /// SameSite=None
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Options used to build the access-token cookie.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    /// Cookie name.
    pub name: String,

    /// Cookie path.
    pub path: String,

    /// Optional cookie domain.
    pub domain: Option<String>,

    /// Send on HTTPS only.
    pub secure: bool,

    /// Not accessible to JS.
    pub http_only: bool,

    /// SameSite attribute.
    pub same_site: SameSite,

    /// Max-Age in seconds.
    pub max_age_seconds: Option<u64>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: ACCESS_TOKEN_COOKIE.to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            max_age_seconds: None,
        }
    }
}

fn write_attributes(cookie: &mut String, opts: &CookieOptions) {
    cookie.push_str("; Path=");
    cookie.push_str(&opts.path);

    if let Some(domain) = &opts.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }

    if opts.secure {
        cookie.push_str("; Secure");
    }
    if opts.http_only {
        cookie.push_str("; HttpOnly");
    }

    cookie.push_str("; SameSite=");
    cookie.push_str(opts.same_site.as_str());
}

/// Build a `Set-Cookie` header value carrying `token`.
pub fn build_set_cookie(token: &str, opts: &CookieOptions) -> String {
    let mut cookie = format!("{}={token}", opts.name);
    write_attributes(&mut cookie, opts);

    if let Some(max_age) = opts.max_age_seconds {
        cookie.push_str(&format!("; Max-Age={max_age}"));
        // Expires for older clients.
        let expires = SystemTime::now() + Duration::from_secs(max_age);
        cookie.push_str(&format!("; Expires={}", fmt_http_date(expires)));
    }

    cookie
}

/// Build a `Set-Cookie` header value that clears the cookie.
pub fn build_clear_cookie(opts: &CookieOptions) -> String {
    let mut cookie = format!("{}=", opts.name);
    write_attributes(&mut cookie, opts);
    cookie.push_str("; Max-Age=0");
    cookie.push_str(&format!("; Expires={}", fmt_http_date(UNIX_EPOCH)));
    cookie
}
