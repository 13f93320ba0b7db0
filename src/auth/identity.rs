use axum::http::header::{self, HeaderName};
use axum::http::HeaderMap;
use axum::response::AppendHeaders;
use rand::Rng;

const ANONYMOUS_ID_LEN: usize = 21;
const ANONYMOUS_ID_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// The actor behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Signed in through the external provider; carries the user id.
    User(String),
    /// Not signed in; carries the persistent anonymous id from the cookie.
    Anonymous(String),
}

impl Identity {
    pub fn id(&self) -> &str {
        match self {
            Identity::User(id) | Identity::Anonymous(id) => id,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }

    /// Storage namespace of the id. User ids and anonymous ids are separate
    /// key spaces, so a cookie that happens to equal a user id stays
    /// anonymous.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::User(_) => "user",
            Identity::Anonymous(_) => "anonymous",
        }
    }
}

/// Result of identity resolution: who is acting, plus the cookie the
/// response must set when a fresh anonymous id was minted.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub identity: Identity,
    pub set_cookie: Option<String>,
}

impl RequestIdentity {
    pub fn id(&self) -> &str {
        self.identity.id()
    }

    /// Headers to attach to the response. Empty unless a new anonymous id
    /// has to be persisted.
    pub fn headers(&self) -> AppendHeaders<Vec<(HeaderName, String)>> {
        AppendHeaders(
            self.set_cookie
                .iter()
                .map(|cookie| (header::SET_COOKIE, cookie.clone()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct IdentityCookie<'a> {
    pub name: &'a str,
    pub max_age_days: u64,
}

/// Picks the identity for a request.
///
/// A signed-in user always wins. Otherwise a well-formed anonymous cookie is
/// reused, and failing that a new anonymous id is generated together with
/// the `Set-Cookie` value that persists it.
pub fn resolve(
    session_user: Option<String>,
    cookie_value: Option<&str>,
    cookie: &IdentityCookie<'_>,
) -> RequestIdentity {
    if let Some(user_id) = session_user {
        return RequestIdentity {
            identity: Identity::User(user_id),
            set_cookie: None,
        };
    }

    if let Some(existing) = cookie_value.filter(|v| is_valid_anonymous_id(v)) {
        return RequestIdentity {
            identity: Identity::Anonymous(existing.to_string()),
            set_cookie: None,
        };
    }

    let id = generate_anonymous_id();
    let set_cookie = Some(identity_cookie(cookie.name, &id, cookie.max_age_days));
    tracing::debug!("issued anonymous identity");
    RequestIdentity {
        identity: Identity::Anonymous(id),
        set_cookie,
    }
}

/// Random URL-safe id, 21 characters (~126 bits).
pub fn generate_anonymous_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ANONYMOUS_ID_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ANONYMOUS_ID_CHARSET.len());
            ANONYMOUS_ID_CHARSET[idx] as char
        })
        .collect()
}

fn is_valid_anonymous_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 64
        && value.bytes().all(|b| ANONYMOUS_ID_CHARSET.contains(&b))
}

pub fn identity_cookie(name: &str, id: &str, max_age_days: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name,
        id,
        max_age_days * 24 * 3600
    )
}

pub fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name,
        token,
        max_age_hours * 3600
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

pub fn get_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}
