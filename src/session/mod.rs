use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cookie holding the encoded session record.
pub const SESSION_COOKIE: &str = "user_session";

/// Absolute session lifetime; the cookie max-age and the token expiry match.
const SESSION_TTL_DAYS: i64 = 7;

/// Minimal identity payload carried in the browser cookie after login.
/// Replaced wholesale at the next login; never persisted server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub name: String,
    pub fullname: String,
    pub email: String,
    pub sysadmin: bool,
}

impl SessionRecord {
    /// Derives a session record from a CKAN user payload. `fullname` falls
    /// back to the username when the remote record leaves it blank.
    pub fn from_user(user: &Value) -> Self {
        let name = str_field(user, "name");
        let fullname = user
            .get("fullname")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(&name)
            .to_string();

        Self {
            id: str_field(user, "id"),
            fullname,
            email: str_field(user, "email"),
            sysadmin: user.get("sysadmin").and_then(Value::as_bool).unwrap_or(false),
            name,
        }
    }
}

fn str_field(user: &Value, key: &str) -> String {
    user.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    name: String,
    fullname: String,
    email: String,
    sysadmin: bool,
    exp: i64,
    iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session secret not configured")]
    MissingSecret,
    #[error("session encoding failed: {0}")]
    Encode(String),
    #[error("malformed session")]
    Malformed,
}

/// Signs the record into a compact HS256 token. The source console stored an
/// unsigned JSON blob client-side; signing is a deliberate hardening step.
pub fn encode_session(record: &SessionRecord, secret: &str) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let now = Utc::now();
    let claims = Claims {
        id: record.id.clone(),
        name: record.name.clone(),
        fullname: record.fullname.clone(),
        email: record.email.clone(),
        sysadmin: record.sysadmin,
        exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        iat: now.timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| SessionError::Encode(e.to_string()))
}

/// Inverse of [`encode_session`]. Any failure (bad signature, expiry, garbage
/// input, unset secret) is `Malformed`: callers treat the request as
/// unauthenticated rather than raising to the user.
pub fn decode_session(token: &str, secret: &str) -> Result<SessionRecord, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::Malformed);
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| SessionError::Malformed)?;

    let claims = data.claims;
    Ok(SessionRecord {
        id: claims.id,
        name: claims.name,
        fullname: claims.fullname,
        email: claims.email,
        sysadmin: claims.sysadmin,
    })
}

/// Builds the session cookie: http-only, lax same-site, scoped to `/`, 7-day
/// max-age. The secure attribute is set only for production deployments.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::days(SESSION_TTL_DAYS));
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> SessionRecord {
        SessionRecord {
            id: "u-1".into(),
            name: "alice".into(),
            fullname: "Alice Adams".into(),
            email: "alice@example.org".into(),
            sysadmin: true,
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let token = encode_session(&record(), "secret").unwrap();
        let decoded = decode_session(&token, "secret").unwrap();
        assert_eq!(decoded, record());
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = encode_session(&record(), "secret").unwrap();
        assert!(matches!(decode_session(&token, "other"), Err(SessionError::Malformed)));
    }

    #[test]
    fn test_decode_rejects_tampered_token() {
        let mut token = encode_session(&record(), "secret").unwrap();
        token.push('x');
        assert!(matches!(decode_session(&token, "secret"), Err(SessionError::Malformed)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_session("not-a-token", "secret"), Err(SessionError::Malformed)));
    }

    #[test]
    fn test_encode_requires_secret() {
        assert!(matches!(encode_session(&record(), ""), Err(SessionError::MissingSecret)));
    }

    #[test]
    fn test_record_from_user_defaults() {
        let user = json!({ "id": "u-2", "name": "bob", "fullname": "" });
        let rec = SessionRecord::from_user(&user);
        assert_eq!(rec.name, "bob");
        assert_eq!(rec.fullname, "bob");
        assert_eq!(rec.email, "");
        assert!(!rec.sysadmin);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok".into(), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }
}
