// src/admin/session.rs
//! Admin session cookie: a base64 JSON blob `{username, issuedAt}` with a
//! 24-hour server-enforced TTL. The decision logic is pure; the
//! middleware adds the database lookup and the redirects.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

/// One day, in the cookie's own unit (epoch milliseconds)
pub const SESSION_TTL_MS: i64 = 1000 * 60 * 60 * 24;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdminSessionCookie {
    pub username: String,
    #[serde(rename = "issuedAt")]
    pub issued_at: i64,
}

#[derive(Debug, Error)]
pub enum CookieDecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdminSessionCookie {
    pub fn encode(&self) -> String {
        // Serialization of two plain fields cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        BASE64.encode(json)
    }

    pub fn decode(raw: &str) -> Result<Self, CookieDecodeError> {
        let bytes = BASE64.decode(raw)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis - self.issued_at >= SESSION_TTL_MS
    }
}

/// Structural verdict on a presented cookie, before any backing lookup
#[derive(Debug, Clone, PartialEq)]
pub enum SessionVerdict {
    /// Decodes and is within its TTL; the admins table still decides
    Intact(AdminSessionCookie),
    /// Decoded but older than the TTL; the cookie gets deleted
    Expired,
    /// Absent, undecodable, or missing fields; a present cookie gets deleted
    Malformed { cookie_present: bool },
}

pub fn evaluate_cookie(raw: Option<&str>, now_millis: i64) -> SessionVerdict {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            return SessionVerdict::Malformed {
                cookie_present: false,
            }
        }
    };

    match AdminSessionCookie::decode(raw) {
        Ok(cookie) => {
            if cookie.is_expired(now_millis) {
                SessionVerdict::Expired
            } else {
                SessionVerdict::Intact(cookie)
            }
        }
        Err(e) => {
            debug!(error = %e, "Invalid session cookie");
            SessionVerdict::Malformed {
                cookie_present: true,
            }
        }
    }
}

/// Whether a structurally intact session still maps to an admin record.
/// An unknown username invalidates the session but, unlike expiry, does
/// not delete the cookie.
pub async fn admin_exists(pool: &SqlitePool, username: &str) -> bool {
    let row: Result<Option<(String,)>, sqlx::Error> =
        sqlx::query_as("SELECT username FROM admins WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await;

    matches!(row, Ok(Some(_)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Valid admin on the login page: send them to the dashboard
    RedirectToDashboard,
    /// Anonymous visitor on a protected page: send them to login
    RedirectToLogin,
    Continue,
}

pub const LOGIN_PATH: &str = "/auth";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Pure routing rule of (path, validity)
pub fn route_action(path: &str, is_valid_admin: bool) -> RouteAction {
    if path == LOGIN_PATH && is_valid_admin {
        return RouteAction::RedirectToDashboard;
    }

    if path.starts_with(DASHBOARD_PATH) && !is_valid_admin {
        return RouteAction::RedirectToLogin;
    }

    RouteAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 1000 * 60 * 60;

    fn cookie_issued_hours_ago(hours: i64, now: i64) -> String {
        AdminSessionCookie {
            username: "elchevere".to_string(),
            issued_at: now - hours * HOUR_MS,
        }
        .encode()
    }

    #[test]
    fn test_cookie_roundtrip() {
        let cookie = AdminSessionCookie {
            username: "elchevere".to_string(),
            issued_at: 1_700_000_000_000,
        };
        let decoded = AdminSessionCookie::decode(&cookie.encode()).unwrap();
        assert_eq!(decoded, cookie);
    }

    #[test]
    fn test_cookie_decode_accepts_camel_case_field() {
        // Wire format uses issuedAt
        let raw = BASE64.encode(br#"{"username":"elchevere","issuedAt":123}"#);
        let decoded = AdminSessionCookie::decode(&raw).unwrap();
        assert_eq!(decoded.issued_at, 123);
    }

    #[test]
    fn test_fresh_cookie_is_intact() {
        let now = 1_700_000_000_000;
        let verdict = evaluate_cookie(Some(&cookie_issued_hours_ago(23, now)), now);
        assert!(matches!(verdict, SessionVerdict::Intact(_)));
    }

    #[test]
    fn test_25_hour_old_cookie_is_expired_regardless_of_username() {
        let now = 1_700_000_000_000;
        let verdict = evaluate_cookie(Some(&cookie_issued_hours_ago(25, now)), now);
        assert_eq!(verdict, SessionVerdict::Expired);
    }

    #[test]
    fn test_exactly_24_hours_is_expired() {
        let now = 1_700_000_000_000;
        let verdict = evaluate_cookie(Some(&cookie_issued_hours_ago(24, now)), now);
        assert_eq!(verdict, SessionVerdict::Expired);
    }

    #[test]
    fn test_garbage_cookie_is_malformed() {
        let verdict = evaluate_cookie(Some("not base64!!!"), 0);
        assert_eq!(
            verdict,
            SessionVerdict::Malformed {
                cookie_present: true
            }
        );

        // Valid base64, wrong shape
        let raw = BASE64.encode(br#"{"user":"x"}"#);
        let verdict = evaluate_cookie(Some(&raw), 0);
        assert_eq!(
            verdict,
            SessionVerdict::Malformed {
                cookie_present: true
            }
        );
    }

    #[test]
    fn test_missing_cookie_is_malformed_but_not_present() {
        assert_eq!(
            evaluate_cookie(None, 0),
            SessionVerdict::Malformed {
                cookie_present: false
            }
        );
        assert_eq!(
            evaluate_cookie(Some(""), 0),
            SessionVerdict::Malformed {
                cookie_present: false
            }
        );
    }

    #[test]
    fn test_route_action_rules() {
        // Valid admin on the login page goes to the dashboard
        assert_eq!(
            route_action("/auth", true),
            RouteAction::RedirectToDashboard
        );
        // Anonymous visitor may see the login page
        assert_eq!(route_action("/auth", false), RouteAction::Continue);

        // Dashboard paths are gated, including sub-paths
        assert_eq!(
            route_action("/admin/dashboard", false),
            RouteAction::RedirectToLogin
        );
        assert_eq!(
            route_action("/admin/dashboard/settings", false),
            RouteAction::RedirectToLogin
        );
        assert_eq!(route_action("/admin/dashboard", true), RouteAction::Continue);

        // Everything else passes through unconditionally
        assert_eq!(route_action("/", false), RouteAction::Continue);
        assert_eq!(route_action("/reviews", true), RouteAction::Continue);
    }

    #[tokio::test]
    async fn test_admin_exists_checks_backing_record() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::common::migrations::run_migrations(&pool).await.unwrap();

        assert!(!admin_exists(&pool, "elchevere").await);

        sqlx::query("INSERT INTO admins (username) VALUES ('elchevere')")
            .execute(&pool)
            .await
            .unwrap();

        assert!(admin_exists(&pool, "elchevere").await);
        assert!(!admin_exists(&pool, "someone-else").await);
    }
}
