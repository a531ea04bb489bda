// session_gate_middleware.rs
//! Gate for the admin area, evaluated on every inbound request
//!
//! Reads the admin_session cookie, checks its TTL and the backing admins
//! record, then applies the routing rules: signed-in admins skip the
//! login page, anonymous visitors cannot reach the dashboard. The
//! admin-validity decision is never cached across requests.

use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::admin::session::{
    admin_exists, evaluate_cookie, route_action, RouteAction, SessionVerdict,
    ADMIN_SESSION_COOKIE, DASHBOARD_PATH, LOGIN_PATH,
};
use crate::common::AppState;

/// Value of a cookie from the Cookie header, if present
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let mut parts = pair.trim().splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(key), Some(value)) if key == name => Some(value.to_string()),
            _ => None,
        }
    })
}

fn expired_cookie_header() -> HeaderValue {
    // Cannot fail: the string is static and ASCII
    HeaderValue::from_str(&format!("{}=; Path=/; Max-Age=0", ADMIN_SESSION_COOKIE))
        .unwrap_or(HeaderValue::from_static(""))
}

/// Session-gate middleware
pub async fn session_gate_middleware(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let raw_cookie = cookie_value(request.headers(), ADMIN_SESSION_COOKIE);

    let mut is_valid_admin = false;
    let mut delete_cookie = false;

    match evaluate_cookie(raw_cookie.as_deref(), Utc::now().timestamp_millis()) {
        SessionVerdict::Intact(cookie) => {
            let db = state_lock.read().await.db.clone();
            if admin_exists(&db, &cookie.username).await {
                is_valid_admin = true;
            } else {
                // Username no longer backed by an admins row: invalid,
                // but the cookie is left in place (it ages out on its own)
                debug!(username = %cookie.username, "Admin session has no backing record");
            }
        }
        SessionVerdict::Expired => {
            debug!("Expired admin session cookie");
            delete_cookie = true;
        }
        SessionVerdict::Malformed { cookie_present } => {
            if cookie_present {
                warn!("Invalid admin session cookie");
                delete_cookie = true;
            }
        }
    }

    let mut response = match route_action(&path, is_valid_admin) {
        RouteAction::RedirectToDashboard => Redirect::to(DASHBOARD_PATH).into_response(),
        RouteAction::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
        RouteAction::Continue => next.run(request).await,
    };

    if delete_cookie {
        response
            .headers_mut()
            .append(header::SET_COOKIE, expired_cookie_header());
    }

    response
}
