// Admin module - the signed-in-admin session cookie and the routing
// rules the session-gate middleware applies

pub mod session;

pub use session::{
    evaluate_cookie, route_action, AdminSessionCookie, RouteAction, SessionVerdict,
    ADMIN_SESSION_COOKIE, SESSION_TTL_MS,
};
