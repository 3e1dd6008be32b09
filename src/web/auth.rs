//! Identity resolution for the registry API.
//!
//! Authentication happens upstream (reverse proxy / SSO); this middleware
//! only reads the headers that layer sets and attaches the resolved
//! `Identity` to the request. The core never sees an unauthenticated call.

use axum::{
    Json,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::core::models::Identity;

pub const USER_HEADER: &str = "x-remote-user";
pub const ROLE_HEADER: &str = "x-remote-role";
pub const ADMIN_ROLE: &str = "admin";

pub async fn identity_middleware(mut req: Request, next: Next) -> Response {
    let Some(identity) = identity_from_headers(req.headers()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "authentication required"})),
        )
            .into_response();
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}

fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let username = headers.get(USER_HEADER)?.to_str().ok()?.trim();
    if username.is_empty() {
        return None;
    }

    let is_admin = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|role| role.trim() == ADMIN_ROLE)
        .unwrap_or(false);

    Some(Identity {
        username: username.to_string(),
        is_admin,
    })
}
