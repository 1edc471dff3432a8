use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::models::UserRole;

/// Identity of the authenticated caller, as asserted by the upstream session
/// layer. Authentication itself is not this service's job; the auth proxy in
/// front of it validates the session and forwards these headers.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: String,
    pub role: UserRole,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Middleware requiring a caller identity on every request. A request with
/// no identity is unauthenticated, which is fatal: no leaderboard fallback
/// applies, the request is rejected here.
pub async fn identity_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let role = match headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("user")
    {
        "admin" => UserRole::Admin,
        _ => UserRole::User,
    };

    tracing::debug!("Authenticated caller: {} (role: {})", user_id, role.as_str());

    request.extensions_mut().insert(CallerIdentity {
        user_id: user_id.to_string(),
        role,
    });

    Ok(next.run(request).await)
}
