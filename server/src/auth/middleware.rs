//! Authentication extractor.
//!
//! The console front-end presents the bearer token it received at login. The
//! token is not validated here; it selects the session and is forwarded to
//! the upstream backend, which is the authority on it.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};

use crate::session::SessionId;
use crate::AppState;

/// Authenticated console user extracted from request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Session selected by the bearer token
    pub session_id: SessionId,
}

impl AuthUser {
    /// Resolve the caller from an `Authorization` header value.
    pub fn from_header(
        state: &AppState,
        header: Option<&str>,
    ) -> Result<Self, (StatusCode, &'static str)> {
        match parse_bearer(header, state.config.require_auth)? {
            Some(token) => Ok(Self::with_token(state, token)),
            None => Ok(AuthUser {
                session_id: SessionId::anonymous(),
            }),
        }
    }

    /// The caller presenting `token`; the token becomes the session's credential.
    pub fn with_token(state: &AppState, token: &str) -> Self {
        let session_id = SessionId::from_token(token);
        state
            .sessions
            .session(&session_id)
            .credentials()
            .set(token.to_string());
        AuthUser { session_id }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        AuthUser::from_header(state, auth_header)
    }
}

/// Interpret an `Authorization` header value.
///
/// `Ok(None)` means anonymous access, only allowed when auth is not required.
fn parse_bearer(
    header: Option<&str>,
    require_auth: bool,
) -> Result<Option<&str>, (StatusCode, &'static str)> {
    match header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = header.trim_start_matches("Bearer ").trim();
            if token.is_empty() {
                return Err((StatusCode::UNAUTHORIZED, "Empty bearer token"));
            }
            Ok(Some(token))
        }
        Some(_) => Err((
            StatusCode::UNAUTHORIZED,
            "Invalid authorization header format",
        )),
        None if require_auth => Err((StatusCode::UNAUTHORIZED, "Missing authorization header")),
        None => Ok(None),
    }
}
