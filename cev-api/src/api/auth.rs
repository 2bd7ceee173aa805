//! Authentication middleware for cev-api
//!
//! HTTP Basic credentials checked against the `users` table.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use cev_common::api::{decode_basic_auth, verify_user, ApiAuthError, ErrorResponse};
use tracing::{error, warn};

use crate::AppState;

/// Realm advertised in `WWW-Authenticate`
const REALM: &str = "Basic realm=\"cev\"";

/// Authentication middleware
///
/// Returns 401 Unauthorized when credentials are missing or wrong.
///
/// **Note:** This is applied to protected routes only.
/// Health endpoint (/health) does NOT use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.auth_enabled {
        return Ok(next.run(request).await);
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError(ApiAuthError::MissingCredentials))?
        .to_str()
        .map_err(|_| {
            AuthError(ApiAuthError::MalformedHeader(
                "header is not visible ASCII".to_string(),
            ))
        })?;

    let credentials = decode_basic_auth(header_value).map_err(AuthError)?;

    verify_user(&state.db, &credentials).await.map_err(|e| {
        match &e {
            ApiAuthError::DatabaseError(msg) => error!("Credential lookup failed: {}", msg),
            _ => warn!("Rejected credentials for user '{}'", credentials.username),
        }
        AuthError(e)
    })?;

    Ok(next.run(request).await)
}

/// Authentication failure rendered as an HTTP response
#[derive(Debug)]
pub struct AuthError(pub ApiAuthError);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ApiAuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };

        let mut response = (status, Json(ErrorResponse::new(self.0.to_string()))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
        }
        response
    }
}
