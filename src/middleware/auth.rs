use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{authenticate, AuthError, BasicCredentials};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, injected into request extensions by `basic_auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub roles: Vec<String>,
}

/// HTTP Basic authentication plus the role check for cash card routes.
///
/// Bad or missing credentials end in 401; a valid user without the required role in 403.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let realm = &state.auth.realm;

    let credentials = extract_credentials(&headers).map_err(|e| {
        tracing::debug!("Rejecting request to {}: {}", request.uri().path(), e);
        ApiError::unauthorized(e.to_string(), realm.as_str())
    })?;

    let username = credentials.username.clone();
    let account = authenticate(state.users.as_ref(), credentials)
        .await
        .map_err(|e| authentication_failure(&username, e, realm))?;

    if !account.has_role(&state.auth.required_role) {
        tracing::warn!(
            "User '{}' lacks role '{}' for {}",
            account.username,
            state.auth.required_role,
            request.uri().path()
        );
        return Err(ApiError::forbidden("Access denied"));
    }

    tracing::debug!("Authenticated '{}' for {} {}", account.username, request.method(), request.uri().path());

    request.extensions_mut().insert(AuthUser {
        username: account.username,
        roles: account.roles,
    });

    Ok(next.run(request).await)
}

fn authentication_failure(username: &str, err: AuthError, realm: &str) -> ApiError {
    match err {
        AuthError::Verification(_) | AuthError::Hashing(_) => {
            ApiError::internal_server_error("An error occurred while processing your request")
        }
        _ => {
            tracing::warn!("Authentication failed for '{}': {}", username, err);
            ApiError::unauthorized(err.to_string(), realm)
        }
    }
}

fn extract_credentials(headers: &HeaderMap) -> Result<BasicCredentials, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;
    BasicCredentials::from_header(value)
}

/// The caller's identity, used as the owner filter by every cash card handler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner(pub String);

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .map(|user| Owner(user.username.clone()))
            .ok_or_else(|| ApiError::unauthorized("Authentication required", state.auth.realm.as_str()))
    }
}
