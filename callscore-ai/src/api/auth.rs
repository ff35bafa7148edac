//! Accounts, sessions and the bearer-token middleware
//!
//! Signup and login are public. Every other `/api` route passes through
//! [`auth_middleware`], which resolves the token to an [`Identity`] and
//! stores it as a request extension.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use callscore_common::api::{hash_password, verify_password, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::{organizations, sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Roles allowed on every authenticated route
pub const MEMBER_ROLES: &[Role] = &[Role::Admin, Role::User];

/// Authenticated caller, as resolved from the session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub org_id: String,
    pub role: Role,
}

impl Identity {
    /// Reject callers whose role is not in `allowed` (403)
    pub fn authorize(&self, allowed: &[Role]) -> ApiResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            debug!(user_id = %self.user_id, role = %self.role, "Role not permitted");
            Err(ApiError::Forbidden)
        }
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve `Authorization: Bearer <token>` or reject with 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(ApiError::Unauthorized)?;

    let session = sessions::find_identity(&state.db, token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(Identity {
        user_id: session.user_id,
        org_id: session.org_id,
        role: session.role,
    });

    Ok(next.run(request).await)
}

/// A field counts as missing when absent or empty
fn required<'a>(field: &'a Option<String>) -> Option<&'a str> {
    field.as_deref().filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub org_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub success: bool,
    pub user_id: String,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = payload?;
    let (Some(email), Some(password), Some(display_name), Some(org_name)) = (
        required(&body.email),
        required(&body.password),
        required(&body.display_name),
        required(&body.org_name),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    let role = match required(&body.role) {
        Some(raw) => raw.parse::<Role>().map_err(ApiError::BadRequest)?,
        None => Role::User,
    };

    if users::email_exists(&state.db, email).await? {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let org = organizations::find_or_create(&state.db, org_name).await?;
    let password = hash_password(password);

    let user = users::create(
        &state.db,
        users::NewUser {
            email,
            password: &password,
            display_name,
            role,
            org_id: &org.id,
        },
    )
    .await?;

    info!(user_id = %user.id, org_id = %org.id, role = %role, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            user_id: user.id,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(body) = payload?;
    let (Some(email), Some(password)) = (required(&body.email), required(&body.password)) else {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    };

    let (user, stored) = users::find_with_credentials(&state.db, email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(password, &stored) {
        debug!(user_id = %user.id, "Password mismatch");
        return Err(ApiError::Unauthorized);
    }

    let token = sessions::create(&state.db, &user.id).await?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        role: user.role,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    request: Request,
) -> ApiResult<StatusCode> {
    if let Some(token) = bearer_token(&request) {
        sessions::delete(&state.db, token).await?;
        debug!(user_id = %identity.user_id, "Session ended");
    }
    Ok(StatusCode::NO_CONTENT)
}
