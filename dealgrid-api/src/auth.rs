use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::info;

use dealgrid_core::user::User;

use crate::error::AppError;
use crate::middleware::auth::{user_auth_middleware, UserClaims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            user_auth_middleware,
        ));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    // 1. Minimal shape checks; uniqueness is the real gate
    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "username, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::ValidationError(
            "email is not a valid address".to_string(),
        ));
    }

    // 2. Reject duplicates before hashing
    if state
        .user_repo
        .find_by_username(username)
        .await
        .map_err(AppError::storage)?
        .is_some()
    {
        return Err(AppError::ConflictError(
            "Username already registered".to_string(),
        ));
    }
    if state
        .user_repo
        .find_by_email(email)
        .await
        .map_err(AppError::storage)?
        .is_some()
    {
        return Err(AppError::ConflictError(
            "Email already registered".to_string(),
        ));
    }

    // 3. Hash and persist
    let hashed = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?;
    let user = state
        .user_repo
        .create_user(username, email, &hashed, req.full_name.as_deref())
        .await
        .map_err(AppError::storage)?;

    info!("Registered user {} ({})", user.id, user.username);
    Ok(Json(user))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    // 1. Look up the account; a missing user and a wrong password are
    //    indistinguishable to the caller
    let user = state
        .user_repo
        .find_by_username(req.username.trim())
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| {
            AppError::AuthenticationError("Incorrect username or password".to_string())
        })?;

    // 2. Verify credentials
    if !bcrypt::verify(&req.password, &user.hashed_password)? {
        return Err(AppError::AuthenticationError(
            "Incorrect username or password".to_string(),
        ));
    }
    if !user.is_active {
        return Err(AppError::AuthenticationError(
            "Account is disabled".to_string(),
        ));
    }

    // 3. Issue the token
    let claims = UserClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /auth/me
async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<User>, AppError> {
    let user_id = claims.user_id()?;
    let user = state
        .user_repo
        .find_by_id(user_id)
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::AuthenticationError("User no longer exists".to_string()))?;

    Ok(Json(user))
}
