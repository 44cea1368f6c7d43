use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        auth::{AuthPayload, LoginRequest, RegisterRequest},
        profile::UpdateProfileRequest,
    },
    error::AppResult,
    extractors::ValidatedJson,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn profile_router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<AuthPayload>),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<ApiResponse<AuthPayload>> {
    auth_service::register_user(&state, payload).await
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<AuthPayload>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthPayload>> {
    auth_service::login_user(&state, payload).await
}

#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 511, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<User>> {
    auth_service::get_profile(&state, &user).await
}

#[utoipa::path(
    put,
    path = "/api/user/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<User>),
        (status = 409, description = "Email is already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<ApiResponse<User>> {
    auth_service::update_profile(&state, &user, payload).await
}
