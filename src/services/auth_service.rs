use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        auth::{AuthPayload, LoginRequest, RegisterRequest},
        profile::UpdateProfileRequest,
    },
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, issue_token},
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// New accounts are always customers; staff accounts come from the seed binary.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthPayload>> {
    let new_user = payload.validate()?;

    let exist = Users::find()
        .filter(UserCol::Email.eq(new_user.email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(&new_user.password)?;

    let model = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(new_user.email),
        password_hash: Set(password_hash),
        name: Set(new_user.name),
        role: Set(Role::User.as_str().to_string()),
        phone: Set(new_user.phone),
        address: Set(new_user.address),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "User already exists"))?;

    let user = User::try_from(model)?;
    let token = issue_token(&user, &state.config.jwt_secret)?;

    audit::record(
        &state.pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::created(
        "User registered successfully",
        AuthPayload { user, token },
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthPayload>> {
    let (email, password) = payload.validate()?;

    let model = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&model.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::InvalidCredentials);
    }

    let user = User::try_from(model)?;
    let token = issue_token(&user, &state.config.jwt_secret)?;

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Login successful",
        AuthPayload { user, token },
        Some(Meta::empty()),
    ))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(ApiResponse::success(
        "Profile fetched successfully",
        User::try_from(model)?,
        None,
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let changes = payload.validate()?;

    let taken = Users::find()
        .filter(UserCol::Email.eq(changes.email.as_str()))
        .filter(UserCol::Id.ne(user.user_id))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let mut active: UserActive = existing.into();
    active.name = Set(changes.name);
    active.email = Set(changes.email);
    active.phone = Set(changes.phone);
    active.address = Set(changes.address);
    active.updated_at = Set(Utc::now().into());
    let model = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email is already taken"))?;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        User::try_from(model)?,
        None,
    ))
}
