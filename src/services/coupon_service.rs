use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::coupons::{CouponList, CouponRequest, CouponValidation, ValidateCouponRequest},
    entity::coupons::{ActiveModel, Column, Entity as Coupons, Model},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    response::{ApiResponse, Empty},
    state::AppState,
};

const DUPLICATE_CODE: &str = "Coupon code already exists";
const CODE_IN_USE: &str = "Coupon code cannot change after it has been used";

/// Active coupon by its normalized code.
pub(crate) async fn find_active<C: ConnectionTrait>(conn: &C, code: &str) -> AppResult<Option<Model>> {
    Ok(Coupons::find()
        .filter(Column::Code.eq(code))
        .filter(Column::IsActive.eq(true))
        .one(conn)
        .await?)
}

pub async fn validate_coupon(
    state: &AppState,
    payload: ValidateCouponRequest,
) -> AppResult<ApiResponse<CouponValidation>> {
    let code = payload.validate()?;
    let coupon = find_active(&state.orm, &code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid coupon code".into()))?;

    Ok(ApiResponse::success(
        "Coupon is valid",
        CouponValidation {
            code: coupon.code,
            discount: coupon.discount,
            influencer_name: coupon.influencer_name,
        },
        None,
    ))
}

pub async fn list_coupons(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;

    let items = Coupons::find()
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();

    Ok(ApiResponse::success(
        "Coupons fetched successfully",
        CouponList { items },
        None,
    ))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let fields = payload.validate()?;

    let exist = Coupons::find()
        .filter(Column::Code.eq(fields.code.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict(DUPLICATE_CODE.into()));
    }

    let coupon = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(fields.code),
        discount: Set(fields.discount),
        influencer_name: Set(fields.influencer_name),
        is_active: Set(fields.is_active),
        usage_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique_violation(e, DUPLICATE_CODE))?;

    audit::record(
        &state.pool,
        user.user_id,
        "coupon_create",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code }),
    )
    .await;

    Ok(ApiResponse::created(
        "Coupon created successfully",
        Coupon::from(coupon),
    ))
}

/// Usage count is left untouched.
pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let fields = payload.validate()?;

    let txn = state.orm.begin().await?;

    // Locked so a checkout cannot count a use between the check and the rename.
    let existing = Coupons::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Coupon"))?;

    // Orders reference coupons by code.
    if existing.usage_count > 0 && existing.code != fields.code {
        return Err(AppError::InvalidState(CODE_IN_USE.into()));
    }

    let taken = Coupons::find()
        .filter(Column::Code.eq(fields.code.as_str()))
        .filter(Column::Id.ne(id))
        .one(&txn)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(DUPLICATE_CODE.into()));
    }

    let mut active: ActiveModel = existing.into();
    active.code = Set(fields.code);
    active.discount = Set(fields.discount);
    active.influencer_name = Set(fields.influencer_name);
    active.is_active = Set(fields.is_active);
    active.updated_at = Set(Utc::now().into());
    let coupon = active
        .update(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, DUPLICATE_CODE))?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "coupon_update",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Coupon updated successfully",
        Coupon::from(coupon),
        None,
    ))
}

/// Orders keep the code string they were placed with.
pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    ensure_admin(user)?;

    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Coupon"));
    }

    audit::record(
        &state.pool,
        user.user_id,
        "coupon_delete",
        "coupons",
        serde_json::json!({ "coupon_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Coupon deleted successfully"))
}
