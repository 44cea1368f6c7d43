use axum::{Router, extract::State, routing::post};

use crate::{
    dto::coupons::{CouponValidation, ValidateCouponRequest},
    error::AppResult,
    extractors::ValidatedJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(validate_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Coupon is valid", body = ApiResponse<CouponValidation>),
        (status = 404, description = "Invalid coupon code")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ValidateCouponRequest>,
) -> AppResult<ApiResponse<CouponValidation>> {
    coupon_service::validate_coupon(&state, payload).await
}
