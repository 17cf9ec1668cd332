use std::sync::Arc;

use axum::{
    extract::Query,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::{
        bookingdb::{parse_status_filter, BookingExt, BookingSort},
        servicedb::ServiceExt,
        userdb::UserExt,
    },
    dtos::{
        bookingdtos::{BookingListQueryDto, FilterBookingDto},
        servicedtos::{FilterServiceDto, ServiceSummaryDto},
        userdtos::{AvatarUpdateDto, BookingPartyDto, FilterUserDto, UpdateProfileDto, UserSummaryDto},
    },
    error::HttpError,
    middleware::{auth, JWTAuthMiddleware},
    utils::pagination::{self, Pagination},
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/avatar", put(update_avatar))
        .route("/services", get(get_own_services))
        .route("/bookings", get(get_own_bookings))
        .layer(middleware::from_fn(auth))
}

pub async fn get_profile(
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(json!({
        "success": true,
        "data": {
            "user": FilterUserDto::filter_user(&auth_user.user),
        }
    })))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let user = app_state
        .db_client
        .update_user_profile(auth_user.user.id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "data": {
            "user": FilterUserDto::filter_user(&user),
        }
    })))
}

pub async fn update_avatar(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<AvatarUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let user = app_state
        .db_client
        .update_user_avatar(auth_user.user.id, &body.avatar)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Avatar updated successfully",
        "data": {
            "user": FilterUserDto::filter_user(&user),
        }
    })))
}

/// Services owned by the authenticated provider, active or not.
pub async fn get_own_services(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let services = app_state
        .db_client
        .get_services_by_provider(auth_user.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered: Vec<FilterServiceDto> = services
        .iter()
        .map(|s| {
            FilterServiceDto::from_service(s, Some(UserSummaryDto::from_user(&auth_user.user)))
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": filtered,
        "total": filtered.len(),
    })))
}

pub async fn get_own_bookings(
    Query(query): Query<BookingListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let page = pagination::parse_page(query.page.as_deref());
    let limit = pagination::parse_limit(query.limit.as_deref(), 10);
    let status = parse_status_filter(query.status.as_deref());

    let (bookings, total) = app_state
        .db_client
        .get_bookings_for_user(auth_user.user.id, status, BookingSort::Newest, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut filtered = Vec::new();
    for booking in &bookings {
        let service = app_state
            .db_client
            .get_service_by_id(booking.service_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
        let customer = app_state
            .db_client
            .get_user(Some(booking.customer_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
        let provider = app_state
            .db_client
            .get_user(Some(booking.provider_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        filtered.push(FilterBookingDto::from_booking(
            booking,
            service.as_ref().map(ServiceSummaryDto::from_service),
            customer.as_ref().map(BookingPartyDto::from_user),
            provider.as_ref().map(BookingPartyDto::from_user),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "data": filtered,
        "pagination": Pagination::new(page, limit, total),
    })))
}
