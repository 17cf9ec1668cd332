use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        bookingdb::{parse_status_filter, BookingExt, BookingSort},
        servicedb::ServiceExt,
        userdb::UserExt,
    },
    dtos::{
        bookingdtos::{
            BookingListQueryDto, CreateBookingDto, FilterBookingDto, UpdateBookingDto,
        },
        servicedtos::ServiceSummaryDto,
        userdtos::BookingPartyDto,
    },
    error::HttpError,
    middleware::{auth, JWTAuthMiddleware},
    models::bookingmodel::Booking,
    utils::pagination::{self, Pagination},
    AppState,
};

pub fn bookings_handler() -> Router {
    Router::new()
        .route("/", get(get_bookings).post(create_booking))
        .route("/:booking_id", get(get_booking_by_id).put(update_booking))
        .route("/:booking_id/cancel", patch(cancel_booking))
        .layer(middleware::from_fn(auth))
}

/// Expands a booking row with its service summary and both parties.
async fn populate_booking(
    app_state: &AppState,
    booking: &Booking,
) -> Result<FilterBookingDto, HttpError> {
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

    Ok(FilterBookingDto::from_booking(
        booking,
        service.as_ref().map(ServiceSummaryDto::from_service),
        customer.as_ref().map(BookingPartyDto::from_user),
        provider.as_ref().map(BookingPartyDto::from_user),
    ))
}

pub async fn get_bookings(
    Query(query): Query<BookingListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let page = pagination::parse_page(query.page.as_deref());
    let limit = pagination::parse_limit(query.limit.as_deref(), 10);
    let status = parse_status_filter(query.status.as_deref());

    let (bookings, total) = app_state
        .db_client
        .get_bookings_for_user(auth_user.user.id, status, BookingSort::Schedule, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut filtered = Vec::new();
    for booking in &bookings {
        filtered.push(populate_booking(&app_state, booking).await?);
    }

    Ok(Json(json!({
        "success": true,
        "data": filtered,
        "pagination": Pagination::new(page, limit, total),
    })))
}

pub async fn create_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<CreateBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let service = app_state
        .db_client
        .get_service_by_id(body.service)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found"))?;

    let booking = app_state
        .db_client
        .create_booking(
            auth_user.user.id,
            service.provider_id,
            service.default_booking_price(),
            body,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered = populate_booking(&app_state, &booking).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Booking created successfully",
            "data": filtered,
        })),
    ))
}

pub async fn get_booking_by_id(
    Path(booking_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .db_client
        .get_booking_by_id(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    if !booking.can_access(auth_user.user.id) {
        return Err(HttpError::forbidden("Not authorized to view this booking"));
    }

    let filtered = populate_booking(&app_state, &booking).await?;

    Ok(Json(json!({
        "success": true,
        "data": filtered,
    })))
}

pub async fn update_booking(
    Path(booking_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<UpdateBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let booking = app_state
        .db_client
        .get_booking_by_id(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    if !booking.can_access(auth_user.user.id) {
        return Err(HttpError::forbidden("Not authorized to update this booking"));
    }

    let updated = app_state
        .db_client
        .update_booking(booking_id, body.status, body.notes)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    let filtered = populate_booking(&app_state, &updated).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Booking updated successfully",
        "data": filtered,
    })))
}

pub async fn cancel_booking(
    Path(booking_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .db_client
        .get_booking_by_id(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    if !booking.can_access(auth_user.user.id) {
        return Err(HttpError::forbidden("Not authorized to cancel this booking"));
    }

    let cancelled = app_state
        .db_client
        .cancel_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    let filtered = populate_booking(&app_state, &cancelled).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Booking cancelled successfully",
        "data": filtered,
    })))
}
