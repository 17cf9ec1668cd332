use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        reviewdb::ReviewExt,
        servicedb::{ServiceExt, ServiceListFilters, ServiceSort},
        userdb::UserExt,
    },
    dtos::{
        reviewdtos::{CreateReviewDto, FilterReviewDto},
        servicedtos::{
            CreateServiceDto, FilterServiceDto, ServiceListQueryDto, ServiceSearchQueryDto,
            UpdateServiceDto,
        },
        userdtos::UserSummaryDto,
    },
    error::HttpError,
    middleware::{auth, role_check, JWTAuthMiddleware},
    models::usermodel::UserRole,
    utils::pagination::{self, Pagination},
    AppState,
};

pub fn services_handler() -> Router {
    let protected = Router::new()
        .route(
            "/",
            post(create_service).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Provider, UserRole::Admin])
            })),
        )
        .route(
            "/:service_id",
            put(update_service)
                .delete(delete_service)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Provider, UserRole::Admin])
                })),
        )
        .route("/:service_id/reviews", post(create_review))
        .layer(middleware::from_fn(auth));

    Router::new()
        .route("/", get(get_services))
        .route("/search", get(search_services))
        .route("/:service_id", get(get_service_by_id))
        .route("/:service_id/reviews", get(get_service_reviews))
        .merge(protected)
}

pub async fn get_services(
    Query(query): Query<ServiceListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = pagination::parse_page(query.page.as_deref());
    let limit = pagination::parse_limit(query.limit.as_deref(), 12);

    let filters = ServiceListFilters::from_query(&query);
    let sort = ServiceSort::from_query(query.sort_by.as_deref(), query.sort_order.as_deref());

    let (services, total) = app_state
        .db_client
        .get_services(&filters, &sort, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut filtered = Vec::new();
    for service in &services {
        let provider = app_state
            .db_client
            .get_user(Some(service.provider_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        filtered.push(FilterServiceDto::from_service(
            service,
            provider.as_ref().map(UserSummaryDto::from_user),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "data": filtered,
        "pagination": Pagination::new(page, limit, total),
    })))
}

/// Keyword search; results are ranked by rating, then review count.
pub async fn search_services(
    Query(query): Query<ServiceSearchQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = pagination::parse_page(query.page.as_deref());
    let limit = pagination::parse_limit(query.limit.as_deref(), 12);

    let filters = ServiceListFilters::from_search_query(&query);

    let (services, total) = app_state
        .db_client
        .get_services(&filters, &ServiceSort::TopRated, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut filtered = Vec::new();
    for service in &services {
        let provider = app_state
            .db_client
            .get_user(Some(service.provider_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        filtered.push(FilterServiceDto::from_service(
            service,
            provider.as_ref().map(UserSummaryDto::from_user),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "data": filtered,
        "pagination": Pagination::new(page, limit, total),
    })))
}

pub async fn get_service_by_id(
    Path(service_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found"))?;

    let provider = app_state
        .db_client
        .get_user(Some(service.provider_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": FilterServiceDto::from_service(
            &service,
            provider.as_ref().map(UserSummaryDto::from_user),
        ),
    })))
}

pub async fn create_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<CreateServiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let service = app_state
        .db_client
        .create_service(auth_user.user.id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered =
        FilterServiceDto::from_service(&service, Some(UserSummaryDto::from_user(&auth_user.user)));

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Service created successfully",
            "data": filtered,
        })),
    ))
}

pub async fn update_service(
    Path(service_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<UpdateServiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found"))?;

    if !service.can_modify(auth_user.user.id) {
        return Err(HttpError::forbidden("Not authorized to update this service"));
    }

    let updated = app_state
        .db_client
        .update_service(service_id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found"))?;

    let provider = app_state
        .db_client
        .get_user(Some(updated.provider_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Service updated successfully",
        "data": FilterServiceDto::from_service(
            &updated,
            provider.as_ref().map(UserSummaryDto::from_user),
        ),
    })))
}

pub async fn delete_service(
    Path(service_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found"))?;

    if !service.can_modify(auth_user.user.id) {
        return Err(HttpError::forbidden("Not authorized to delete this service"));
    }

    app_state
        .db_client
        .delete_service(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Service deleted successfully",
    })))
}

pub async fn get_service_reviews(
    Path(service_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found"))?;

    let reviews = app_state
        .db_client
        .get_reviews_for_service(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut filtered = Vec::new();
    for review in &reviews {
        let customer = app_state
            .db_client
            .get_user(Some(review.customer_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        filtered.push(FilterReviewDto::from_review(
            review,
            customer.as_ref().map(UserSummaryDto::from_user),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "data": filtered,
        "total": filtered.len(),
    })))
}

pub async fn create_review(
    Path(service_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let service = app_state
        .db_client
        .get_service_by_id(service_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Service not found"))?;

    let review = app_state
        .db_client
        .create_review(service_id, auth_user.user.id, service.provider_id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Review submitted successfully",
            "data": FilterReviewDto::from_review(
                &review,
                Some(UserSummaryDto::from_user(&auth_user.user)),
            ),
        })),
    ))
}
