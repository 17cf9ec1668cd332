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
        opportunitydb::{AlreadyApplied, OpportunityExt, OpportunityListFilters, OpportunitySort},
        userdb::UserExt,
    },
    dtos::{
        opportunitydtos::{
            ApplicantEntryDto, ApplyOpportunityDto, CreateOpportunityDto, FilterOpportunityDto,
            OpportunityDetailDto, OpportunityListQueryDto, PopulatedApplicantDto,
            UpdateOpportunityDto,
        },
        userdtos::UserSummaryDto,
    },
    error::HttpError,
    middleware::{auth, JWTAuthMiddleware},
    utils::pagination::{self, Pagination},
    AppState,
};

/// A repeat application is the caller's mistake; anything else on the apply
/// path is internal.
fn map_apply_error(e: anyhow::Error) -> HttpError {
    if e.downcast_ref::<AlreadyApplied>().is_some() {
        HttpError::bad_request(AlreadyApplied.to_string())
    } else {
        HttpError::server_error(e.to_string())
    }
}

pub fn opportunities_handler() -> Router {
    let protected = Router::new()
        .route("/", post(create_opportunity))
        .route(
            "/:opportunity_id",
            put(update_opportunity).delete(delete_opportunity),
        )
        .route("/:opportunity_id/apply", post(apply_to_opportunity))
        .layer(middleware::from_fn(auth));

    Router::new()
        .route("/", get(get_opportunities))
        .route("/:opportunity_id", get(get_opportunity_by_id))
        .merge(protected)
}

pub async fn get_opportunities(
    Query(query): Query<OpportunityListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = pagination::parse_page(query.page.as_deref());
    let limit = pagination::parse_limit(query.limit.as_deref(), 12);

    let filters = OpportunityListFilters::from_query(&query);
    let sort = OpportunitySort::from_query(query.sort_by.as_deref(), query.sort_order.as_deref());

    let (opportunities, total) = app_state
        .db_client
        .get_opportunities(&filters, &sort, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut filtered = Vec::new();
    for opportunity in &opportunities {
        let poster = app_state
            .db_client
            .get_user(Some(opportunity.posted_by), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        let applicants = app_state
            .db_client
            .get_applicants(opportunity.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .iter()
            .map(ApplicantEntryDto::from_applicant)
            .collect();

        filtered.push(FilterOpportunityDto::from_opportunity(
            opportunity,
            poster.as_ref().map(UserSummaryDto::from_user),
            applicants,
        ));
    }

    Ok(Json(json!({
        "success": true,
        "data": filtered,
        "pagination": Pagination::new(page, limit, total),
    })))
}

pub async fn get_opportunity_by_id(
    Path(opportunity_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let opportunity = app_state
        .db_client
        .get_opportunity_by_id(opportunity_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Opportunity not found"))?;

    let poster = app_state
        .db_client
        .get_user(Some(opportunity.posted_by), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let applicants = app_state
        .db_client
        .get_applicants(opportunity.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut populated = Vec::new();
    for applicant in &applicants {
        let user = app_state
            .db_client
            .get_user(Some(applicant.user_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        populated.push(PopulatedApplicantDto {
            user: user.as_ref().map(UserSummaryDto::from_user),
            message: applicant.message.clone(),
            applied_at: applicant.applied_at,
        });
    }

    Ok(Json(json!({
        "success": true,
        "data": OpportunityDetailDto::from_opportunity(
            &opportunity,
            poster.as_ref().map(UserSummaryDto::from_user),
            populated,
        ),
    })))
}

pub async fn create_opportunity(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<CreateOpportunityDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let opportunity = app_state
        .db_client
        .create_opportunity(auth_user.user.id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let filtered = FilterOpportunityDto::from_opportunity(
        &opportunity,
        Some(UserSummaryDto::from_user(&auth_user.user)),
        vec![],
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Opportunity posted successfully",
            "data": filtered,
        })),
    ))
}

pub async fn apply_to_opportunity(
    Path(opportunity_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<ApplyOpportunityDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    app_state
        .db_client
        .get_opportunity_by_id(opportunity_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Opportunity not found"))?;

    app_state
        .db_client
        .apply_to_opportunity(opportunity_id, auth_user.user.id, body.message)
        .await
        .map_err(map_apply_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Application submitted successfully",
    })))
}

pub async fn update_opportunity(
    Path(opportunity_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
    Json(body): Json<UpdateOpportunityDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let opportunity = app_state
        .db_client
        .get_opportunity_by_id(opportunity_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Opportunity not found"))?;

    if !opportunity.can_modify(auth_user.user.id) {
        return Err(HttpError::forbidden(
            "Not authorized to update this opportunity",
        ));
    }

    let updated = app_state
        .db_client
        .update_opportunity(opportunity_id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Opportunity not found"))?;

    let applicants = app_state
        .db_client
        .get_applicants(updated.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .iter()
        .map(ApplicantEntryDto::from_applicant)
        .collect();

    Ok(Json(json!({
        "success": true,
        "message": "Opportunity updated successfully",
        "data": FilterOpportunityDto::from_opportunity(
            &updated,
            Some(UserSummaryDto::from_user(&auth_user.user)),
            applicants,
        ),
    })))
}

pub async fn delete_opportunity(
    Path(opportunity_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let opportunity = app_state
        .db_client
        .get_opportunity_by_id(opportunity_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Opportunity not found"))?;

    if !opportunity.can_modify(auth_user.user.id) {
        return Err(HttpError::forbidden(
            "Not authorized to delete this opportunity",
        ));
    }

    app_state
        .db_client
        .delete_opportunity(opportunity_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Opportunity deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_application_maps_to_a_client_error() {
        let err = map_apply_error(AlreadyApplied.into());
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Already applied to this opportunity");
    }

    #[test]
    fn other_apply_failures_stay_internal() {
        let err = map_apply_error(anyhow::anyhow!("connection reset (db=10.0.0.3)"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("10.0.0.3"));
    }

    // The apply path carries exactly one client-facing rejection besides the
    // existence check; a posting's status never produces one.
    #[test]
    fn apply_rejections_are_limited_to_duplicates() {
        let duplicate = map_apply_error(AlreadyApplied.into());
        assert!(duplicate.status.is_client_error());

        let other = map_apply_error(anyhow::anyhow!("anything else"));
        assert!(other.status.is_server_error());
    }
}
