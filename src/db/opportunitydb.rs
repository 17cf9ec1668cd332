use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    dtos::opportunitydtos::{CreateOpportunityDto, OpportunityListQueryDto, UpdateOpportunityDto},
    models::opportunitymodel::{Opportunity, OpportunityApplicant, OpportunityCategory},
    utils::pagination,
};

/// Marker for a repeat application by the same user, carried through the
/// anyhow error returned by `apply_to_opportunity`.
#[derive(Debug, thiserror::Error)]
#[error("Already applied to this opportunity")]
pub struct AlreadyApplied;

#[derive(Debug, Default, Clone)]
pub struct OpportunityListFilters {
    pub category: Option<OpportunityCategory>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub urgent: bool,
}

impl OpportunityListFilters {
    pub fn from_query(query: &OpportunityListQueryDto) -> Self {
        OpportunityListFilters {
            category: query
                .category
                .as_deref()
                .and_then(|c| serde_json::from_str(&format!("\"{}\"", c)).ok()),
            search: query.search.clone().filter(|s| !s.is_empty()),
            location: query.location.clone().filter(|l| !l.is_empty()),
            // Only the literal "true" narrows to urgent postings.
            urgent: query.urgent.as_deref() == Some("true"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpportunitySort {
    column: &'static str,
    descending: bool,
}

impl OpportunitySort {
    pub fn from_query(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        OpportunitySort {
            column: match sort_by.unwrap_or("createdAt") {
                "deadline" => "deadline",
                "budget" => "budget_min",
                "title" => "title",
                _ => "created_at",
            },
            descending: sort_order.unwrap_or("desc") == "desc",
        }
    }

    fn order_by(&self) -> String {
        format!(
            " ORDER BY {} {}",
            self.column,
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

fn push_opportunity_filters(qb: &mut QueryBuilder<Postgres>, filters: &OpportunityListFilters) {
    // Public listings only ever show open postings.
    qb.push(" WHERE status = 'open'");

    if let Some(category) = filters.category {
        qb.push(" AND category = ").push_bind(category);
    }

    if let Some(ref search) = filters.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM unnest(skills_required) AS s WHERE s ILIKE ")
            .push_bind(pattern)
            .push("))");
    }

    if let Some(ref location) = filters.location {
        qb.push(" AND location ILIKE ").push_bind(format!("%{}%", location));
    }

    if filters.urgent {
        qb.push(" AND urgent = TRUE");
    }
}

#[async_trait]
pub trait OpportunityExt {
    async fn get_opportunities(
        &self,
        filters: &OpportunityListFilters,
        sort: &OpportunitySort,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Opportunity>, i64), sqlx::Error>;

    async fn get_opportunity_by_id(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Option<Opportunity>, sqlx::Error>;

    async fn get_applicants(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Vec<OpportunityApplicant>, sqlx::Error>;

    async fn create_opportunity(
        &self,
        posted_by: Uuid,
        opportunity: CreateOpportunityDto,
    ) -> Result<Opportunity, sqlx::Error>;

    /// Records an application; a second application by the same user is a
    /// domain error.
    async fn apply_to_opportunity(
        &self,
        opportunity_id: Uuid,
        user_id: Uuid,
        message: Option<String>,
    ) -> Result<(), anyhow::Error>;

    async fn update_opportunity(
        &self,
        opportunity_id: Uuid,
        opportunity: UpdateOpportunityDto,
    ) -> Result<Option<Opportunity>, sqlx::Error>;

    async fn delete_opportunity(&self, opportunity_id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl OpportunityExt for DBClient {
    async fn get_opportunities(
        &self,
        filters: &OpportunityListFilters,
        sort: &OpportunitySort,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Opportunity>, i64), sqlx::Error> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM opportunities");
        push_opportunity_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM opportunities");
        push_opportunity_filters(&mut query, filters);
        query.push(sort.order_by());
        query
            .push(" LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination::offset(page, limit));

        let opportunities = query
            .build_query_as::<Opportunity>()
            .fetch_all(&self.pool)
            .await?;

        Ok((opportunities, total))
    }

    async fn get_opportunity_by_id(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Option<Opportunity>, sqlx::Error> {
        sqlx::query_as::<_, Opportunity>("SELECT * FROM opportunities WHERE id = $1")
            .bind(opportunity_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_applicants(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Vec<OpportunityApplicant>, sqlx::Error> {
        sqlx::query_as::<_, OpportunityApplicant>(
            "SELECT * FROM opportunity_applicants WHERE opportunity_id = $1 ORDER BY applied_at ASC",
        )
        .bind(opportunity_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_opportunity(
        &self,
        posted_by: Uuid,
        opportunity: CreateOpportunityDto,
    ) -> Result<Opportunity, sqlx::Error> {
        sqlx::query_as::<_, Opportunity>(
            r#"
            INSERT INTO opportunities
                (posted_by, title, description, category, budget_min, budget_max,
                 location, deadline, urgent, skills_required)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(posted_by)
        .bind(opportunity.title)
        .bind(opportunity.description)
        .bind(opportunity.category)
        .bind(opportunity.budget.min)
        .bind(opportunity.budget.max)
        .bind(opportunity.location)
        .bind(opportunity.deadline)
        .bind(opportunity.urgent.unwrap_or(false))
        .bind(opportunity.skills_required.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
    }

    async fn apply_to_opportunity(
        &self,
        opportunity_id: Uuid,
        user_id: Uuid,
        message: Option<String>,
    ) -> Result<(), anyhow::Error> {
        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM opportunity_applicants WHERE opportunity_id = $1 AND user_id = $2",
        )
        .bind(opportunity_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(AlreadyApplied.into());
        }

        sqlx::query(
            "INSERT INTO opportunity_applicants (opportunity_id, user_id, message) VALUES ($1, $2, $3)",
        )
        .bind(opportunity_id)
        .bind(user_id)
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_opportunity(
        &self,
        opportunity_id: Uuid,
        opportunity: UpdateOpportunityDto,
    ) -> Result<Option<Opportunity>, sqlx::Error> {
        sqlx::query_as::<_, Opportunity>(
            r#"
            UPDATE opportunities
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                budget_min = COALESCE($5, budget_min),
                budget_max = COALESCE($6, budget_max),
                location = COALESCE($7, location),
                deadline = COALESCE($8, deadline),
                status = COALESCE($9, status),
                urgent = COALESCE($10, urgent),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(opportunity_id)
        .bind(opportunity.title)
        .bind(opportunity.description)
        .bind(opportunity.category)
        .bind(opportunity.budget.map(|b| b.min))
        .bind(opportunity.budget.map(|b| b.max))
        .bind(opportunity.location)
        .bind(opportunity.deadline)
        .bind(opportunity.status)
        .bind(opportunity.urgent)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_opportunity(&self, opportunity_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM opportunities WHERE id = $1")
            .bind(opportunity_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(urgent: Option<&str>) -> OpportunityListQueryDto {
        OpportunityListQueryDto {
            urgent: urgent.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn public_listing_only_shows_open_postings() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM opportunities");
        push_opportunity_filters(&mut qb, &OpportunityListFilters::default());
        assert!(qb.into_sql().contains("status = 'open'"));
    }

    #[test]
    fn urgent_narrows_only_on_the_literal_true() {
        assert!(OpportunityListFilters::from_query(&query(Some("true"))).urgent);
        assert!(!OpportunityListFilters::from_query(&query(Some("false"))).urgent);
        assert!(!OpportunityListFilters::from_query(&query(Some("yes"))).urgent);
        assert!(!OpportunityListFilters::from_query(&query(None)).urgent);
    }

    #[test]
    fn search_covers_title_description_and_skills() {
        let filters = OpportunityListFilters {
            search: Some("rewire".to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM opportunities");
        push_opportunity_filters(&mut qb, &filters);
        let sql = qb.into_sql();
        assert!(sql.contains("title ILIKE"));
        assert!(sql.contains("unnest(skills_required)"));
    }

    #[test]
    fn budget_sort_key_maps_to_the_lower_bound() {
        let sort = OpportunitySort::from_query(Some("budget"), Some("asc"));
        assert_eq!(sort.order_by(), " ORDER BY budget_min ASC");

        let sort = OpportunitySort::from_query(None, None);
        assert_eq!(sort.order_by(), " ORDER BY created_at DESC");
    }
}
