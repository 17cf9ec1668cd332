use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    dtos::servicedtos::{CreateServiceDto, ServiceListQueryDto, ServiceSearchQueryDto, UpdateServiceDto},
    models::servicemodel::{Service, ServiceCategory},
    utils::pagination,
};

/// Structured filter for service listings. Absent fields mean "no
/// constraint"; listings always constrain on the active flag.
#[derive(Debug, Default, Clone)]
pub struct ServiceListFilters {
    pub category: Option<ServiceCategory>,
    pub search: Option<String>,
    pub location: Option<String>,
}

impl ServiceListFilters {
    pub fn from_query(query: &ServiceListQueryDto) -> Self {
        ServiceListFilters {
            category: query.category.as_deref().and_then(parse_category),
            search: query.search.clone().filter(|s| !s.is_empty()),
            location: query.location.clone().filter(|l| !l.is_empty()),
        }
    }

    pub fn from_search_query(query: &ServiceSearchQueryDto) -> Self {
        ServiceListFilters {
            category: query.category.as_deref().and_then(parse_category),
            search: query.q.clone().filter(|s| !s.is_empty()),
            location: query.location.clone().filter(|l| !l.is_empty()),
        }
    }
}

/// The sentinel "all" and anything outside the category enum degrade to
/// "no constraint".
fn parse_category(raw: &str) -> Option<ServiceCategory> {
    serde_json::from_str(&format!("\"{}\"", raw)).ok()
}

#[derive(Debug, Clone)]
pub enum ServiceSort {
    Field { column: &'static str, descending: bool },
    /// Rating first, then review count; used by the search endpoint.
    TopRated,
}

impl ServiceSort {
    pub fn from_query(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        ServiceSort::Field {
            column: sort_column(sort_by.unwrap_or("createdAt")),
            // Anything other than the literal "desc" sorts ascending.
            descending: sort_order.unwrap_or("desc") == "desc",
        }
    }

    fn order_by(&self) -> String {
        match self {
            ServiceSort::Field { column, descending } => {
                format!(" ORDER BY {} {}", column, if *descending { "DESC" } else { "ASC" })
            }
            ServiceSort::TopRated => " ORDER BY rating DESC, review_count DESC".to_string(),
        }
    }
}

fn sort_column(key: &str) -> &'static str {
    match key {
        "name" => "name",
        "rating" => "rating",
        "reviewCount" => "review_count",
        "price" => "price_min",
        _ => "created_at",
    }
}

fn push_service_filters(qb: &mut QueryBuilder<Postgres>, filters: &ServiceListFilters) {
    qb.push(" WHERE is_active = TRUE");

    if let Some(category) = filters.category {
        qb.push(" AND category = ").push_bind(category);
    }

    if let Some(ref search) = filters.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM unnest(specialties) AS s WHERE s ILIKE ")
            .push_bind(pattern)
            .push("))");
    }

    if let Some(ref location) = filters.location {
        qb.push(" AND location ILIKE ").push_bind(format!("%{}%", location));
    }
}

#[async_trait]
pub trait ServiceExt {
    async fn get_services(
        &self,
        filters: &ServiceListFilters,
        sort: &ServiceSort,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Service>, i64), sqlx::Error>;

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error>;

    async fn get_services_by_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<Service>, sqlx::Error>;

    async fn create_service(
        &self,
        provider_id: Uuid,
        service: CreateServiceDto,
    ) -> Result<Service, sqlx::Error>;

    async fn update_service(
        &self,
        service_id: Uuid,
        service: UpdateServiceDto,
    ) -> Result<Option<Service>, sqlx::Error>;

    async fn delete_service(&self, service_id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl ServiceExt for DBClient {
    async fn get_services(
        &self,
        filters: &ServiceListFilters,
        sort: &ServiceSort,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Service>, i64), sqlx::Error> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM services");
        push_service_filters(&mut count_query, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM services");
        push_service_filters(&mut query, filters);
        query.push(sort.order_by());
        query
            .push(" LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination::offset(page, limit));

        let services = query
            .build_query_as::<Service>()
            .fetch_all(&self.pool)
            .await?;

        Ok((services, total))
    }

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_services_by_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE provider_id = $1 ORDER BY created_at DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_service(
        &self,
        provider_id: Uuid,
        service: CreateServiceDto,
    ) -> Result<Service, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services
                (provider_id, name, category, description, price_min, price_max,
                 duration, specialties, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(provider_id)
        .bind(service.name)
        .bind(service.category)
        .bind(service.description)
        .bind(service.price_range.min)
        .bind(service.price_range.max)
        .bind(service.duration)
        .bind(service.specialties.unwrap_or_default())
        .bind(service.location)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_service(
        &self,
        service_id: Uuid,
        service: UpdateServiceDto,
    ) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = COALESCE($2, name),
                category = COALESCE($3, category),
                description = COALESCE($4, description),
                price_min = COALESCE($5, price_min),
                price_max = COALESCE($6, price_max),
                duration = COALESCE($7, duration),
                specialties = COALESCE($8, specialties),
                location = COALESCE($9, location),
                availability = COALESCE($10, availability),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(service.name)
        .bind(service.category)
        .bind(service.description)
        .bind(service.price_range.map(|p| p.min))
        .bind(service.price_range.map(|p| p.max))
        .bind(service.duration)
        .bind(service.specialties)
        .bind(service.location)
        .bind(service.availability)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_service(&self, service_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(service_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>, search: Option<&str>) -> ServiceListQueryDto {
        ServiceListQueryDto {
            category: category.map(String::from),
            search: search.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn category_all_is_omitted_from_the_filter() {
        let filters = ServiceListFilters::from_query(&query(Some("all"), None));
        assert!(filters.category.is_none());

        let filters = ServiceListFilters::from_query(&query(Some("plumbing"), None));
        assert_eq!(filters.category, Some(ServiceCategory::Plumbing));
    }

    #[test]
    fn unknown_category_degrades_to_no_constraint() {
        let filters = ServiceListFilters::from_query(&query(Some("masonry"), None));
        assert!(filters.category.is_none());
    }

    #[test]
    fn base_constraint_is_always_applied() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM services");
        push_service_filters(&mut qb, &ServiceListFilters::default());
        let sql = qb.into_sql();
        assert!(sql.contains("is_active = TRUE"));
        assert!(!sql.contains("category"));
    }

    #[test]
    fn search_matches_case_insensitively_across_text_and_array_fields() {
        let filters = ServiceListFilters::from_query(&query(None, Some("Plumb")));
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM services");
        push_service_filters(&mut qb, &filters);
        let sql = qb.into_sql();
        assert!(sql.contains("name ILIKE"));
        assert!(sql.contains("description ILIKE"));
        assert!(sql.contains("unnest(specialties)"));
    }

    #[test]
    fn sort_order_desc_is_a_strict_literal_match() {
        let sort = ServiceSort::from_query(Some("rating"), Some("desc"));
        assert_eq!(sort.order_by(), " ORDER BY rating DESC");

        // Anything else, including uppercase, sorts ascending.
        let sort = ServiceSort::from_query(Some("rating"), Some("DESC"));
        assert_eq!(sort.order_by(), " ORDER BY rating ASC");

        let sort = ServiceSort::from_query(None, None);
        assert_eq!(sort.order_by(), " ORDER BY created_at DESC");
    }

    #[test]
    fn unknown_sort_key_falls_back_to_created_at() {
        let sort = ServiceSort::from_query(Some("password"), Some("asc"));
        assert_eq!(sort.order_by(), " ORDER BY created_at ASC");
    }

    #[test]
    fn search_endpoint_sort_is_rating_first() {
        assert_eq!(
            ServiceSort::TopRated.order_by(),
            " ORDER BY rating DESC, review_count DESC"
        );
    }
}
