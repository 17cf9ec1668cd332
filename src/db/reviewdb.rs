use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::db::DBClient, dtos::reviewdtos::CreateReviewDto, models::reviewmodel::Review};

#[async_trait]
pub trait ReviewExt {
    /// Inserts the review and refreshes the service's rating aggregate.
    async fn create_review(
        &self,
        service_id: Uuid,
        customer_id: Uuid,
        provider_id: Uuid,
        review: CreateReviewDto,
    ) -> Result<Review, sqlx::Error>;

    async fn get_reviews_for_service(
        &self,
        service_id: Uuid,
    ) -> Result<Vec<Review>, sqlx::Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(
        &self,
        service_id: Uuid,
        customer_id: Uuid,
        provider_id: Uuid,
        review: CreateReviewDto,
    ) -> Result<Review, sqlx::Error> {
        let verified = review.booking_id.is_some();

        let saved = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews
                (service_id, customer_id, provider_id, booking_id, rating, comment, verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(customer_id)
        .bind(provider_id)
        .bind(review.booking_id)
        .bind(review.rating)
        .bind(review.comment)
        .bind(verified)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE services
            SET rating = (SELECT COALESCE(AVG(rating), 0) FROM reviews WHERE service_id = $1),
                review_count = (SELECT COUNT(*) FROM reviews WHERE service_id = $1),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(service_id)
        .execute(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn get_reviews_for_service(
        &self,
        service_id: Uuid,
    ) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE service_id = $1 ORDER BY created_at DESC",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
    }
}
