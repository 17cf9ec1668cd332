use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    dtos::bookingdtos::CreateBookingDto,
    models::bookingmodel::{Booking, BookingStatus},
    utils::pagination,
};

/// Orders a user's bookings either by the appointment itself or by when
/// the record was created.
#[derive(Debug, Clone, Copy)]
pub enum BookingSort {
    Schedule,
    Newest,
}

impl BookingSort {
    fn order_by(&self) -> &'static str {
        match self {
            BookingSort::Schedule => " ORDER BY date DESC, time DESC",
            BookingSort::Newest => " ORDER BY created_at DESC",
        }
    }
}

/// An omitted or unparseable status filter means "all statuses".
pub fn parse_status_filter(raw: Option<&str>) -> Option<BookingStatus> {
    raw.and_then(|s| serde_json::from_str(&format!("\"{}\"", s)).ok())
}

fn push_booking_filters(
    qb: &mut QueryBuilder<Postgres>,
    user_id: Uuid,
    status: Option<BookingStatus>,
) {
    qb.push(" WHERE (customer_id = ")
        .push_bind(user_id)
        .push(" OR provider_id = ")
        .push_bind(user_id)
        .push(")");

    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status);
    }
}

#[async_trait]
pub trait BookingExt {
    /// Bookings visible to a user, as either customer or provider.
    async fn get_bookings_for_user(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
        sort: BookingSort,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Booking>, i64), sqlx::Error>;

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error>;

    async fn create_booking(
        &self,
        customer_id: Uuid,
        provider_id: Uuid,
        price: f64,
        booking: CreateBookingDto,
    ) -> Result<Booking, sqlx::Error>;

    async fn update_booking(
        &self,
        booking_id: Uuid,
        status: Option<BookingStatus>,
        notes: Option<String>,
    ) -> Result<Option<Booking>, sqlx::Error>;

    async fn cancel_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error>;
}

#[async_trait]
impl BookingExt for DBClient {
    async fn get_bookings_for_user(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
        sort: BookingSort,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Booking>, i64), sqlx::Error> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings");
        push_booking_filters(&mut count_query, user_id, status);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM bookings");
        push_booking_filters(&mut query, user_id, status);
        query.push(sort.order_by());
        query
            .push(" LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination::offset(page, limit));

        let bookings = query
            .build_query_as::<Booking>()
            .fetch_all(&self.pool)
            .await?;

        Ok((bookings, total))
    }

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_booking(
        &self,
        customer_id: Uuid,
        provider_id: Uuid,
        price: f64,
        booking: CreateBookingDto,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (service_id, customer_id, provider_id, date, time, duration,
                 price, location, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(booking.service)
        .bind(customer_id)
        .bind(provider_id)
        .bind(booking.date)
        .bind(booking.time)
        .bind(booking.duration)
        .bind(price)
        .bind(booking.location)
        .bind(booking.description)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_booking(
        &self,
        booking_id: Uuid,
        status: Option<BookingStatus>,
        notes: Option<String>,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = COALESCE($2, status),
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(status)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await
    }

    async fn cancel_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'cancelled', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_always_scopes_to_both_roles() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bookings");
        push_booking_filters(&mut qb, Uuid::new_v4(), None);
        let sql = qb.into_sql();
        assert!(sql.contains("customer_id ="));
        assert!(sql.contains("OR provider_id ="));
        assert!(!sql.contains("status"));
    }

    #[test]
    fn status_filter_is_appended_when_present() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bookings");
        push_booking_filters(&mut qb, Uuid::new_v4(), Some(BookingStatus::Pending));
        assert!(qb.into_sql().contains("AND status ="));
    }

    #[test]
    fn unknown_status_text_means_no_filter() {
        assert_eq!(parse_status_filter(Some("pending")), Some(BookingStatus::Pending));
        assert_eq!(parse_status_filter(Some("in-progress")), Some(BookingStatus::InProgress));
        assert_eq!(parse_status_filter(Some("all")), None);
        assert_eq!(parse_status_filter(Some("archived")), None);
        assert_eq!(parse_status_filter(None), None);
    }

    #[test]
    fn schedule_sort_uses_date_then_time() {
        assert_eq!(BookingSort::Schedule.order_by(), " ORDER BY date DESC, time DESC");
        assert_eq!(BookingSort::Newest.order_by(), " ORDER BY created_at DESC");
    }
}
