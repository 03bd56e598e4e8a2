use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{Customer, Service, Staff};

/// Lookups for the reference entities bookings hang off of.
pub struct CatalogRepository;

impl CatalogRepository {
    pub async fn staff_by_id(pool: &PgPool, staff_id: Uuid) -> Result<Staff, DatabaseError> {
        sqlx::query_as::<_, Staff>(
            "SELECT id, display_name, active, created_at FROM staff WHERE id = $1",
        )
        .bind(staff_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn service_by_id(pool: &PgPool, service_id: Uuid) -> Result<Service, DatabaseError> {
        sqlx::query_as::<_, Service>(
            r#"SELECT id, name, duration_minutes, price_cents, category, active
               FROM services
               WHERE id = $1"#,
        )
        .bind(service_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn customer_by_id(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<Customer, DatabaseError> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, display_name, phone, email, created_at FROM customers WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)
    }
}
