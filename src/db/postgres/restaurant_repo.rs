// src/db/postgres/restaurant_repo.rs

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::{map_db_error, offset_param, PgUnitOfWork};
use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::store::RestaurantRepository,
    models::restaurant::{NewRestaurant, Restaurant, RestaurantFilter, RestaurantPatch, RestaurantStatus},
};

// Filtros opcionais: parâmetro nulo desliga a condição
const LIST_FILTER: &str = r#"
    WHERE ($1::timestamptz IS NULL OR created_at >= $1)
      AND ($2::timestamptz IS NULL OR created_at <= $2)
      AND (NOT $3 OR status = 'ACCEPTED')
      AND ($4::text IS NULL OR restaurant_name ILIKE '%' || $4 || '%')
"#;

#[async_trait]
impl RestaurantRepository for PgUnitOfWork {
    async fn insert_restaurant(&mut self, new: &NewRestaurant) -> Result<Restaurant, AppError> {
        sqlx::query_as::<_, Restaurant>(
            r#"
            INSERT INTO restaurants (
                restaurant_name, address, llc, phone_number, email, owner_name,
                primary_contact, status, agreement_accepted, created_by, password_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&new.restaurant_name)
        .bind(&new.address)
        .bind(&new.llc)
        .bind(&new.phone_number)
        .bind(&new.email)
        .bind(&new.owner_name)
        .bind(Json(&new.primary_contact))
        .bind(new.status)
        .bind(new.agreement_accepted)
        .bind(new.created_by)
        .bind(&new.password_hash)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn find_restaurant(&mut self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn lock_restaurant(&mut self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn find_restaurant_by_email(&mut self, email: &str) -> Result<Option<Restaurant>, AppError> {
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE email = $1")
            .bind(email)
            .fetch_optional(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn restaurant_contact_taken(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM restaurants
                WHERE (($1::text IS NOT NULL AND email = $1)
                       OR ($2::text IS NOT NULL AND phone_number = $2))
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(email)
        .bind(phone)
        .bind(exclude_id)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn list_restaurants(
        &mut self,
        filter: &RestaurantFilter,
        page: PageRequest,
    ) -> Result<(Vec<Restaurant>, i64), AppError> {
        let count_sql = format!("SELECT COUNT(*) FROM restaurants {}", LIST_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.created_from)
            .bind(filter.created_to)
            .bind(filter.accepted_only)
            .bind(filter.name.as_deref())
            .fetch_one(self.conn())
            .await
            .map_err(map_db_error)?;

        let page_sql = format!(
            "SELECT * FROM restaurants {} ORDER BY created_at DESC, id DESC LIMIT $5 OFFSET $6",
            LIST_FILTER
        );
        let restaurants = sqlx::query_as::<_, Restaurant>(&page_sql)
            .bind(filter.created_from)
            .bind(filter.created_to)
            .bind(filter.accepted_only)
            .bind(filter.name.as_deref())
            .bind(i64::from(page.limit))
            .bind(offset_param(page.offset()))
            .fetch_all(self.conn())
            .await
            .map_err(map_db_error)?;

        Ok((restaurants, total))
    }

    async fn update_restaurant(
        &mut self,
        id: Uuid,
        patch: &RestaurantPatch,
    ) -> Result<Option<Restaurant>, AppError> {
        sqlx::query_as::<_, Restaurant>(
            r#"
            UPDATE restaurants SET
                restaurant_name = COALESCE($2, restaurant_name),
                address = COALESCE($3, address),
                llc = COALESCE($4, llc),
                phone_number = COALESCE($5, phone_number),
                email = COALESCE($6, email),
                owner_name = COALESCE($7, owner_name),
                primary_contact = COALESCE($8, primary_contact),
                password_hash = COALESCE($9, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.restaurant_name.as_deref())
        .bind(patch.address.as_deref())
        .bind(patch.llc.as_deref())
        .bind(patch.phone_number.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.owner_name.as_deref())
        .bind(patch.primary_contact.as_ref().map(Json))
        .bind(patch.password_hash.as_deref())
        .fetch_optional(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn set_restaurant_status(
        &mut self,
        id: Uuid,
        status: RestaurantStatus,
    ) -> Result<Option<Restaurant>, AppError> {
        sqlx::query_as::<_, Restaurant>(
            "UPDATE restaurants SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn delete_restaurant(&mut self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(self.conn())
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}
