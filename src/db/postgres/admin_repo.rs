// src/db/postgres/admin_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use super::{map_db_error, PgUnitOfWork};
use crate::{
    common::error::AppError,
    db::store::AdminRepository,
    models::auth::{NewProductAdmin, NewRestaurantAdmin, ProductAdmin, RestaurantAdmin},
};

#[async_trait]
impl AdminRepository for PgUnitOfWork {
    async fn insert_product_admin(&mut self, new: &NewProductAdmin) -> Result<ProductAdmin, AppError> {
        sqlx::query_as::<_, ProductAdmin>(
            "INSERT INTO product_admins (username, email, password_hash, phone) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.phone)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn find_product_admin_by_email(&mut self, email: &str) -> Result<Option<ProductAdmin>, AppError> {
        sqlx::query_as::<_, ProductAdmin>("SELECT * FROM product_admins WHERE email = $1")
            .bind(email)
            .fetch_optional(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn insert_restaurant_admin(&mut self, new: &NewRestaurantAdmin) -> Result<RestaurantAdmin, AppError> {
        sqlx::query_as::<_, RestaurantAdmin>(
            r#"
            INSERT INTO restaurant_admins (restaurant_id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.restaurant_id)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn find_restaurant_admin_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<RestaurantAdmin>, AppError> {
        sqlx::query_as::<_, RestaurantAdmin>("SELECT * FROM restaurant_admins WHERE email = $1")
            .bind(email)
            .fetch_optional(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn delete_restaurant_admins_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM restaurant_admins WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(self.conn())
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected())
    }
}
