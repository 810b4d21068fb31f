// src/db/postgres/customer_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use super::{map_db_error, offset_param, PgUnitOfWork};
use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::store::CustomerRepository,
    models::customer::{CreateCustomerPayload, Customer, CustomerFilter, CustomerPatch},
};

#[async_trait]
impl CustomerRepository for PgUnitOfWork {
    async fn insert_customer(&mut self, payload: &CreateCustomerPayload) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                restaurant_id, first_name, last_name, gender, dob, phone_number, email,
                address, city, state, zip_code, agree_promotional_emails, agree_data_sharing
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(payload.restaurant_id)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.gender)
        .bind(payload.dob)
        .bind(&payload.phone_number)
        .bind(&payload.email)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.zip_code)
        .bind(payload.agree_promotional_emails)
        .bind(payload.agree_data_sharing)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn find_customer(&mut self, id: Uuid) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn lock_customer(&mut self, id: Uuid) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn customer_contact_taken(
        &mut self,
        restaurant_id: Uuid,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM customers
                WHERE restaurant_id = $1
                  AND (($2::text IS NOT NULL AND email = $2)
                       OR ($3::text IS NOT NULL AND phone_number = $3))
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(restaurant_id)
        .bind(email)
        .bind(phone)
        .bind(exclude_id)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn update_customer(&mut self, id: Uuid, patch: &CustomerPatch) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                gender = COALESCE($4, gender),
                dob = COALESCE($5, dob),
                phone_number = COALESCE($6, phone_number),
                email = COALESCE($7, email),
                address = COALESCE($8, address),
                city = COALESCE($9, city),
                state = COALESCE($10, state),
                zip_code = COALESCE($11, zip_code),
                agree_promotional_emails = COALESCE($12, agree_promotional_emails),
                agree_data_sharing = COALESCE($13, agree_data_sharing),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.first_name.as_deref())
        .bind(patch.last_name.as_deref())
        .bind(patch.gender)
        .bind(patch.dob)
        .bind(patch.phone_number.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.address.as_deref())
        .bind(patch.city.as_deref())
        .bind(patch.state.as_deref())
        .bind(patch.zip_code.as_deref())
        .bind(patch.agree_promotional_emails)
        .bind(patch.agree_data_sharing)
        .fetch_optional(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn delete_customer(&mut self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(self.conn())
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_customers_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(self.conn())
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected())
    }

    async fn list_customers(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<(Vec<Customer>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM customers
            WHERE ($1::uuid IS NULL OR restaurant_id = $1)
              AND ($2::text IS NULL OR phone_number ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(filter.restaurant_id)
        .bind(filter.phone.as_deref())
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)?;

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE ($1::uuid IS NULL OR restaurant_id = $1)
              AND ($2::text IS NULL OR phone_number ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.restaurant_id)
        .bind(filter.phone.as_deref())
        .bind(i64::from(page.limit))
        .bind(offset_param(page.offset()))
        .fetch_all(self.conn())
        .await
        .map_err(map_db_error)?;

        Ok((customers, total))
    }
}
