// src/db/admin_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::admin::{Admin, AdminRole},
};

#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_role(&self, user_id: i64) -> Result<Option<AdminRole>, AppError> {
        let role = sqlx::query_scalar::<_, AdminRole>("SELECT role FROM admins WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn list_all(&self) -> Result<Vec<Admin>, AppError> {
        let admins = sqlx::query_as::<_, Admin>(
            "SELECT user_id, username, role FROM admins ORDER BY role DESC, user_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(admins)
    }

    pub async fn list_ids_by_role(&self, role: AdminRole) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT user_id FROM admins WHERE role = $1")
            .bind(role)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    // UPSERT: um papel por usuário
    pub async fn upsert(&self, admin: &Admin) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO admins (user_id, username, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET username = EXCLUDED.username, role = EXCLUDED.role
            "#,
        )
        .bind(admin.user_id)
        .bind(&admin.username)
        .bind(admin.role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retorna `true` se havia alguém para remover.
    pub async fn delete(&self, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM admins WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
