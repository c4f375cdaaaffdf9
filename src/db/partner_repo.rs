// src/db/partner_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::partner::{NewPartner, Partner, PartnerStatus},
};

// O repositório de parceiros, responsável por todas as interações com a tabela 'partners'
#[derive(Clone)]
pub struct PartnerRepository {
    pool: PgPool,
}

impl PartnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um parceiro pelo ID do Telegram
    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Partner>, AppError> {
        let partner = sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(partner)
    }

    // Cria o parceiro já com o deal_id do Bitrix, sempre em 'pending'
    pub async fn create_partner(&self, partner: &NewPartner) -> Result<Partner, AppError> {
        let reg = &partner.registration;

        sqlx::query_as::<_, Partner>(
            r#"
            INSERT INTO partners (user_id, username, full_name, phone_number, role, status, bitrix_deal_id)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6)
            RETURNING *
            "#,
        )
        .bind(reg.user_id)
        .bind(reg.username.as_deref())
        .bind(&reg.full_name)
        .bind(&reg.phone_number)
        .bind(reg.role)
        .bind(partner.bitrix_deal_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(reg.user_id.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn set_status(&self, user_id: i64, status: PartnerStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE partners SET status = $1, updated_at = NOW() WHERE user_id = $2")
            .bind(status)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_ids_by_status(&self, status: PartnerStatus) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM partners WHERE status = $1 ORDER BY created_at",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
