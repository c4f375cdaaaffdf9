// src/db/lead_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::lead::{Lead, NewLead},
};

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Salva a ligação Parceiro <-> negócio do Bitrix.
    pub async fn create_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (partner_user_id, bitrix_deal_id, client_name, client_phone, client_address, stage)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(lead.partner_user_id)
        .bind(lead.bitrix_deal_id)
        .bind(&lead.client_name)
        .bind(&lead.client_phone)
        .bind(lead.client_address.as_deref())
        .bind(&lead.stage)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn find_by_deal_id(&self, deal_id: i64) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE bitrix_deal_id = $1")
            .bind(deal_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    /// Estágio e pagamento mudam juntos, num único UPDATE.
    pub async fn update_stage(
        &self,
        deal_id: i64,
        stage: &str,
        payout: Decimal,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE leads
            SET stage = $1, payout = $2, updated_at = NOW()
            WHERE bitrix_deal_id = $3
            "#,
        )
        .bind(stage)
        .bind(payout)
        .bind(deal_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Página da lista "Мои клиенты", mais recentes primeiro
    pub async fn list_by_partner(
        &self,
        partner_user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE partner_user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(partner_user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn count_by_partner(&self, partner_user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE partner_user_id = $1")
            .bind(partner_user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
