// src/services/crm_gateway.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::settings::parse_decimal;

/// Campos de um negócio, no formato do Bitrix (`TITLE`, `STAGE_ID`, `UF_CRM_...`).
pub type DealFields = Map<String, Value>;

// Para quem chama, qualquer falha é "a operação não aconteceu".
// As variantes existem só para o log.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("falha de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status HTTP {status} em {method}")]
    Status { method: String, status: u16 },

    #[error("resposta de {method} sem 'result'")]
    MissingResult { method: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
}

#[async_trait]
pub trait CrmGateway: Send + Sync {
    async fn create_contact(&self, contact: &NewContact) -> Result<i64, CrmError>;

    async fn create_deal(&self, fields: DealFields) -> Result<i64, CrmError>;

    /// Melhor esforço: `false` em qualquer falha, que já sai logada.
    async fn move_deal_stage(&self, deal_id: i64, stage_id: &str) -> bool;

    async fn get_deal(&self, deal_id: i64) -> Result<DealFields, CrmError>;

    async fn find_contact_by_phone(&self, phone: &str) -> Result<Option<i64>, CrmError>;
}

/// Valor do campo `OPPORTUNITY`; ausente ou ilegível vira 0.
pub fn opportunity(deal: &DealFields) -> Decimal {
    match deal.get("OPPORTUNITY") {
        Some(Value::String(raw)) => parse_decimal(raw).unwrap_or(Decimal::ZERO),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// IDs chegam como número ou como texto, dependendo do método.
pub fn parse_crm_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}
