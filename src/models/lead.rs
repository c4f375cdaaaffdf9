// src/models/lead.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

// Cliente enviado por um parceiro; cada um amarrado a exatamente um negócio no Bitrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i64,
    pub partner_user_id: i64,
    pub bitrix_deal_id: i64,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: Option<String>,

    // Rótulo do estágio atual, vindo do CRM (texto livre)
    pub stage: String,

    // Vale só para o estágio atual: sobrescrito a cada callback, nunca acumulado
    pub payout: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLead {
    pub partner_user_id: i64,
    pub bitrix_deal_id: i64,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: Option<String>,
    pub stage: String,
}
