// src/models/partner.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE partner_status do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "partner_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PartnerStatus {
    Pending,
    Verified,
    Rejected,
}

impl PartnerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PartnerStatus::Pending => "pending",
            PartnerStatus::Verified => "verified",
            PartnerStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PartnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartnerStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PartnerStatus::Pending),
            "verified" => Ok(PartnerStatus::Verified),
            "rejected" => Ok(PartnerStatus::Rejected),
            _ => Err(()),
        }
    }
}

// Mapeia o CREATE TYPE partner_role ("Кем вы являетесь?")
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "partner_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PartnerRole {
    Realtor,
    Designer,
    IntakeSpecialist,
    Other,
}

impl PartnerRole {
    pub const ALL: [PartnerRole; 4] = [
        PartnerRole::Realtor,
        PartnerRole::Designer,
        PartnerRole::IntakeSpecialist,
        PartnerRole::Other,
    ];

    /// Texto mostrado no botão e gravado no campo do CRM.
    pub fn label(self) -> &'static str {
        match self {
            PartnerRole::Realtor => "Риэлтор",
            PartnerRole::Designer => "Дизайнер",
            PartnerRole::IntakeSpecialist => "Приёмщик",
            PartnerRole::Other => "Другое",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            PartnerRole::Realtor => "realtor",
            PartnerRole::Designer => "designer",
            PartnerRole::IntakeSpecialist => "intake_specialist",
            PartnerRole::Other => "other",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.slug() == slug)
    }
}

// --- PARCEIRO (linha da tabela partners) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub phone_number: String,
    pub role: PartnerRole,
    pub status: PartnerStatus,
    pub bitrix_deal_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados coletados no fluxo de cadastro, antes de existir negócio no CRM.
#[derive(Debug, Clone, Validate)]
pub struct PartnerRegistration {
    pub user_id: i64,
    pub username: Option<String>,

    #[validate(length(min = 2, max = 255, message = "invalid_full_name"))]
    pub full_name: String,

    #[validate(length(min = 1, max = 64, message = "invalid_phone"))]
    pub phone_number: String,

    pub role: PartnerRole,
}

/// O que é gravado no banco: só existe depois que o CRM devolveu o deal_id.
#[derive(Debug, Clone)]
pub struct NewPartner {
    pub registration: PartnerRegistration,
    pub bitrix_deal_id: i64,
}
