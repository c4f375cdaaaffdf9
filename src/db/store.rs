// src/db/store.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AdminRepository, LeadRepository, PartnerRepository, SettingsRepository},
    models::{
        admin::{Admin, AdminRole},
        lead::{Lead, NewLead},
        partner::{NewPartner, Partner, PartnerStatus},
    },
};

/// Armazenamento durável consumido pelos serviços.
///
/// Cada chamada é atômica sozinha; fluxos de vários passos (ler status,
/// decidir, gravar) não são envolvidos em transação.
#[async_trait]
pub trait Store: Send + Sync {
    // --- Parceiros ---
    async fn find_partner(&self, user_id: i64) -> Result<Option<Partner>, AppError>;
    async fn insert_partner(&self, partner: &NewPartner) -> Result<Partner, AppError>;
    async fn set_partner_status(&self, user_id: i64, status: PartnerStatus) -> Result<(), AppError>;
    async fn list_partner_ids_by_status(&self, status: PartnerStatus) -> Result<Vec<i64>, AppError>;

    // --- Leads ---
    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError>;
    async fn find_lead_by_deal_id(&self, deal_id: i64) -> Result<Option<Lead>, AppError>;
    async fn update_lead_stage(&self, deal_id: i64, stage: &str, payout: Decimal) -> Result<(), AppError>;
    async fn list_leads_by_partner(&self, partner_user_id: i64, limit: i64, offset: i64) -> Result<Vec<Lead>, AppError>;
    async fn count_leads_by_partner(&self, partner_user_id: i64) -> Result<i64, AppError>;

    // --- Admins ---
    async fn find_admin_role(&self, user_id: i64) -> Result<Option<AdminRole>, AppError>;
    async fn list_admins(&self) -> Result<Vec<Admin>, AppError>;
    async fn list_admin_ids_by_role(&self, role: AdminRole) -> Result<Vec<i64>, AppError>;
    async fn upsert_admin(&self, admin: &Admin) -> Result<(), AppError>;
    async fn delete_admin(&self, user_id: i64) -> Result<bool, AppError>;

    // --- Configurações (chave -> texto) ---
    async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError>;
}

// Implementação Postgres: só delega para os repositórios de cada tabela
#[derive(Clone)]
pub struct PgStore {
    partners: PartnerRepository,
    leads: LeadRepository,
    admins: AdminRepository,
    settings: SettingsRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            partners: PartnerRepository::new(pool.clone()),
            leads: LeadRepository::new(pool.clone()),
            admins: AdminRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_partner(&self, user_id: i64) -> Result<Option<Partner>, AppError> {
        self.partners.find_by_user_id(user_id).await
    }

    async fn insert_partner(&self, partner: &NewPartner) -> Result<Partner, AppError> {
        self.partners.create_partner(partner).await
    }

    async fn set_partner_status(&self, user_id: i64, status: PartnerStatus) -> Result<(), AppError> {
        self.partners.set_status(user_id, status).await
    }

    async fn list_partner_ids_by_status(&self, status: PartnerStatus) -> Result<Vec<i64>, AppError> {
        self.partners.list_ids_by_status(status).await
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        self.leads.create_lead(lead).await
    }

    async fn find_lead_by_deal_id(&self, deal_id: i64) -> Result<Option<Lead>, AppError> {
        self.leads.find_by_deal_id(deal_id).await
    }

    async fn update_lead_stage(&self, deal_id: i64, stage: &str, payout: Decimal) -> Result<(), AppError> {
        self.leads.update_stage(deal_id, stage, payout).await
    }

    async fn list_leads_by_partner(&self, partner_user_id: i64, limit: i64, offset: i64) -> Result<Vec<Lead>, AppError> {
        self.leads.list_by_partner(partner_user_id, limit, offset).await
    }

    async fn count_leads_by_partner(&self, partner_user_id: i64) -> Result<i64, AppError> {
        self.leads.count_by_partner(partner_user_id).await
    }

    async fn find_admin_role(&self, user_id: i64) -> Result<Option<AdminRole>, AppError> {
        self.admins.find_role(user_id).await
    }

    async fn list_admins(&self) -> Result<Vec<Admin>, AppError> {
        self.admins.list_all().await
    }

    async fn list_admin_ids_by_role(&self, role: AdminRole) -> Result<Vec<i64>, AppError> {
        self.admins.list_ids_by_role(role).await
    }

    async fn upsert_admin(&self, admin: &Admin) -> Result<(), AppError> {
        self.admins.upsert(admin).await
    }

    async fn delete_admin(&self, user_id: i64) -> Result<bool, AppError> {
        self.admins.delete(user_id).await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        self.settings.get(key).await
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.settings.set(key, value).await
    }
}
