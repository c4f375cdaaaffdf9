// src/db/memory_store.rs

// Store em memória para os testes dos serviços.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::Store,
    models::{
        admin::{Admin, AdminRole},
        lead::{Lead, NewLead},
        partner::{NewPartner, Partner, PartnerStatus},
    },
};

#[derive(Default)]
struct Tables {
    partners: BTreeMap<i64, Partner>,
    leads: Vec<Lead>,
    admins: BTreeMap<i64, Admin>,
    settings: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    // Simula o banco caindo na gravação de estágio
    broken_lead_writes: bool,
}

impl MemoryStore {
    pub fn with_broken_lead_writes() -> Self {
        Self { broken_lead_writes: true, ..Self::default() }
    }

    pub async fn lead_count(&self) -> usize {
        self.tables.lock().await.leads.len()
    }

    pub async fn partner_count(&self) -> usize {
        self.tables.lock().await.partners.len()
    }

    /// Insere um parceiro direto, já com o status desejado.
    pub async fn seed_partner(&self, user_id: i64, full_name: &str, status: PartnerStatus, deal_id: Option<i64>) {
        let now = Utc::now();
        self.tables.lock().await.partners.insert(
            user_id,
            Partner {
                user_id,
                username: None,
                full_name: full_name.to_string(),
                phone_number: "+79990000000".to_string(),
                role: crate::models::partner::PartnerRole::Designer,
                status,
                bitrix_deal_id: deal_id,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub async fn seed_admin(&self, user_id: i64, role: AdminRole) {
        self.tables.lock().await.admins.insert(
            user_id,
            Admin { user_id, username: format!("Admin_{}", user_id), role },
        );
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_partner(&self, user_id: i64) -> Result<Option<Partner>, AppError> {
        Ok(self.tables.lock().await.partners.get(&user_id).cloned())
    }

    async fn insert_partner(&self, partner: &NewPartner) -> Result<Partner, AppError> {
        let mut tables = self.tables.lock().await;
        let reg = &partner.registration;
        if tables.partners.contains_key(&reg.user_id) {
            return Err(AppError::UniqueConstraintViolation(reg.user_id.to_string()));
        }
        let now = Utc::now();
        let row = Partner {
            user_id: reg.user_id,
            username: reg.username.clone(),
            full_name: reg.full_name.clone(),
            phone_number: reg.phone_number.clone(),
            role: reg.role,
            status: PartnerStatus::Pending,
            bitrix_deal_id: Some(partner.bitrix_deal_id),
            created_at: now,
            updated_at: now,
        };
        tables.partners.insert(reg.user_id, row.clone());
        Ok(row)
    }

    async fn set_partner_status(&self, user_id: i64, status: PartnerStatus) -> Result<(), AppError> {
        if let Some(p) = self.tables.lock().await.partners.get_mut(&user_id) {
            p.status = status;
            p.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_partner_ids_by_status(&self, status: PartnerStatus) -> Result<Vec<i64>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .partners
            .values()
            .filter(|p| p.status == status)
            .map(|p| p.user_id)
            .collect())
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let row = Lead {
            id: tables.leads.len() as i64 + 1,
            partner_user_id: lead.partner_user_id,
            bitrix_deal_id: lead.bitrix_deal_id,
            client_name: lead.client_name.clone(),
            client_phone: lead.client_phone.clone(),
            client_address: lead.client_address.clone(),
            stage: lead.stage.clone(),
            payout: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        tables.leads.push(row.clone());
        Ok(row)
    }

    async fn find_lead_by_deal_id(&self, deal_id: i64) -> Result<Option<Lead>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .leads
            .iter()
            .find(|l| l.bitrix_deal_id == deal_id)
            .cloned())
    }

    async fn update_lead_stage(&self, deal_id: i64, stage: &str, payout: Decimal) -> Result<(), AppError> {
        if self.broken_lead_writes {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        let mut tables = self.tables.lock().await;
        if let Some(lead) = tables.leads.iter_mut().find(|l| l.bitrix_deal_id == deal_id) {
            lead.stage = stage.to_string();
            lead.payout = payout;
            lead.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_leads_by_partner(&self, partner_user_id: i64, limit: i64, offset: i64) -> Result<Vec<Lead>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .leads
            .iter()
            .rev()
            .filter(|l| l.partner_user_id == partner_user_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_leads_by_partner(&self, partner_user_id: i64) -> Result<i64, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .leads
            .iter()
            .filter(|l| l.partner_user_id == partner_user_id)
            .count() as i64)
    }

    async fn find_admin_role(&self, user_id: i64) -> Result<Option<AdminRole>, AppError> {
        Ok(self.tables.lock().await.admins.get(&user_id).map(|a| a.role))
    }

    async fn list_admins(&self) -> Result<Vec<Admin>, AppError> {
        Ok(self.tables.lock().await.admins.values().cloned().collect())
    }

    async fn list_admin_ids_by_role(&self, role: AdminRole) -> Result<Vec<i64>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .admins
            .values()
            .filter(|a| a.role == role)
            .map(|a| a.user_id)
            .collect())
    }

    async fn upsert_admin(&self, admin: &Admin) -> Result<(), AppError> {
        self.tables.lock().await.admins.insert(admin.user_id, admin.clone());
        Ok(())
    }

    async fn delete_admin(&self, user_id: i64) -> Result<bool, AppError> {
        Ok(self.tables.lock().await.admins.remove(&user_id).is_some())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.tables.lock().await.settings.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.tables.lock().await.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
