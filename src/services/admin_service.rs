// src/services/admin_service.rs

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::Store,
    models::{
        admin::{Admin, AdminRole},
        chat::OutgoingMessage,
        partner::PartnerStatus,
        settings::{percent_in_range, percent_or_zero, TextSetting, PAYOUT_PERCENT_KEY},
    },
    services::{
        notifier::{deliver_all, Notifier},
        texts,
    },
};

const SUPER_ADMIN_NAME: &str = "SUPER_ADMIN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
    SuperAdminProtected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct AdminService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    super_admin_id: i64,
}

impl AdminService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, super_admin_id: i64) -> Self {
        Self { store, notifier, super_admin_id }
    }

    pub async fn role_of(&self, user_id: i64) -> Result<Option<AdminRole>, AppError> {
        self.store.find_admin_role(user_id).await
    }

    /// Chamado na inicialização: o dono do bot é sempre senior.
    pub async fn seed_super_admin(&self) -> Result<(), AppError> {
        self.store
            .upsert_admin(&Admin {
                user_id: self.super_admin_id,
                username: SUPER_ADMIN_NAME.to_string(),
                role: AdminRole::Senior,
            })
            .await?;
        tracing::info!("Super admin {} garantido como senior.", self.super_admin_id);
        Ok(())
    }

    // --- Gestão de admins ---

    pub async fn add_admin(&self, user_id: i64, role: AdminRole, username: Option<String>) -> Result<Admin, AppError> {
        let admin = Admin {
            user_id,
            username: username.unwrap_or_else(|| format!("Admin_{}", user_id)),
            role,
        };
        self.store.upsert_admin(&admin).await?;
        tracing::info!("Admin {} gravado com papel {}.", user_id, role.as_str());
        Ok(admin)
    }

    pub async fn remove_admin(&self, user_id: i64) -> Result<RemoveOutcome, AppError> {
        if user_id == self.super_admin_id {
            return Ok(RemoveOutcome::SuperAdminProtected);
        }
        if self.store.delete_admin(user_id).await? {
            tracing::info!("Admin {} removido.", user_id);
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::NotFound)
        }
    }

    pub async fn list_admins(&self) -> Result<Vec<Admin>, AppError> {
        self.store.list_admins().await
    }

    // --- Configurações ---

    /// Texto configurado ou, na falta dele, o padrão embutido.
    pub async fn text(&self, setting: TextSetting) -> Result<String, AppError> {
        let stored = self.store.get_setting(setting.key()).await?;
        Ok(stored.unwrap_or_else(|| {
            match setting {
                TextSetting::Welcome => texts::WELCOME,
                TextSetting::ProgramInfo => texts::PROGRAM_INFO,
            }
            .to_string()
        }))
    }

    pub async fn set_text(&self, setting: TextSetting, value: &str) -> Result<(), AppError> {
        self.store.set_setting(setting.key(), value).await
    }

    pub async fn payout_percent(&self) -> Result<Decimal, AppError> {
        let raw = self.store.get_setting(PAYOUT_PERCENT_KEY).await?;
        Ok(percent_or_zero(raw.as_deref()))
    }

    pub async fn set_payout_percent(&self, percent: Decimal) -> Result<(), AppError> {
        if !percent_in_range(percent) {
            return Err(AppError::InvalidPercent(percent.to_string()));
        }
        self.store
            .set_setting(PAYOUT_PERCENT_KEY, &percent.normalize().to_string())
            .await?;
        tracing::info!("Percentual de pagamento alterado para {}%.", percent);
        Ok(())
    }

    // --- Broadcast ---

    /// Envia para todos os parceiros verificados; falhas individuais só contam.
    pub async fn broadcast(&self, text: &str) -> Result<BroadcastReport, AppError> {
        let recipients = self.store.list_partner_ids_by_status(PartnerStatus::Verified).await?;
        let message = OutgoingMessage::text(text);

        let (sent, failed) = deliver_all(self.notifier.as_ref(), recipients, &message).await;
        tracing::info!("Broadcast concluído: {} enviados, {} falhas.", sent, failed);

        Ok(BroadcastReport { sent, failed })
    }
}
