// src/services/verification_service.rs

use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::PartnerFunnelConfig,
    db::Store,
    models::{
        admin::{is_admin, AdminRole},
        chat::{OutgoingMessage, ReplyMarkup},
        partner::{NewPartner, Partner, PartnerRegistration, PartnerStatus},
    },
    services::{
        crm_gateway::{CrmGateway, DealFields, NewContact},
        keyboards,
        notifier::{deliver, deliver_all, Notifier},
        texts,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    PartnerCreated(Partner),
    AlreadyRegistered,
    // CRM falhou: nada foi gravado
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(self) -> PartnerStatus {
        match self {
            Decision::Approve => PartnerStatus::Verified,
            Decision::Reject => PartnerStatus::Rejected,
        }
    }
}

/// O que aconteceu com o negócio do parceiro no CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSync {
    Moved,
    Failed,
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Applied {
        deal_id: i64,
        status: PartnerStatus,
        stage_sync: StageSync,
    },
    Denied,
    NotFound,
    AlreadyProcessed(PartnerStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    NoOp,
    Applied { previous: PartnerStatus },
}

pub struct VerificationService {
    store: Arc<dyn Store>,
    crm: Arc<dyn CrmGateway>,
    notifier: Arc<dyn Notifier>,
    funnel: PartnerFunnelConfig,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn Store>,
        crm: Arc<dyn CrmGateway>,
        notifier: Arc<dyn Notifier>,
        funnel: PartnerFunnelConfig,
    ) -> Self {
        Self { store, crm, notifier, funnel }
    }

    // =========================================================================
    //  1. CADASTRO
    // =========================================================================

    /// Cria contato + negócio no funil de parceiros e só então grava o parceiro (pending).
    pub async fn register(&self, registration: PartnerRegistration) -> Result<RegistrationOutcome, AppError> {
        registration.validate()?;

        if self.store.find_partner(registration.user_id).await?.is_some() {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let contact = NewContact {
            name: registration.full_name.clone(),
            phone: registration.phone_number.clone(),
            address: None,
        };
        let contact_id = match self.crm.create_contact(&contact).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Cadastro de {} abortado, contato não criado: {}", registration.user_id, e);
                return Ok(RegistrationOutcome::Failed);
            }
        };

        let deal_id = match self.crm.create_deal(self.partner_deal_fields(&registration, contact_id)).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Cadastro de {} abortado, negócio não criado: {}", registration.user_id, e);
                return Ok(RegistrationOutcome::Failed);
            }
        };

        let partner = self
            .store
            .insert_partner(&NewPartner { registration, bitrix_deal_id: deal_id })
            .await
            .inspect_err(|e| tracing::error!("Negócio {} ficou sem parceiro local: {}", deal_id, e))?;

        tracing::info!("Parceiro {} cadastrado (negócio {}), aguardando verificação.", partner.user_id, deal_id);

        self.notify_juniors_about(&partner).await?;

        Ok(RegistrationOutcome::PartnerCreated(partner))
    }

    fn partner_deal_fields(&self, registration: &PartnerRegistration, contact_id: i64) -> DealFields {
        let mut fields = DealFields::new();
        fields.insert("TITLE".into(), json!(format!("Новый партнер (бот): {}", registration.full_name)));
        fields.insert("CATEGORY_ID".into(), json!(self.funnel.funnel_id));
        fields.insert("SOURCE_ID".into(), json!("PARTNER_BOT"));
        fields.insert("CONTACT_ID".into(), json!(contact_id));

        if let Some(stage) = &self.funnel.pending_stage_id {
            fields.insert("STAGE_ID".into(), json!(stage));
        }
        if let Some(field) = &self.funnel.role_field {
            fields.insert(field.clone(), json!(registration.role.label()));
        }
        if let Some(field) = &self.funnel.tg_id_field {
            fields.insert(field.clone(), json!(registration.user_id.to_string()));
        }
        if let (Some(field), Some(username)) = (&self.funnel.tg_username_field, &registration.username) {
            fields.insert(field.clone(), Value::String(format!("@{}", username)));
        }
        fields
    }

    async fn notify_juniors_about(&self, partner: &Partner) -> Result<(), AppError> {
        let juniors = self.store.list_admin_ids_by_role(AdminRole::Junior).await?;
        let message = OutgoingMessage::with_markup(
            texts::new_partner_request(
                &partner.full_name,
                &partner.phone_number,
                partner.role,
                partner.user_id,
                partner.username.as_deref(),
            ),
            keyboards::verification(partner.user_id),
        );

        let (sent, failed) = deliver_all(self.notifier.as_ref(), juniors, &message).await;
        tracing::info!("Pedido de {} enviado a {} admins ({} falhas).", partner.user_id, sent, failed);
        Ok(())
    }

    // =========================================================================
    //  2. DECISÃO DO ADMIN (botão ou /verify, /reject)
    // =========================================================================

    pub async fn decide(
        &self,
        admin_id: i64,
        actor: &str,
        partner_id: i64,
        decision: Decision,
    ) -> Result<DecisionOutcome, AppError> {
        if !is_admin(self.store.find_admin_role(admin_id).await?) {
            tracing::warn!("Usuário {} tentou decidir sobre o parceiro {} sem permissão.", admin_id, partner_id);
            return Ok(DecisionOutcome::Denied);
        }

        let Some(partner) = self.store.find_partner(partner_id).await? else {
            return Ok(DecisionOutcome::NotFound);
        };
        if partner.status != PartnerStatus::Pending {
            tracing::info!("Parceiro {} já processado ({}).", partner_id, partner.status);
            return Ok(DecisionOutcome::AlreadyProcessed(partner.status));
        }
        let Some(deal_id) = partner.bitrix_deal_id else {
            tracing::error!("Parceiro {} não tem negócio no Bitrix.", partner_id);
            return Ok(DecisionOutcome::NotFound);
        };

        let status = decision.status();
        self.store.set_partner_status(partner_id, status).await?;
        tracing::info!("Admin {} mudou o parceiro {} para {}.", admin_id, partner_id, status);

        // Melhor esforço: o status local já mudou e não volta atrás
        let stage_sync = match self.funnel.stage_for(status) {
            Some(stage) => {
                if self.crm.move_deal_stage(deal_id, stage).await {
                    StageSync::Moved
                } else {
                    StageSync::Failed
                }
            }
            None => StageSync::NotConfigured,
        };

        deliver(self.notifier.as_ref(), partner_id, &status_message(status)).await;

        let others: Vec<i64> = self
            .store
            .list_admin_ids_by_role(AdminRole::Junior)
            .await?
            .into_iter()
            .filter(|id| *id != admin_id)
            .collect();
        let closed = OutgoingMessage::text(texts::case_closed(&partner.full_name, status, actor));
        deliver_all(self.notifier.as_ref(), others, &closed).await;

        Ok(DecisionOutcome::Applied { deal_id, status, stage_sync })
    }

    // =========================================================================
    //  3. STATUS VINDO DO CRM
    // =========================================================================

    pub async fn reconcile(&self, partner_id: i64, external: PartnerStatus) -> Result<ReconcileOutcome, AppError> {
        let Some(partner) = self.store.find_partner(partner_id).await? else {
            tracing::warn!("Parceiro {} não encontrado, mas chegou status {} do CRM.", partner_id, external);
            return Ok(ReconcileOutcome::NoOp);
        };

        let previous = partner.status;
        if previous == external {
            tracing::info!("Parceiro {} já está em {}. Ignorando.", partner_id, external);
            return Ok(ReconcileOutcome::NoOp);
        }

        self.store.set_partner_status(partner_id, external).await?;
        tracing::info!("Status do parceiro {} mudou de {} para {} pelo CRM.", partner_id, previous, external);

        let message = match (previous, external) {
            (PartnerStatus::Verified, PartnerStatus::Rejected) => {
                OutgoingMessage::with_markup(texts::STATUS_REJECTED_REVOKED, ReplyMarkup::Remove)
            }
            (_, PartnerStatus::Pending) => {
                OutgoingMessage::with_markup(texts::STATUS_PENDING_REVOKED, ReplyMarkup::Remove)
            }
            (_, status) => status_message(status),
        };
        deliver(self.notifier.as_ref(), partner_id, &message).await;

        Ok(ReconcileOutcome::Applied { previous })
    }
}

/// Mensagem padrão para o parceiro ao chegar num status.
pub fn status_message(status: PartnerStatus) -> OutgoingMessage {
    match status {
        PartnerStatus::Verified => OutgoingMessage::with_markup(texts::VERIFIED, keyboards::verified_menu()),
        PartnerStatus::Rejected => OutgoingMessage::with_markup(texts::REJECTED, ReplyMarkup::Remove),
        PartnerStatus::Pending => OutgoingMessage::with_markup(texts::PENDING_VERIFICATION, ReplyMarkup::Remove),
    }
}
