// src/models/webhook.rs

use serde::Deserialize;
use thiserror::Error;

use crate::{config::PartnerFunnelConfig, models::partner::PartnerStatus};

// Parâmetros que o robô do Bitrix manda na URL.
// Tudo opcional e em texto: o robô não garante formato nenhum.
#[derive(Debug, Default, Deserialize)]
pub struct BitrixWebhookQuery {
    pub secret: Option<String>,
    pub event_type: Option<String>,
    pub deal_id: Option<String>,
    pub status: Option<String>,
    pub stage_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmEvent {
    PartnerVerification {
        user_id: i64,
        deal_id: Option<i64>,
        status: PartnerStatus,
    },
    ClientDealUpdate {
        deal_id: i64,
        stage_id: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookRejection {
    #[error("event_type desconhecido: {0:?}")]
    UnknownEventType(Option<String>),

    #[error("user_id ausente ou inválido")]
    MissingUserId,

    #[error("deal_id ausente ou inválido")]
    MissingDealId,

    #[error("status não reconhecido: {0:?}")]
    UnknownStatus(Option<String>),

    #[error("stage_id ausente")]
    MissingStage,
}

impl BitrixWebhookQuery {
    pub fn secret_matches(&self, expected: &str) -> bool {
        self.secret.as_deref() == Some(expected)
    }

    /// Traduz a query para um evento interno.
    ///
    /// O campo `status` do evento de parceiro pode chegar como token
    /// (`pending|verified|rejected`) ou como ID de estágio do funil de parceiros;
    /// os dois são convertidos para `PartnerStatus` aqui, na borda.
    pub fn into_event(self, funnel: &PartnerFunnelConfig) -> Result<CrmEvent, WebhookRejection> {
        let deal_id = parse_id(self.deal_id.as_deref());

        match self.event_type.as_deref() {
            Some("partner_verification") => {
                let user_id = parse_id(self.user_id.as_deref()).ok_or(WebhookRejection::MissingUserId)?;
                let raw = self.status.or(self.stage_id);
                let status = raw
                    .as_deref()
                    .and_then(|value| {
                        value
                            .parse::<PartnerStatus>()
                            .ok()
                            .or_else(|| funnel.status_for_stage(value))
                    })
                    .ok_or_else(|| WebhookRejection::UnknownStatus(raw.clone()))?;

                Ok(CrmEvent::PartnerVerification { user_id, deal_id, status })
            }
            Some("client_deal_update") => {
                let deal_id = deal_id.ok_or(WebhookRejection::MissingDealId)?;
                // Robôs antigos mandam o estágio no campo `status`
                let stage_id = self
                    .stage_id
                    .or(self.status)
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(WebhookRejection::MissingStage)?;

                Ok(CrmEvent::ClientDealUpdate { deal_id, stage_id })
            }
            other => Err(WebhookRejection::UnknownEventType(other.map(str::to_string))),
        }
    }
}

fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|id| *id > 0)
}
