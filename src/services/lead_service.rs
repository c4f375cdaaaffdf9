// src/services/lead_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

use crate::{
    common::{error::AppError, phone::normalize_phone, stages::StageKind},
    config::ClientFunnelConfig,
    db::Store,
    models::{
        chat::{OutgoingMessage, ReplyMarkup},
        lead::{Lead, NewLead},
        partner::{Partner, PartnerStatus},
        session::{LeadDraft, Session, SubmissionStep},
        settings::{percent_or_zero, PAYOUT_PERCENT_KEY},
    },
    services::{
        crm_gateway::{opportunity, CrmGateway, DealFields, NewContact},
        keyboards,
        notifier::{deliver, Notifier},
        sessions::SessionTable,
        texts,
    },
};

pub const CLIENTS_PER_PAGE: i64 = 5;

const NEW_LEAD_STAGE: &str = "Новая заявка";

/// O que responder ao parceiro depois de cada passo do envio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionReply {
    NotVerified,
    AskName,
    AskPhone,
    InvalidPhone,
    AskAddress,
    AskArea,
    AskComment,
    Confirm(LeadDraft),
    Duplicate { client_name: String },
    Submitted(Lead),
    CrmFailure,
    NothingToConfirm,
}

impl SubmissionReply {
    pub fn into_message(self) -> OutgoingMessage {
        match self {
            SubmissionReply::NotVerified => OutgoingMessage::text(texts::ONLY_VERIFIED),
            SubmissionReply::AskName => OutgoingMessage::with_markup(texts::ASK_CLIENT_NAME, keyboards::cancel()),
            SubmissionReply::AskPhone => OutgoingMessage::with_markup(texts::ASK_CLIENT_PHONE, keyboards::cancel()),
            SubmissionReply::InvalidPhone => {
                OutgoingMessage::with_markup(texts::INVALID_CLIENT_PHONE, keyboards::cancel())
            }
            SubmissionReply::AskAddress => {
                OutgoingMessage::with_markup(texts::ASK_CLIENT_ADDRESS, keyboards::cancel())
            }
            SubmissionReply::AskArea => OutgoingMessage::with_markup(texts::ASK_CLIENT_AREA, keyboards::skip_or_cancel()),
            SubmissionReply::AskComment => {
                OutgoingMessage::with_markup(texts::ASK_CLIENT_COMMENT, keyboards::skip_or_cancel())
            }
            SubmissionReply::Confirm(draft) => {
                OutgoingMessage::with_markup(texts::confirmation(&draft), keyboards::confirmation())
            }
            SubmissionReply::Duplicate { client_name } => {
                OutgoingMessage::with_markup(texts::duplicate_client(&client_name), keyboards::verified_menu())
            }
            SubmissionReply::Submitted(lead) => {
                OutgoingMessage::with_markup(texts::client_submitted(&lead.client_name), keyboards::verified_menu())
            }
            SubmissionReply::CrmFailure => {
                OutgoingMessage::with_markup(texts::GENERIC_ERROR, keyboards::verified_menu())
            }
            SubmissionReply::NothingToConfirm => OutgoingMessage::text(texts::NOTHING_TO_CONFIRM),
        }
    }
}

/// Entrada de um passo: texto digitado ou o botão "Пропустить".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput<'a> {
    Text(&'a str),
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageUpdateOutcome {
    UnknownDeal,
    Updated {
        lead_id: i64,
        stage: String,
        payout: Decimal,
        notified: bool,
    },
}

// Limite da coluna leads.payout (NUMERIC(20, 2))
const PAYOUT_DIGITS_LIMIT: i64 = 1_000_000_000_000_000_000;

/// Pagamento do estágio atual. Estágio de perda zera sempre.
///
/// Estouro da conta ou valor que não cabe na coluna vira 0, com aviso no log.
pub fn compute_payout(opportunity: Decimal, percent: Decimal, kind: StageKind) -> Decimal {
    if kind == StageKind::Lose {
        return Decimal::ZERO;
    }
    let payout = opportunity
        .checked_mul(percent)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .map(|value| value.round_dp(2));

    match payout {
        Some(value) if value.abs() < Decimal::from(PAYOUT_DIGITS_LIMIT) => value,
        _ => {
            tracing::warn!("Pagamento fora da faixa para valor {} a {}%. Gravando 0.", opportunity, percent);
            Decimal::ZERO
        }
    }
}

pub struct LeadService {
    store: Arc<dyn Store>,
    crm: Arc<dyn CrmGateway>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<SessionTable>,
    funnel: ClientFunnelConfig,
}

impl LeadService {
    pub fn new(
        store: Arc<dyn Store>,
        crm: Arc<dyn CrmGateway>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<SessionTable>,
        funnel: ClientFunnelConfig,
    ) -> Self {
        Self { store, crm, notifier, sessions, funnel }
    }

    async fn verified_partner(&self, partner_id: i64) -> Result<Option<Partner>, AppError> {
        Ok(self
            .store
            .find_partner(partner_id)
            .await?
            .filter(|p| p.status == PartnerStatus::Verified))
    }

    // =========================================================================
    //  1. FLUXO DE ENVIO
    // =========================================================================

    pub async fn begin(&self, partner_id: i64) -> Result<SubmissionReply, AppError> {
        if self.verified_partner(partner_id).await?.is_none() {
            return Ok(SubmissionReply::NotVerified);
        }
        self.sessions.set(partner_id, Session::Submission(SubmissionStep::AwaitingName)).await;
        Ok(SubmissionReply::AskName)
    }

    /// "Заполнить заново": descarta tudo e volta ao primeiro passo.
    pub async fn retry(&self, partner_id: i64) -> Result<SubmissionReply, AppError> {
        self.begin(partner_id).await
    }

    pub async fn advance(
        &self,
        partner_id: i64,
        step: SubmissionStep,
        input: StepInput<'_>,
    ) -> Result<SubmissionReply, AppError> {
        let text = match input {
            StepInput::Text(raw) => Some(raw.trim()).filter(|t| !t.is_empty()),
            StepInput::Skip => None,
        };

        let (next, reply) = match (step, text) {
            (SubmissionStep::AwaitingName, Some(name)) => (
                SubmissionStep::AwaitingPhone { name: name.to_string() },
                SubmissionReply::AskPhone,
            ),
            (SubmissionStep::AwaitingName, None) => return Ok(SubmissionReply::AskName),

            (SubmissionStep::AwaitingPhone { name }, raw) => {
                let Some(phone) = raw.and_then(normalize_phone) else {
                    return Ok(SubmissionReply::InvalidPhone);
                };
                return self.check_duplicate(partner_id, name, phone).await;
            }

            (SubmissionStep::AwaitingAddress { name, phone }, Some(address)) => (
                SubmissionStep::AwaitingArea { name, phone, address: address.to_string() },
                SubmissionReply::AskArea,
            ),
            (SubmissionStep::AwaitingAddress { .. }, None) => return Ok(SubmissionReply::AskAddress),

            (SubmissionStep::AwaitingArea { name, phone, address }, area) => (
                SubmissionStep::AwaitingComment { name, phone, address, area: area.map(str::to_string) },
                SubmissionReply::AskComment,
            ),

            (SubmissionStep::AwaitingComment { name, phone, address, area }, comment) => {
                let draft = LeadDraft { name, phone, address, area, comment: comment.map(str::to_string) };
                (SubmissionStep::Confirming(draft.clone()), SubmissionReply::Confirm(draft))
            }

            // Texto solto na confirmação: mostra o resumo de novo
            (SubmissionStep::Confirming(draft), _) => {
                (SubmissionStep::Confirming(draft.clone()), SubmissionReply::Confirm(draft))
            }
        };

        self.sessions.set(partner_id, Session::Submission(next)).await;
        Ok(reply)
    }

    async fn check_duplicate(&self, partner_id: i64, name: String, phone: String) -> Result<SubmissionReply, AppError> {
        match self.crm.find_contact_by_phone(&phone).await {
            Ok(None) => {
                self.sessions
                    .set(partner_id, Session::Submission(SubmissionStep::AwaitingAddress { name, phone }))
                    .await;
                Ok(SubmissionReply::AskAddress)
            }
            Ok(Some(contact_id)) => {
                self.sessions.clear(partner_id).await;
                tracing::info!("Telefone {} já pertence ao contato {}; envio de {} barrado.", phone, contact_id, partner_id);

                let partner_name = self.partner_name(partner_id).await?;
                if let Err(e) = self.crm.create_deal(self.duplicate_deal_fields(&name, &phone, &partner_name)).await {
                    tracing::error!("Não foi possível registrar o alerta de duplicata de {}: {}", phone, e);
                }
                Ok(SubmissionReply::Duplicate { client_name: name })
            }
            Err(e) => {
                self.sessions.clear(partner_id).await;
                tracing::error!("Busca de duplicata falhou para {}: {}", phone, e);
                Ok(SubmissionReply::CrmFailure)
            }
        }
    }

    async fn partner_name(&self, partner_id: i64) -> Result<String, AppError> {
        Ok(self
            .store
            .find_partner(partner_id)
            .await?
            .map(|p| p.full_name)
            .unwrap_or_else(|| format!("ID {}", partner_id)))
    }

    fn duplicate_deal_fields(&self, client_name: &str, phone: &str, partner_name: &str) -> DealFields {
        let mut fields = DealFields::new();
        fields.insert("TITLE".into(), json!(format!("⚠️ Дубль: {} (партнер {})", client_name, partner_name)));
        fields.insert("CATEGORY_ID".into(), json!(self.funnel.funnel_id));
        fields.insert("SOURCE_ID".into(), json!("PARTNER_BOT_LEAD"));
        fields.insert(self.funnel.partner_name_field.clone(), json!(partner_name));
        fields.insert(
            "COMMENTS".into(),
            json!(format!(
                "Партнер {} пытался отправить клиента, который уже есть в базе.\nКлиент: {}\nТелефон: {}",
                partner_name, client_name, phone
            )),
        );
        if let Some(stage) = &self.funnel.duplicate_stage_id {
            fields.insert("STAGE_ID".into(), json!(stage));
        }
        fields
    }

    /// "Подтвердить": contato + negócio no CRM e, só com os dois criados, o Lead local.
    pub async fn confirm(&self, partner_id: i64) -> Result<SubmissionReply, AppError> {
        let draft = match self.sessions.take(partner_id).await {
            Some(Session::Submission(SubmissionStep::Confirming(draft))) => draft,
            Some(other) => {
                self.sessions.set(partner_id, other).await;
                return Ok(SubmissionReply::NothingToConfirm);
            }
            None => return Ok(SubmissionReply::NothingToConfirm),
        };

        // O status pode ter sido revogado durante o preenchimento
        let Some(partner) = self.verified_partner(partner_id).await? else {
            return Ok(SubmissionReply::NotVerified);
        };

        let contact = NewContact {
            name: draft.name.clone(),
            phone: draft.phone.clone(),
            address: Some(draft.address.clone()),
        };
        let contact_id = match self.crm.create_contact(&contact).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Envio de {} abortado, contato não criado: {}", partner_id, e);
                return Ok(SubmissionReply::CrmFailure);
            }
        };
        let deal_id = match self.crm.create_deal(self.client_deal_fields(&draft, &partner, contact_id)).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Envio de {} abortado, negócio não criado: {}", partner_id, e);
                return Ok(SubmissionReply::CrmFailure);
            }
        };

        let stage = match &self.funnel.start_stage_id {
            Some(id) => self.funnel.stages.label(id),
            None => NEW_LEAD_STAGE.to_string(),
        };
        let lead = self
            .store
            .insert_lead(&NewLead {
                partner_user_id: partner_id,
                bitrix_deal_id: deal_id,
                client_name: draft.name,
                client_phone: draft.phone,
                client_address: Some(draft.address),
                stage,
            })
            .await?;

        tracing::info!("Lead {} (negócio {}) criado pelo parceiro {}.", lead.id, deal_id, partner_id);
        Ok(SubmissionReply::Submitted(lead))
    }

    fn client_deal_fields(&self, draft: &LeadDraft, partner: &Partner, contact_id: i64) -> DealFields {
        let mut fields = DealFields::new();
        fields.insert(
            "TITLE".into(),
            json!(format!("Заявка от партнера {} (Клиент: {})", partner.full_name, draft.name)),
        );
        fields.insert("CATEGORY_ID".into(), json!(self.funnel.funnel_id));
        fields.insert("SOURCE_ID".into(), json!("PARTNER_BOT_LEAD"));
        fields.insert("CONTACT_ID".into(), json!(contact_id));
        fields.insert(self.funnel.partner_name_field.clone(), json!(partner.full_name));

        if let Some(stage) = &self.funnel.start_stage_id {
            fields.insert("STAGE_ID".into(), json!(stage));
        }
        if let Some(field) = &self.funnel.address_field {
            fields.insert(field.clone(), json!(draft.address));
        }
        if let (Some(field), Some(area)) = (&self.funnel.area_field, &draft.area) {
            fields.insert(field.clone(), json!(area));
        }
        if let Some(comment) = &draft.comment {
            fields.insert("COMMENTS".into(), json!(comment));
        }
        fields
    }

    // =========================================================================
    //  2. MUDANÇA DE ESTÁGIO VINDA DO CRM
    // =========================================================================

    pub async fn on_stage_update(&self, deal_id: i64, stage_id: &str) -> Result<StageUpdateOutcome, AppError> {
        let Some(lead) = self.store.find_lead_by_deal_id(deal_id).await? else {
            tracing::warn!("Negócio {} não pertence a nenhum lead. Ignorando.", deal_id);
            return Ok(StageUpdateOutcome::UnknownDeal);
        };

        let opportunity = match self.crm.get_deal(deal_id).await {
            Ok(deal) => opportunity(&deal),
            Err(e) => {
                tracing::warn!("Não foi possível ler o valor do negócio {}: {}", deal_id, e);
                Decimal::ZERO
            }
        };
        let percent = percent_or_zero(self.store.get_setting(PAYOUT_PERCENT_KEY).await?.as_deref());

        let kind = self.funnel.stages.kind(stage_id);
        let payout = compute_payout(opportunity, percent, kind);
        let stage = self.funnel.stages.label(stage_id);

        self.store.update_lead_stage(deal_id, &stage, payout).await?;
        tracing::info!("Lead {} agora em '{}' (pagamento {}).", lead.id, stage, payout);

        let notified = if kind.notifies_partner() {
            let message = OutgoingMessage::text(texts::stage_changed(&lead.client_name, &stage, payout));
            deliver(self.notifier.as_ref(), lead.partner_user_id, &message).await
        } else {
            false
        };

        Ok(StageUpdateOutcome::Updated { lead_id: lead.id, stage, payout, notified })
    }

    // =========================================================================
    //  3. "📊 Мои клиенты"
    // =========================================================================

    pub async fn clients_page(&self, partner_id: i64, page: u32) -> Result<OutgoingMessage, AppError> {
        if self.verified_partner(partner_id).await?.is_none() {
            return Ok(SubmissionReply::NotVerified.into_message());
        }

        let total = self.store.count_leads_by_partner(partner_id).await?;
        if total == 0 {
            return Ok(OutgoingMessage::text(texts::NO_CLIENTS));
        }

        let total_pages = ((total + CLIENTS_PER_PAGE - 1) / CLIENTS_PER_PAGE) as u32;
        let page = page.min(total_pages - 1);
        let leads = self
            .store
            .list_leads_by_partner(partner_id, CLIENTS_PER_PAGE, i64::from(page) * CLIENTS_PER_PAGE)
            .await?;

        let text = texts::clients_page(&leads, page, total_pages);
        Ok(match keyboards::pagination(page, total_pages) {
            Some(markup) => OutgoingMessage::with_markup(text, markup),
            None => OutgoingMessage::text(text),
        })
    }
}

/// Menu certo para quem sai de um fluxo (cancelamento, fim de envio).
pub fn menu_for(partner: Option<&Partner>) -> ReplyMarkup {
    match partner {
        Some(p) if p.status == PartnerStatus::Verified => keyboards::verified_menu(),
        _ => ReplyMarkup::Remove,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory_store::MemoryStore,
        test_utils::{client_funnel, FakeCrm, RecordingNotifier},
    };

    const PARTNER: i64 = 42;

    struct Harness {
        store: Arc<MemoryStore>,
        crm: Arc<FakeCrm>,
        notifier: Arc<RecordingNotifier>,
        sessions: Arc<SessionTable>,
        service: LeadService,
    }

    async fn harness(crm: FakeCrm) -> Harness {
        let store = Arc::new(MemoryStore::default());
        store.seed_partner(PARTNER, "Мария Петрова", PartnerStatus::Verified, Some(555)).await;
        let crm = Arc::new(crm);
        let notifier = Arc::new(RecordingNotifier::default());
        let sessions = Arc::new(SessionTable::default());
        let service = LeadService::new(store.clone(), crm.clone(), notifier.clone(), sessions.clone(), client_funnel());
        Harness { store, crm, notifier, sessions, service }
    }

    async fn step(h: &Harness, input: StepInput<'_>) -> SubmissionReply {
        let Some(Session::Submission(current)) = h.sessions.get(PARTNER).await else {
            panic!("no submission in progress");
        };
        h.service.advance(PARTNER, current, input).await.unwrap()
    }

    async fn lead_for(h: &Harness, deal_id: i64) -> Lead {
        h.store
            .insert_lead(&NewLead {
                partner_user_id: PARTNER,
                bitrix_deal_id: deal_id,
                client_name: "Иван".into(),
                client_phone: "+79001234567".into(),
                client_address: None,
                stage: NEW_LEAD_STAGE.into(),
            })
            .await
            .unwrap()
    }

    #[test]
    fn payout_is_a_rounded_percentage() {
        let p = compute_payout(Decimal::new(150_000, 0), Decimal::new(75, 1), StageKind::Win);
        assert_eq!(p, Decimal::new(1_125_000, 2));
        assert_eq!(compute_payout(Decimal::new(333, 0), Decimal::new(10, 0), StageKind::Intermediate), Decimal::new(3330, 2));
        assert_eq!(compute_payout(Decimal::new(1000, 0), Decimal::new(10, 0), StageKind::Lose), Decimal::ZERO);
    }

    #[test]
    fn payout_out_of_range_falls_back_to_zero() {
        assert_eq!(compute_payout(Decimal::MAX, Decimal::ONE_HUNDRED, StageKind::Win), Decimal::ZERO);
        let huge_deal = Decimal::from(5_000_000_000_000_000_000i64);
        assert_eq!(compute_payout(huge_deal, Decimal::new(50, 0), StageKind::Win), Decimal::ZERO);
    }

    #[tokio::test]
    async fn absurd_stored_percent_does_not_break_stage_update() {
        let h = harness(FakeCrm::default().with_opportunity(801, json!("10000000000"))).await;
        h.store.set_setting(PAYOUT_PERCENT_KEY, "100000000000000000000").await.unwrap();
        lead_for(&h, 801).await;

        let outcome = h.service.on_stage_update(801, "C9:WON").await.unwrap();

        assert!(matches!(outcome, StageUpdateOutcome::Updated { payout, .. } if payout == Decimal::ZERO));
        let lead = h.store.find_lead_by_deal_id(801).await.unwrap().unwrap();
        assert_eq!(lead.payout, Decimal::ZERO);
    }

    #[tokio::test]
    async fn unverified_partner_cannot_start() {
        let h = harness(FakeCrm::default()).await;
        h.store.seed_partner(7, "Новичок", PartnerStatus::Pending, Some(1)).await;

        assert_eq!(h.service.begin(7).await.unwrap(), SubmissionReply::NotVerified);
        assert_eq!(h.sessions.get(7).await, None);
    }

    #[tokio::test]
    async fn full_submission_creates_deal_and_lead() {
        let h = harness(FakeCrm::starting_at(700)).await;

        assert_eq!(h.service.begin(PARTNER).await.unwrap(), SubmissionReply::AskName);
        assert_eq!(step(&h, StepInput::Text("Иван Иванов")).await, SubmissionReply::AskPhone);
        assert_eq!(step(&h, StepInput::Text("8 (900) 123-45-67")).await, SubmissionReply::AskAddress);
        assert_eq!(step(&h, StepInput::Text("ул. Ленина, 1")).await, SubmissionReply::AskArea);
        assert_eq!(step(&h, StepInput::Skip).await, SubmissionReply::AskComment);

        let draft = LeadDraft {
            name: "Иван Иванов".into(),
            phone: "+79001234567".into(),
            address: "ул. Ленина, 1".into(),
            area: None,
            comment: Some("звонить вечером".into()),
        };
        assert_eq!(step(&h, StepInput::Text("звонить вечером")).await, SubmissionReply::Confirm(draft));

        let SubmissionReply::Submitted(lead) = h.service.confirm(PARTNER).await.unwrap() else {
            panic!("expected Submitted");
        };
        assert_eq!(lead.bitrix_deal_id, 701);
        assert_eq!(lead.client_phone, "+79001234567");
        assert_eq!(h.store.lead_count().await, 1);
        assert_eq!(h.sessions.get(PARTNER).await, None);

        let deals = h.crm.deals();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0]["UF_CRM_PARTNER"], json!("Мария Петрова"));
        assert_eq!(deals[0]["UF_CRM_ADDRESS"], json!("ул. Ленина, 1"));
        assert_eq!(deals[0]["STAGE_ID"], json!("C9:NEW"));
        assert!(!deals[0].contains_key("UF_CRM_AREA"));
    }

    #[tokio::test]
    async fn invalid_phone_reprompts_without_advancing() {
        let h = harness(FakeCrm::default()).await;
        h.service.begin(PARTNER).await.unwrap();
        step(&h, StepInput::Text("Иван")).await;

        assert_eq!(step(&h, StepInput::Text("12345")).await, SubmissionReply::InvalidPhone);
        assert_eq!(
            h.sessions.get(PARTNER).await,
            Some(Session::Submission(SubmissionStep::AwaitingPhone { name: "Иван".into() }))
        );
    }

    #[tokio::test]
    async fn duplicate_phone_short_circuits_with_one_alert_deal() {
        let h = harness(FakeCrm::default().with_duplicate("+79001234567")).await;
        h.service.begin(PARTNER).await.unwrap();
        step(&h, StepInput::Text("Иван")).await;

        let reply = step(&h, StepInput::Text("+7 900 123 45 67")).await;

        assert_eq!(reply, SubmissionReply::Duplicate { client_name: "Иван".into() });
        assert_eq!(h.store.lead_count().await, 0);
        assert_eq!(h.sessions.get(PARTNER).await, None);

        let deals = h.crm.deals();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0]["STAGE_ID"], json!("C9:DUPLICATE"));
        let comments = deals[0]["COMMENTS"].as_str().unwrap();
        assert!(comments.contains("Иван") && comments.contains("+79001234567") && comments.contains("Мария Петрова"));
    }

    #[tokio::test]
    async fn crm_failure_on_commit_persists_nothing() {
        let h = harness(FakeCrm::failing()).await;
        let draft = LeadDraft {
            name: "Иван".into(),
            phone: "+79001234567".into(),
            address: "Ленина 1".into(),
            area: None,
            comment: None,
        };
        h.sessions.set(PARTNER, Session::Submission(SubmissionStep::Confirming(draft))).await;

        assert_eq!(h.service.confirm(PARTNER).await.unwrap(), SubmissionReply::CrmFailure);
        assert_eq!(h.store.lead_count().await, 0);
    }

    #[tokio::test]
    async fn duplicate_lookup_failure_aborts_the_flow() {
        let h = harness(FakeCrm::failing()).await;
        h.sessions
            .set(PARTNER, Session::Submission(SubmissionStep::AwaitingPhone { name: "Иван".into() }))
            .await;

        assert_eq!(step(&h, StepInput::Text("+79001234567")).await, SubmissionReply::CrmFailure);
        assert_eq!(h.sessions.get(PARTNER).await, None);
    }

    #[tokio::test]
    async fn confirm_without_draft_does_nothing() {
        let h = harness(FakeCrm::default()).await;
        assert_eq!(h.service.confirm(PARTNER).await.unwrap(), SubmissionReply::NothingToConfirm);
        assert!(h.crm.deals().is_empty());
    }

    #[tokio::test]
    async fn payout_is_overwritten_not_accumulated() {
        let h = harness(FakeCrm::default().with_opportunity(801, json!("100"))).await;
        h.store.set_setting(PAYOUT_PERCENT_KEY, "10").await.unwrap();
        lead_for(&h, 801).await;

        h.service.on_stage_update(801, "C9:PREPARATION").await.unwrap();
        let lead = h.store.find_lead_by_deal_id(801).await.unwrap().unwrap();
        assert_eq!(lead.payout, Decimal::new(10, 0));
        assert_eq!(lead.stage, "В работе");

        h.crm.set_opportunity(801, json!(200));
        h.service.on_stage_update(801, "C9:WON").await.unwrap();

        let lead = h.store.find_lead_by_deal_id(801).await.unwrap().unwrap();
        assert_eq!(lead.payout, Decimal::new(20, 0));
        assert_eq!(lead.stage, "Успешно реализовано");
    }

    #[tokio::test]
    async fn lose_stage_forces_zero_and_notifies() {
        let h = harness(FakeCrm::default().with_opportunity(801, json!("5000"))).await;
        h.store.set_setting(PAYOUT_PERCENT_KEY, "10").await.unwrap();
        lead_for(&h, 801).await;

        let outcome = h.service.on_stage_update(801, "C9:LOSE").await.unwrap();

        let StageUpdateOutcome::Updated { payout, notified, .. } = outcome else { panic!("expected Updated") };
        assert_eq!(payout, Decimal::ZERO);
        assert!(notified);
        assert_eq!(h.notifier.sent_to(PARTNER).len(), 1);
    }

    #[tokio::test]
    async fn intermediate_stage_updates_silently() {
        let h = harness(FakeCrm::default()).await;
        lead_for(&h, 801).await;

        let outcome = h.service.on_stage_update(801, "C9:UC_CALL").await.unwrap();

        assert!(matches!(outcome, StageUpdateOutcome::Updated { notified: false, .. }));
        assert!(h.notifier.sent().is_empty());
        let lead = h.store.find_lead_by_deal_id(801).await.unwrap().unwrap();
        assert_eq!(lead.stage, "C9:UC_CALL");
        assert_eq!(lead.payout, Decimal::ZERO);
    }

    #[tokio::test]
    async fn unknown_deal_is_ignored() {
        let h = harness(FakeCrm::default()).await;
        assert_eq!(h.service.on_stage_update(999, "C9:WON").await.unwrap(), StageUpdateOutcome::UnknownDeal);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn clients_are_listed_five_per_page() {
        let h = harness(FakeCrm::default()).await;
        for deal_id in 1..=7 {
            lead_for(&h, deal_id).await;
        }

        let first = h.service.clients_page(PARTNER, 0).await.unwrap();
        assert!(first.text.contains("стр. 1 из 2"));
        assert_eq!(first.markup, keyboards::pagination(0, 2));

        let last = h.service.clients_page(PARTNER, 9).await.unwrap();
        assert!(last.text.contains("стр. 2 из 2"));
    }
}
