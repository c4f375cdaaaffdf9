// src/services/event_router.rs

use std::sync::Arc;

use crate::{
    common::{error::AppError, phone::normalize_phone},
    db::Store,
    models::{
        admin::satisfies,
        chat::{CallbackAction, ChatEvent, ChatUser, MessageRef, OutgoingMessage, ReplyMarkup},
        command::{AdminCommand, CommandParse, SET_PERCENT_USAGE},
        partner::PartnerRegistration,
        session::{RegistrationStep, Session},
        settings::TextSetting,
        webhook::CrmEvent,
    },
    services::{
        admin_service::{AdminService, RemoveOutcome},
        keyboards,
        lead_service::{menu_for, LeadService, StepInput},
        notifier::{deliver, Notifier},
        sessions::SessionTable,
        texts,
        verification_service::{
            status_message, Decision, DecisionOutcome, RegistrationOutcome, StageSync, VerificationService,
        },
    },
};

// Ponto único de entrada: eventos do chat e callbacks do CRM chegam aqui
// e são despachados para os serviços.
pub struct EventRouter {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<SessionTable>,
    verification: Arc<VerificationService>,
    leads: Arc<LeadService>,
    admin: Arc<AdminService>,
}

impl EventRouter {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<SessionTable>,
        verification: Arc<VerificationService>,
        leads: Arc<LeadService>,
        admin: Arc<AdminService>,
    ) -> Self {
        Self { store, notifier, sessions, verification, leads, admin }
    }

    /// Nunca falha para quem chamou: erro vira log + mensagem genérica ao usuário.
    pub async fn handle_chat(&self, event: ChatEvent) {
        let user_id = match &event {
            ChatEvent::Message { from, .. } | ChatEvent::Callback { from, .. } => from.id,
        };

        let result = match event {
            ChatEvent::Message { from, text, contact_phone } => {
                self.on_message(&from, text.as_deref().unwrap_or_default(), contact_phone.as_deref())
                    .await
            }
            ChatEvent::Callback { id, from, message, data } => {
                self.on_callback(&id, &from, message.as_ref(), &data).await
            }
        };

        if let Err(e) = result {
            tracing::error!("Falha ao tratar evento do usuário {}: {}", user_id, e);
            self.send(user_id, OutgoingMessage::text(texts::GENERIC_ERROR)).await;
        }
    }

    pub async fn handle_crm(&self, event: CrmEvent) {
        let result = match event {
            CrmEvent::PartnerVerification { user_id, deal_id, status } => {
                tracing::info!("CRM: status '{}' para o parceiro {} (negócio {:?}).", status, user_id, deal_id);
                self.verification.reconcile(user_id, status).await.map(|_| ())
            }
            CrmEvent::ClientDealUpdate { deal_id, stage_id } => {
                tracing::info!("CRM: negócio {} foi para o estágio {}.", deal_id, stage_id);
                self.leads.on_stage_update(deal_id, &stage_id).await.map(|_| ())
            }
        };

        if let Err(e) = result {
            tracing::error!("Falha ao aplicar evento do CRM: {}", e);
        }
    }

    // =========================================================================
    //  MENSAGENS
    // =========================================================================

    async fn on_message(&self, from: &ChatUser, text: &str, contact_phone: Option<&str>) -> Result<(), AppError> {
        let text = text.trim();

        if is_start_command(text) {
            return self.start(from).await;
        }
        if text == keyboards::CANCEL {
            return self.cancel(from).await;
        }
        if text.starts_with('/') {
            let parsed = AdminCommand::parse(text);
            if parsed != CommandParse::NotAdminCommand {
                return self.admin_command(from, parsed).await;
            }
        }

        // Botões do menu valem mesmo no meio de um fluxo
        match text {
            keyboards::SUBMIT_CLIENT => {
                self.sessions.clear(from.id).await;
                let reply = self.leads.begin(from.id).await?;
                self.send(from.id, reply.into_message()).await;
                return Ok(());
            }
            keyboards::MY_CLIENTS => {
                let page = self.leads.clients_page(from.id, 0).await?;
                self.send(from.id, page).await;
                return Ok(());
            }
            keyboards::ABOUT_PROGRAM => {
                let info = self.admin.text(TextSetting::ProgramInfo).await?;
                self.send(from.id, OutgoingMessage::text(info)).await;
                return Ok(());
            }
            _ => {}
        }

        match self.sessions.get(from.id).await {
            Some(Session::Registration(step)) => self.registration_step(from, step, text, contact_phone).await,
            Some(Session::Submission(step)) => {
                let input = if text == keyboards::SKIP { StepInput::Skip } else { StepInput::Text(text) };
                let reply = self.leads.advance(from.id, step, input).await?;
                self.send(from.id, reply.into_message()).await;
                Ok(())
            }
            None => {
                tracing::debug!("Mensagem sem contexto de {} ignorada.", from.id);
                Ok(())
            }
        }
    }

    /// Tela inicial de acordo com o status do parceiro.
    async fn start(&self, from: &ChatUser) -> Result<(), AppError> {
        self.sessions.clear(from.id).await;

        let message = match self.store.find_partner(from.id).await? {
            Some(partner) => status_message(partner.status),
            None => {
                let welcome = self.admin.text(TextSetting::Welcome).await?;
                OutgoingMessage::with_markup(welcome, keyboards::agree())
            }
        };
        self.send(from.id, message).await;
        Ok(())
    }

    async fn cancel(&self, from: &ChatUser) -> Result<(), AppError> {
        self.sessions.clear(from.id).await;
        let partner = self.store.find_partner(from.id).await?;
        self.send(from.id, OutgoingMessage::with_markup(texts::CANCELLED, menu_for(partner.as_ref())))
            .await;
        Ok(())
    }

    async fn registration_step(
        &self,
        from: &ChatUser,
        step: RegistrationStep,
        text: &str,
        contact_phone: Option<&str>,
    ) -> Result<(), AppError> {
        match step {
            RegistrationStep::AwaitingFullName => {
                if text.chars().count() < 2 {
                    self.send(from.id, OutgoingMessage::with_markup(texts::INVALID_FULL_NAME, keyboards::cancel()))
                        .await;
                    return Ok(());
                }
                self.sessions
                    .set(
                        from.id,
                        Session::Registration(RegistrationStep::AwaitingPhone { full_name: text.to_string() }),
                    )
                    .await;
                self.send(from.id, OutgoingMessage::with_markup(texts::ASK_OWN_PHONE, keyboards::request_phone()))
                    .await;
            }
            RegistrationStep::AwaitingPhone { full_name } => {
                // Contato compartilhado vale como veio; texto digitado precisa ser um número válido
                let phone = match contact_phone {
                    Some(shared) => Some(normalize_phone(shared).unwrap_or_else(|| shared.to_string())),
                    None => normalize_phone(text),
                };
                let Some(phone) = phone else {
                    self.send(from.id, OutgoingMessage::with_markup(texts::PRESS_SHARE_PHONE, keyboards::request_phone()))
                        .await;
                    return Ok(());
                };
                self.sessions
                    .set(from.id, Session::Registration(RegistrationStep::AwaitingRole { full_name, phone }))
                    .await;
                self.send(from.id, OutgoingMessage::with_markup(texts::ASK_ROLE, keyboards::roles())).await;
            }
            RegistrationStep::AwaitingRole { .. } => {
                self.send(from.id, OutgoingMessage::with_markup(texts::CHOOSE_ROLE_WITH_BUTTONS, keyboards::roles()))
                    .await;
            }
        }
        Ok(())
    }

    // =========================================================================
    //  COMANDOS DE ADMIN
    // =========================================================================

    async fn admin_command(&self, from: &ChatUser, parsed: CommandParse) -> Result<(), AppError> {
        let role = self.admin.role_of(from.id).await?;

        let reply = match parsed {
            CommandParse::NotAdminCommand => return Ok(()),
            CommandParse::Usage { required, hint } => {
                if satisfies(role, required) { hint.to_string() } else { texts::NO_PERMISSION.to_string() }
            }
            CommandParse::Parsed(command) => {
                if satisfies(role, command.required_role()) {
                    self.execute(from, command).await?
                } else {
                    tracing::warn!("Usuário {} tentou um comando sem permissão: {:?}", from.id, command);
                    texts::NO_PERMISSION.to_string()
                }
            }
        };

        self.send(from.id, OutgoingMessage::text(reply)).await;
        Ok(())
    }

    async fn execute(&self, from: &ChatUser, command: AdminCommand) -> Result<String, AppError> {
        Ok(match command {
            AdminCommand::Verify(partner_id) => self.decide_by_command(from, partner_id, Decision::Approve).await?,
            AdminCommand::Reject(partner_id) => self.decide_by_command(from, partner_id, Decision::Reject).await?,
            AdminCommand::AddAdmin { user_id, role, username } => {
                let admin = self.admin.add_admin(user_id, role, username).await?;
                texts::admin_added(&admin.username, admin.user_id, admin.role.as_str())
            }
            AdminCommand::DelAdmin(user_id) => match self.admin.remove_admin(user_id).await? {
                RemoveOutcome::Removed => texts::admin_removed(user_id),
                RemoveOutcome::NotFound => texts::admin_not_found(user_id),
                RemoveOutcome::SuperAdminProtected => texts::SUPER_ADMIN_PROTECTED.to_string(),
            },
            AdminCommand::ListAdmins => {
                let admins = self.admin.list_admins().await?;
                if admins.is_empty() { texts::NO_ADMINS.to_string() } else { texts::admins_list(&admins) }
            }
            AdminCommand::SetText { setting, value } => {
                self.admin.set_text(setting, &value).await?;
                texts::TEXT_UPDATED.to_string()
            }
            AdminCommand::ShowPercent => texts::current_percent(self.admin.payout_percent().await?),
            AdminCommand::SetPercent(percent) => match self.admin.set_payout_percent(percent).await {
                Ok(()) => texts::percent_updated(percent),
                Err(AppError::InvalidPercent(_)) => SET_PERCENT_USAGE.to_string(),
                Err(e) => return Err(e),
            },
            AdminCommand::Broadcast(text) => {
                let report = self.admin.broadcast(&text).await?;
                texts::broadcast_report(report.sent, report.failed)
            }
        })
    }

    async fn decide_by_command(&self, from: &ChatUser, partner_id: i64, decision: Decision) -> Result<String, AppError> {
        let outcome = self.verification.decide(from.id, &from.mention(), partner_id, decision).await?;
        Ok(match outcome {
            DecisionOutcome::Applied { deal_id, status, stage_sync } => {
                texts::decision_applied(partner_id, status, (stage_sync == StageSync::Failed).then_some(deal_id))
            }
            DecisionOutcome::Denied => texts::NO_PERMISSION.to_string(),
            DecisionOutcome::NotFound => texts::partner_not_found(partner_id),
            DecisionOutcome::AlreadyProcessed(_) => format!("❌ {}", texts::ALREADY_PROCESSED),
        })
    }

    // =========================================================================
    //  BOTÕES INLINE
    // =========================================================================

    async fn on_callback(
        &self,
        callback_id: &str,
        from: &ChatUser,
        message: Option<&MessageRef>,
        data: &str,
    ) -> Result<(), AppError> {
        let Ok(action) = data.parse::<CallbackAction>() else {
            tracing::warn!("callback_data desconhecido de {}: {}", from.id, data);
            self.answer(callback_id, "", false).await;
            return Ok(());
        };

        match action {
            CallbackAction::AgreeToTerms => {
                self.answer(callback_id, "", false).await;
                if self.store.find_partner(from.id).await?.is_some() {
                    self.send(from.id, OutgoingMessage::text(texts::ALREADY_REGISTERED)).await;
                    return Ok(());
                }
                if let Some(target) = message {
                    self.edit(target, OutgoingMessage::text(texts::REGISTRATION_STARTED)).await;
                }
                self.sessions
                    .set(from.id, Session::Registration(RegistrationStep::AwaitingFullName))
                    .await;
                self.send(from.id, OutgoingMessage::with_markup(texts::ASK_FULL_NAME, keyboards::cancel()))
                    .await;
            }
            CallbackAction::ChooseRole(role) => {
                let (full_name, phone) = match self.sessions.take(from.id).await {
                    Some(Session::Registration(RegistrationStep::AwaitingRole { full_name, phone })) => {
                        (full_name, phone)
                    }
                    other => {
                        if let Some(session) = other {
                            self.sessions.set(from.id, session).await;
                        }
                        self.answer(callback_id, texts::SESSION_EXPIRED, true).await;
                        return Ok(());
                    }
                };
                self.answer(callback_id, role.label(), false).await;

                let registration = PartnerRegistration {
                    user_id: from.id,
                    username: from.username.clone(),
                    full_name,
                    phone_number: phone,
                    role,
                };
                let reply = match self.verification.register(registration).await? {
                    RegistrationOutcome::PartnerCreated(_) => {
                        OutgoingMessage::with_markup(texts::PENDING_VERIFICATION, ReplyMarkup::Remove)
                    }
                    RegistrationOutcome::AlreadyRegistered => OutgoingMessage::text(texts::ALREADY_REGISTERED),
                    RegistrationOutcome::Failed => OutgoingMessage::with_markup(texts::GENERIC_ERROR, ReplyMarkup::Remove),
                };
                self.send(from.id, reply).await;
            }
            CallbackAction::VerifyPartner(partner_id) => {
                self.decide_by_button(callback_id, from, message, partner_id, Decision::Approve).await?;
            }
            CallbackAction::RejectPartner(partner_id) => {
                self.decide_by_button(callback_id, from, message, partner_id, Decision::Reject).await?;
            }
            CallbackAction::ConfirmSubmission => {
                self.answer(callback_id, "", false).await;
                let reply = self.leads.confirm(from.id).await?;
                self.send(from.id, reply.into_message()).await;
            }
            CallbackAction::RetrySubmission => {
                self.answer(callback_id, "", false).await;
                let reply = self.leads.retry(from.id).await?;
                self.send(from.id, reply.into_message()).await;
            }
            CallbackAction::ClientsPage(page) => {
                self.answer(callback_id, "", false).await;
                let listing = self.leads.clients_page(from.id, page).await?;
                match message {
                    Some(target) => self.edit(target, listing).await,
                    None => self.send(from.id, listing).await,
                }
            }
        }
        Ok(())
    }

    async fn decide_by_button(
        &self,
        callback_id: &str,
        from: &ChatUser,
        message: Option<&MessageRef>,
        partner_id: i64,
        decision: Decision,
    ) -> Result<(), AppError> {
        let actor = from.mention();
        match self.verification.decide(from.id, &actor, partner_id, decision).await? {
            DecisionOutcome::Applied { deal_id, status, stage_sync } => {
                let failed = stage_sync == StageSync::Failed;
                // Tira os botões da mensagem e registra quem decidiu
                if let Some(target) = message {
                    let original = target.text.as_deref().unwrap_or_default();
                    self.edit(target, OutgoingMessage::text(texts::processed_footer(original, status, &actor)))
                        .await;
                }
                let reply = texts::decision_applied(partner_id, status, failed.then_some(deal_id));
                self.answer(callback_id, &reply, failed).await;
            }
            DecisionOutcome::Denied => self.answer(callback_id, texts::NO_PERMISSION, true).await,
            DecisionOutcome::NotFound => {
                self.answer(callback_id, &texts::partner_not_found(partner_id), true).await
            }
            DecisionOutcome::AlreadyProcessed(_) => self.answer(callback_id, texts::ALREADY_PROCESSED, true).await,
        }
        Ok(())
    }

    // =========================================================================
    //  SAÍDA
    // =========================================================================

    async fn send(&self, chat_id: i64, message: OutgoingMessage) {
        deliver(self.notifier.as_ref(), chat_id, &message).await;
    }

    async fn answer(&self, callback_id: &str, text: &str, show_alert: bool) {
        if let Err(e) = self.notifier.answer_callback(callback_id, text, show_alert).await {
            tracing::warn!("Não foi possível responder o callback {}: {}", callback_id, e);
        }
    }

    async fn edit(&self, target: &MessageRef, message: OutgoingMessage) {
        if let Err(e) = self.notifier.edit_message(target.chat_id, target.message_id, &message).await {
            tracing::warn!("Não foi possível editar a mensagem {} em {}: {}", target.message_id, target.chat_id, e);
        }
    }
}

fn is_start_command(text: &str) -> bool {
    let head = text.split_whitespace().next().unwrap_or_default();
    head == "/start" || head.starts_with("/start@")
}
