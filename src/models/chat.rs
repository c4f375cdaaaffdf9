// src/models/chat.rs

use std::str::FromStr;

use crate::models::partner::PartnerRole;

// =========================================================================
//  EVENTOS DE ENTRADA (já traduzidos do formato do Telegram)
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: i64,
    pub username: Option<String>,
}

impl ChatUser {
    /// Nome usado nas mensagens para outros admins ("@fulano" ou o ID).
    pub fn mention(&self) -> String {
        match &self.username {
            Some(name) => format!("@{}", name),
            None => format!("ID {}", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Message {
        from: ChatUser,
        text: Option<String>,
        // Preenchido quando o usuário usa o botão "Поделиться номером"
        contact_phone: Option<String>,
    },
    Callback {
        id: String,
        from: ChatUser,
        message: Option<MessageRef>,
        data: String,
    },
}

// =========================================================================
//  AÇÕES DOS BOTÕES INLINE (callback_data)
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    AgreeToTerms,
    ChooseRole(PartnerRole),
    VerifyPartner(i64),
    RejectPartner(i64),
    ConfirmSubmission,
    RetrySubmission,
    ClientsPage(u32),
}

impl CallbackAction {
    pub fn to_data(self) -> String {
        match self {
            CallbackAction::AgreeToTerms => "agree_to_terms".to_string(),
            CallbackAction::ChooseRole(role) => format!("partner_role:{}", role.slug()),
            CallbackAction::VerifyPartner(id) => format!("verify_partner:{}", id),
            CallbackAction::RejectPartner(id) => format!("reject_partner:{}", id),
            CallbackAction::ConfirmSubmission => "confirm_client_submission".to_string(),
            CallbackAction::RetrySubmission => "retry_client_submission".to_string(),
            CallbackAction::ClientsPage(page) => format!("clients_page:{}", page),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = ();

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            "agree_to_terms" => return Ok(CallbackAction::AgreeToTerms),
            "confirm_client_submission" => return Ok(CallbackAction::ConfirmSubmission),
            "retry_client_submission" => return Ok(CallbackAction::RetrySubmission),
            _ => {}
        }

        let (prefix, arg) = data.split_once(':').ok_or(())?;
        match prefix {
            "partner_role" => PartnerRole::from_slug(arg).map(CallbackAction::ChooseRole).ok_or(()),
            "verify_partner" => arg.parse().map(CallbackAction::VerifyPartner).map_err(|_| ()),
            "reject_partner" => arg.parse().map(CallbackAction::RejectPartner).map_err(|_| ()),
            "clients_page" => arg.parse().map(CallbackAction::ClientsPage).map_err(|_| ()),
            _ => Err(()),
        }
    }
}

// =========================================================================
//  MENSAGENS DE SAÍDA
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub action: CallbackAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub text: String,
    pub request_contact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    Inline(Vec<Vec<InlineButton>>),
    Keyboard {
        rows: Vec<Vec<KeyboardButton>>,
        one_time: bool,
    },
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), markup: None }
    }

    pub fn with_markup(text: impl Into<String>, markup: ReplyMarkup) -> Self {
        Self { text: text.into(), markup: Some(markup) }
    }
}
