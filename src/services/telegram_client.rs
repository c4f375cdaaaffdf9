// src/services/telegram_client.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    models::chat::{OutgoingMessage, ReplyMarkup},
    services::notifier::{Notifier, NotifyError},
};

#[derive(Debug, Serialize)]
struct TelegramSendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<TelegramReplyMarkup>,
}

#[derive(Debug, Serialize)]
struct TelegramEditMessage<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<TelegramReplyMarkup>,
}

#[derive(Debug, Serialize)]
struct TelegramAnswerCallback<'a> {
    callback_query_id: &'a str,
    text: &'a str,
    show_alert: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TelegramReplyMarkup {
    Inline {
        inline_keyboard: Vec<Vec<TelegramInlineButton>>,
    },
    Keyboard {
        keyboard: Vec<Vec<TelegramKeyboardButton>>,
        resize_keyboard: bool,
        one_time_keyboard: bool,
    },
    Remove {
        remove_keyboard: bool,
    },
}

#[derive(Debug, Serialize)]
struct TelegramInlineButton {
    text: String,
    callback_data: String,
}

#[derive(Debug, Serialize)]
struct TelegramKeyboardButton {
    text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    request_contact: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl From<&ReplyMarkup> for TelegramReplyMarkup {
    fn from(markup: &ReplyMarkup) -> Self {
        match markup {
            ReplyMarkup::Inline(rows) => TelegramReplyMarkup::Inline {
                inline_keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|b| TelegramInlineButton {
                                text: b.text.clone(),
                                callback_data: b.action.to_data(),
                            })
                            .collect()
                    })
                    .collect(),
            },
            ReplyMarkup::Keyboard { rows, one_time } => TelegramReplyMarkup::Keyboard {
                keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|b| TelegramKeyboardButton {
                                text: b.text.clone(),
                                request_contact: b.request_contact,
                            })
                            .collect()
                    })
                    .collect(),
                resize_keyboard: true,
                one_time_keyboard: *one_time,
            },
            ReplyMarkup::Remove => TelegramReplyMarkup::Remove { remove_keyboard: true },
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    api_base: String,
    http: reqwest::Client,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            api_base: format!("https://api.telegram.org/bot{}", bot_token),
            http,
        })
    }

    async fn send_telegram_request<T: Serialize>(&self, method: &str, payload: &T) -> Result<(), NotifyError> {
        let url = format!("{}/{}", self.api_base, method);

        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await?
            .json::<TelegramResponse>()
            .await?;

        if !response.ok {
            let error_msg = response
                .description
                .unwrap_or_else(|| "Unknown Telegram API error".to_string());
            return Err(NotifyError::Rejected(error_msg));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send_message(&self, chat_id: i64, message: &OutgoingMessage) -> Result<(), NotifyError> {
        let payload = TelegramSendMessage {
            chat_id,
            text: &message.text,
            parse_mode: "HTML",
            reply_markup: message.markup.as_ref().map(Into::into),
        };

        self.send_telegram_request("sendMessage", &payload).await
    }

    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), NotifyError> {
        let payload = TelegramAnswerCallback {
            callback_query_id: callback_id,
            text,
            show_alert,
        };

        self.send_telegram_request("answerCallbackQuery", &payload).await
    }

    async fn edit_message(&self, chat_id: i64, message_id: i64, message: &OutgoingMessage) -> Result<(), NotifyError> {
        // editMessageText só aceita teclado inline
        let reply_markup = match &message.markup {
            Some(markup @ ReplyMarkup::Inline(_)) => Some(markup.into()),
            _ => None,
        };
        let payload = TelegramEditMessage {
            chat_id,
            message_id,
            text: &message.text,
            parse_mode: "HTML",
            reply_markup,
        };

        self.send_telegram_request("editMessageText", &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{CallbackAction, InlineButton, KeyboardButton};
    use serde_json::json;

    #[test]
    fn inline_markup_serializes_to_bot_api_shape() {
        let markup = ReplyMarkup::Inline(vec![vec![InlineButton {
            text: "✅ Одобрить".into(),
            action: CallbackAction::VerifyPartner(7),
        }]]);
        let value = serde_json::to_value(TelegramReplyMarkup::from(&markup)).unwrap();
        assert_eq!(
            value,
            json!({ "inline_keyboard": [[{ "text": "✅ Одобрить", "callback_data": "verify_partner:7" }]] })
        );
    }

    #[test]
    fn reply_keyboard_only_flags_contact_buttons() {
        let markup = ReplyMarkup::Keyboard {
            rows: vec![
                vec![KeyboardButton { text: "📱".into(), request_contact: true }],
                vec![KeyboardButton { text: "❌ Отмена".into(), request_contact: false }],
            ],
            one_time: true,
        };
        let value = serde_json::to_value(TelegramReplyMarkup::from(&markup)).unwrap();
        assert_eq!(
            value,
            json!({
                "keyboard": [[{ "text": "📱", "request_contact": true }], [{ "text": "❌ Отмена" }]],
                "resize_keyboard": true,
                "one_time_keyboard": true
            })
        );
    }

    #[test]
    fn remove_markup() {
        let value = serde_json::to_value(TelegramReplyMarkup::from(&ReplyMarkup::Remove)).unwrap();
        assert_eq!(value, json!({ "remove_keyboard": true }));
    }
}
