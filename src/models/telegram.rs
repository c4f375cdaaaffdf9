// src/models/telegram.rs

// Só o pedaço do `Update` da Bot API que o bot realmente usa.

use serde::Deserialize;

use crate::models::chat::{ChatEvent, ChatUser, MessageRef};

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TgContact {
    pub phone_number: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
    pub contact: Option<TgContact>,
}

#[derive(Debug, Deserialize)]
pub struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    pub message: Option<TgMessage>,
    pub data: Option<String>,
}

impl From<TgUser> for ChatUser {
    fn from(user: TgUser) -> Self {
        ChatUser { id: user.id, username: user.username }
    }
}

impl Update {
    /// Converte para o evento interno; `None` para tipos de update que ignoramos.
    pub fn into_event(self) -> Option<ChatEvent> {
        if let Some(query) = self.callback_query {
            return Some(ChatEvent::Callback {
                id: query.id,
                from: query.from.into(),
                message: query.message.map(|m| MessageRef {
                    chat_id: m.chat.id,
                    message_id: m.message_id,
                    text: m.text,
                }),
                data: query.data.unwrap_or_default(),
            });
        }

        let message = self.message?;
        let from = message.from?;
        // Contato compartilhado só vale se for o do próprio usuário
        let contact_phone = message
            .contact
            .filter(|c| c.user_id.is_none_or(|id| id == from.id))
            .map(|c| c.phone_number);

        Some(ChatEvent::Message {
            from: from.into(),
            text: message.text,
            contact_phone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_message_becomes_message_event() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "from": { "id": 555, "username": "ivan" },
                "chat": { "id": 555 },
                "text": "/start"
            }
        }))
        .unwrap();

        assert_eq!(
            update.into_event(),
            Some(ChatEvent::Message {
                from: ChatUser { id: 555, username: Some("ivan".into()) },
                text: Some("/start".into()),
                contact_phone: None,
            })
        );
    }

    #[test]
    fn foreign_contact_is_ignored() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "from": { "id": 555 },
                "chat": { "id": 555 },
                "contact": { "phone_number": "+79990000000", "user_id": 999 }
            }
        }))
        .unwrap();

        match update.into_event() {
            Some(ChatEvent::Message { contact_phone, .. }) => assert_eq!(contact_phone, None),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn callback_query_keeps_message_reference() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 3,
            "callback_query": {
                "id": "cb-1",
                "from": { "id": 1 },
                "message": { "message_id": 20, "chat": { "id": 1 }, "text": "Новая заявка" },
                "data": "verify_partner:555"
            }
        }))
        .unwrap();

        assert_eq!(
            update.into_event(),
            Some(ChatEvent::Callback {
                id: "cb-1".into(),
                from: ChatUser { id: 1, username: None },
                message: Some(MessageRef {
                    chat_id: 1,
                    message_id: 20,
                    text: Some("Новая заявка".into()),
                }),
                data: "verify_partner:555".into(),
            })
        );
    }
}
