// src/services/notifier.rs

use async_trait::async_trait;
use thiserror::Error;

use crate::models::chat::OutgoingMessage;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("falha de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    // Ex.: "Forbidden: bot was blocked by the user"
    #[error("Telegram recusou: {0}")]
    Rejected(String),
}

/// Lado de saída do chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, chat_id: i64, message: &OutgoingMessage) -> Result<(), NotifyError>;

    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), NotifyError>;

    async fn edit_message(&self, chat_id: i64, message_id: i64, message: &OutgoingMessage) -> Result<(), NotifyError>;
}

/// Envia sem propagar erro: uma entrega que falha só é logada.
/// Retorna `true` se a mensagem saiu.
pub async fn deliver(notifier: &dyn Notifier, chat_id: i64, message: &OutgoingMessage) -> bool {
    match notifier.send_message(chat_id, message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Não foi possível enviar mensagem para {}: {}", chat_id, e);
            false
        }
    }
}

/// Mesmo texto para vários destinatários; devolve (enviadas, falhas).
pub async fn deliver_all(
    notifier: &dyn Notifier,
    chat_ids: impl IntoIterator<Item = i64>,
    message: &OutgoingMessage,
) -> (usize, usize) {
    let mut sent = 0;
    let mut failed = 0;
    for chat_id in chat_ids {
        if deliver(notifier, chat_id, message).await {
            sent += 1;
        } else {
            failed += 1;
        }
    }
    (sent, failed)
}
