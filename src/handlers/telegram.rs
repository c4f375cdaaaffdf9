// src/handlers/telegram.rs

use axum::{body::Bytes, extract::State, http::StatusCode};

use crate::{config::AppState, models::telegram::Update};

// POST /webhook/telegram
// Sempre 200: o Telegram reenviaria o update em qualquer outro status.
pub async fn telegram_webhook(State(app_state): State<AppState>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!("Update do Telegram malformado: {}", e);
            return StatusCode::OK;
        }
    };

    let update_id = update.update_id;
    match update.into_event() {
        Some(event) => app_state.router.handle_chat(event).await,
        None => tracing::debug!("Update {} ignorado (tipo não tratado).", update_id),
    }

    StatusCode::OK
}
