// src/handlers/bitrix.rs

use axum::extract::{Query, State};

use crate::{common::error::AppError, config::AppState, models::webhook::BitrixWebhookQuery};

// GET|POST /webhook/bitrix
pub async fn bitrix_webhook(
    State(app_state): State<AppState>,
    Query(query): Query<BitrixWebhookQuery>,
) -> Result<&'static str, AppError> {
    if !query.secret_matches(&app_state.incoming_secret) {
        tracing::warn!("Webhook do Bitrix recusado: segredo inválido.");
        return Err(AppError::InvalidSecret);
    }

    // Evento inválido não é erro para o Bitrix: só fica no log
    match query.into_event(&app_state.partner_funnel) {
        Ok(event) => app_state.router.handle_crm(event).await,
        Err(rejection) => tracing::warn!("Webhook do Bitrix ignorado: {}", rejection),
    }

    Ok("OK")
}
