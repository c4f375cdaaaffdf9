// src/middleware/telegram_secret.rs

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Só confere o cabeçalho quando `TELEGRAM_WEBHOOK_SECRET` está configurado.
pub async fn telegram_secret_guard(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = app_state.telegram_secret.as_deref() {
        let received = request
            .headers()
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        if received != Some(expected) {
            tracing::warn!("Update do Telegram recusado: cabeçalho de segredo ausente ou inválido.");
            return Err(AppError::InvalidSecret);
        }
    }

    Ok(next.run(request).await)
}
