use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erros da aplicação. Falhas do CRM não aparecem aqui: os serviços tratam
// `CrmError` no próprio fluxo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Segredo do webhook inválido")]
    InvalidSecret,

    #[error("Parceiro já cadastrado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Percentual inválido: {0}")]
    InvalidPercent(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),
}

// Handlers só devolvem `InvalidSecret`; o resto só chega aqui por engano e vira 500.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidSecret => (StatusCode::FORBIDDEN, "Forbidden"),
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
