// src/handlers/health.rs

// GET /api/health
pub async fn health() -> &'static str {
    "OK"
}
