pub mod admin_service;
pub mod bitrix_client;
pub mod crm_gateway;
pub mod event_router;
pub mod keyboards;
pub mod lead_service;
pub mod notifier;
pub mod sessions;
pub mod telegram_client;
pub mod texts;
pub mod verification_service;
