pub mod store;
pub use store::{PgStore, Store};
pub mod partner_repo;
pub use partner_repo::PartnerRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod admin_repo;
pub use admin_repo::AdminRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

#[cfg(test)]
pub mod memory_store;
