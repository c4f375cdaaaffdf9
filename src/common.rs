pub mod error;
pub mod phone;
pub mod stages;
