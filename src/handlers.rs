pub mod bitrix;
pub mod health;
pub mod telegram;
