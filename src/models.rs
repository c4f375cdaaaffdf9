pub mod admin;
pub mod chat;
pub mod command;
pub mod lead;
pub mod partner;
pub mod session;
pub mod settings;
pub mod telegram;
pub mod webhook;
