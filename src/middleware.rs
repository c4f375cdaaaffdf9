pub mod telegram_secret;
