// src/models/settings.rs

use rust_decimal::Decimal;
use std::str::FromStr;

pub const WELCOME_TEXT_KEY: &str = "welcome_text";
pub const PROGRAM_INFO_KEY: &str = "program_info_text";
pub const PAYOUT_PERCENT_KEY: &str = "payout_percent";

/// Textos editáveis pelo comando /settext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSetting {
    Welcome,
    ProgramInfo,
}

impl TextSetting {
    pub fn key(self) -> &'static str {
        match self {
            TextSetting::Welcome => WELCOME_TEXT_KEY,
            TextSetting::ProgramInfo => PROGRAM_INFO_KEY,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "welcome" => Some(TextSetting::Welcome),
            "info" => Some(TextSetting::ProgramInfo),
            _ => None,
        }
    }
}

/// Aceita "10", "7.5" e "7,5".
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim().replace(',', ".").as_str()).ok()
}

/// Faixa aceita pelo /setpercent: 0 a 100.
pub fn percent_in_range(percent: Decimal) -> bool {
    percent >= Decimal::ZERO && percent <= Decimal::ONE_HUNDRED
}

/// Percentual salvo nas configurações; qualquer falha vira 0.
pub fn percent_or_zero(raw: Option<&str>) -> Decimal {
    raw.and_then(parse_decimal).unwrap_or(Decimal::ZERO)
}
