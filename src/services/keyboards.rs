// src/services/keyboards.rs

use crate::models::{
    chat::{CallbackAction, InlineButton, KeyboardButton, ReplyMarkup},
    partner::PartnerRole,
};

pub const SUBMIT_CLIENT: &str = "🚀 Отправить клиента";
pub const MY_CLIENTS: &str = "📊 Мои клиенты";
pub const ABOUT_PROGRAM: &str = "ℹ️ О программе";
pub const CANCEL: &str = "❌ Отмена";
pub const SKIP: &str = "⏭ Пропустить";

fn inline(text: &str, action: CallbackAction) -> InlineButton {
    InlineButton { text: text.to_string(), action }
}

fn button(text: &str) -> KeyboardButton {
    KeyboardButton { text: text.to_string(), request_contact: false }
}

pub fn agree() -> ReplyMarkup {
    ReplyMarkup::Inline(vec![vec![inline("✅ Я согласен с условиями", CallbackAction::AgreeToTerms)]])
}

pub fn request_phone() -> ReplyMarkup {
    ReplyMarkup::Keyboard {
        rows: vec![
            vec![KeyboardButton {
                text: "📱 Поделиться номером телефона".to_string(),
                request_contact: true,
            }],
            vec![button(CANCEL)],
        ],
        one_time: true,
    }
}

pub fn verified_menu() -> ReplyMarkup {
    ReplyMarkup::Keyboard {
        rows: vec![vec![button(SUBMIT_CLIENT)], vec![button(MY_CLIENTS)], vec![button(ABOUT_PROGRAM)]],
        one_time: false,
    }
}

pub fn cancel() -> ReplyMarkup {
    ReplyMarkup::Keyboard { rows: vec![vec![button(CANCEL)]], one_time: true }
}

pub fn skip_or_cancel() -> ReplyMarkup {
    ReplyMarkup::Keyboard { rows: vec![vec![button(SKIP)], vec![button(CANCEL)]], one_time: true }
}

pub fn roles() -> ReplyMarkup {
    ReplyMarkup::Inline(
        PartnerRole::ALL
            .chunks(2)
            .map(|pair| pair.iter().map(|r| inline(r.label(), CallbackAction::ChooseRole(*r))).collect())
            .collect(),
    )
}

/// Botões de aprovar/recusar com o ID do parceiro embutido no callback.
pub fn verification(partner_id: i64) -> ReplyMarkup {
    ReplyMarkup::Inline(vec![vec![
        inline("✅ Одобрить", CallbackAction::VerifyPartner(partner_id)),
        inline("❌ Отклонить", CallbackAction::RejectPartner(partner_id)),
    ]])
}

pub fn confirmation() -> ReplyMarkup {
    ReplyMarkup::Inline(vec![vec![
        inline("✅ Подтвердить", CallbackAction::ConfirmSubmission),
        inline("🔄 Заполнить заново", CallbackAction::RetrySubmission),
    ]])
}

/// `None` quando só existe uma página.
pub fn pagination(page: u32, total_pages: u32) -> Option<ReplyMarkup> {
    let mut row = Vec::new();
    if page > 0 {
        row.push(inline("⬅️ Назад", CallbackAction::ClientsPage(page - 1)));
    }
    if page + 1 < total_pages {
        row.push(inline("Вперед ➡️", CallbackAction::ClientsPage(page + 1)));
    }
    (!row.is_empty()).then(|| ReplyMarkup::Inline(vec![row]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_buttons_depend_on_position() {
        assert_eq!(pagination(0, 1), None);

        let Some(ReplyMarkup::Inline(rows)) = pagination(0, 3) else { panic!("expected inline markup") };
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0][0].action, CallbackAction::ClientsPage(1));

        let Some(ReplyMarkup::Inline(rows)) = pagination(1, 3) else { panic!("expected inline markup") };
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn every_role_has_a_button() {
        let ReplyMarkup::Inline(rows) = roles() else { panic!("expected inline markup") };
        assert_eq!(rows.iter().map(Vec::len).sum::<usize>(), PartnerRole::ALL.len());
    }
}
