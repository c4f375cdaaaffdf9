// src/services/texts.rs

// Textos do bot (HTML do Telegram). Os de boas-vindas e "О программе"
// podem ser sobrescritos pelo /settext; aqui ficam os padrões.

use rust_decimal::Decimal;

use crate::models::{
    admin::Admin,
    lead::Lead,
    partner::{PartnerRole, PartnerStatus},
    session::LeadDraft,
};

pub const WELCOME: &str = "Здравствуйте! 🤝

Это бот партнерской программы нашей компании.
Мы предлагаем дизайнерам, риэлторам и приёмщикам выгодное сотрудничество.

<b>Условия:</b>
1. Вы регистрируетесь в системе.
2. Менеджер связывается с вами для верификации (ваша заявка попадет в воронку).
3. После верификации вы получаете доступ к отправке клиентов.

Нажимая \"Я согласен\", вы принимаете условия обработки персональных данных.";

pub const PROGRAM_INFO: &str = "<b>О партнерской программе</b>

Вы передаете нам контакты клиентов, мы ведем сделку.
За каждую успешно реализованную сделку вы получаете вознаграждение.
Статус каждого клиента можно посмотреть в разделе \"📊 Мои клиенты\".";

pub const PENDING_VERIFICATION: &str = "⏳ Ваша заявка на верификацию принята. Она попала в нашу воронку. Менеджер свяжется с вами в ближайшее рабочее время.";
pub const VERIFIED: &str = "✅ Вы верифицированный партнер. Теперь вы можете отправлять нам клиентов!";
pub const REJECTED: &str = "❌ К сожалению, ваша заявка на партнерство была отклонена.";
pub const GENERIC_ERROR: &str = "Произошла ошибка. Попробуйте позже.";

pub const STATUS_REJECTED_REVOKED: &str = "<b>Уведомление об изменении статуса 🔔</b>

Здравствуйте. Уведомляем вас, что статус вашей партнерской заявки был пересмотрен.

<b>Новый статус:</b> <i>Отклонено</i>.

Доступ к отправке клиентов закрыт. Для уточнения причин, пожалуйста, свяжитесь с вашим менеджером.";

pub const STATUS_PENDING_REVOKED: &str = "<b>Внимание: изменение статуса</b>

Здравствуйте. Ваш статус верификации был возвращен на этап \"На рассмотрении\".

<b>Новый статус:</b> <i>В ожидании</i>.

Доступ к отправке клиентов временно приостановлен. Пожалуйста, свяжитесь с вашим менеджером для прояснения ситуации.";

// --- Cadastro ---
pub const REGISTRATION_STARTED: &str = "Отлично! Давайте начнем регистрацию.";
pub const ASK_FULL_NAME: &str = "Пожалуйста, введите ваше ФИО:";
pub const INVALID_FULL_NAME: &str = "ФИО выглядит слишком коротким. Пожалуйста, введите ФИО полностью:";
pub const ASK_OWN_PHONE: &str = "Теперь, пожалуйста, поделитесь вашим номером телефона.";
pub const PRESS_SHARE_PHONE: &str = "Пожалуйста, нажмите на кнопку 'Поделиться номером телефона'.";
pub const ASK_ROLE: &str = "Кем вы являетесь?";
pub const ALREADY_REGISTERED: &str = "Вы уже зарегистрированы. Нажмите /start, чтобы увидеть ваш статус.";

// --- Envio de cliente ---
pub const ONLY_VERIFIED: &str = "Эта функция доступна только верифицированным партнерам.";
pub const ASK_CLIENT_NAME: &str = "Введите ФИО вашего клиента:";
pub const ASK_CLIENT_PHONE: &str = "Введите номер телефона клиента:";
pub const INVALID_CLIENT_PHONE: &str = "Номер не распознан. Введите российский номер, например +7 900 123-45-67:";
pub const ASK_CLIENT_ADDRESS: &str = "Введите адрес квартиры:";
pub const ASK_CLIENT_AREA: &str = "Укажите площадь квартиры (м²) или нажмите \"⏭ Пропустить\":";
pub const ASK_CLIENT_COMMENT: &str = "Добавьте комментарий или нажмите \"⏭ Пропустить\":";
pub const NOTHING_TO_CONFIRM: &str = "Эта заявка уже неактуальна. Начните заново через \"🚀 Отправить клиента\".";
pub const CANCELLED: &str = "Действие отменено.";
pub const NOT_SPECIFIED: &str = "не указано";

// --- Admin ---
pub const NO_PERMISSION: &str = "❌ У вас нет прав для этого действия.";
pub const ALREADY_PROCESSED: &str = "Этот партнер уже был обработан.";
pub const NO_CLIENTS: &str = "У вас пока нет отправленных клиентов.";
pub const NO_ADMINS: &str = "Список админов пуст.";
pub const SUPER_ADMIN_PROTECTED: &str = "❌ Нельзя удалить Супер-Админа (владельца бота).";

/// Escapa texto do usuário antes de entrar numa mensagem HTML.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rótulo do status para as mensagens dos admins.
pub fn status_label(status: PartnerStatus) -> &'static str {
    match status {
        PartnerStatus::Pending => "На рассмотрении",
        PartnerStatus::Verified => "Одобрен",
        PartnerStatus::Rejected => "Отклонен",
    }
}

pub fn new_partner_request(full_name: &str, phone: &str, role: PartnerRole, user_id: i64, username: Option<&str>) -> String {
    let mut text = format!(
        "🔔 <b>Новая заявка на партнерство!</b>\n\n\
         <b>ФИО:</b> {}\n\
         <b>Телефон:</b> {}\n\
         <b>Роль:</b> {}\n\
         <b>Telegram ID:</b> <code>{}</code>",
        escape_html(full_name),
        escape_html(phone),
        role.label(),
        user_id
    );
    if let Some(username) = username {
        text.push_str(&format!("\n<b>Username:</b> @{}", escape_html(username)));
    }
    text
}

/// Resposta ao admin que decidiu.
pub fn decision_applied(partner_id: i64, status: PartnerStatus, failed_deal: Option<i64>) -> String {
    let mut text = format!("✅ Партнер {}: статус {}.", partner_id, status_label(status));
    if let Some(deal_id) = failed_deal {
        text.push_str(&format!("\n⚠️ Не удалось передвинуть сделку {} в Битрикс.", deal_id));
    }
    text
}

/// Rodapé acrescentado à mensagem original do admin (botões somem).
pub fn processed_footer(original: &str, status: PartnerStatus, actor: &str) -> String {
    format!(
        "{}\n\n<b>Обработано:</b> {}\n<b>Статус:</b> {}",
        escape_html(original),
        escape_html(actor),
        status_label(status)
    )
}

/// Aviso aos outros juniores de que o caso foi fechado.
pub fn case_closed(partner_name: &str, status: PartnerStatus, actor: &str) -> String {
    format!(
        "🔔 Заявка партнера <b>{}</b> была обработана.\n<b>Статус:</b> {}\n<b>Менеджер:</b> {}",
        escape_html(partner_name),
        status_label(status),
        escape_html(actor)
    )
}

pub fn partner_not_found(partner_id: i64) -> String {
    format!("❌ Партнер {} не найден или у него нет сделки в Битрикс.", partner_id)
}

pub fn confirmation(draft: &LeadDraft) -> String {
    format!(
        "<b>Проверьте данные клиента:</b>\n\n\
         <b>ФИО:</b> {}\n\
         <b>Телефон:</b> {}\n\
         <b>Адрес:</b> {}\n\
         <b>Площадь:</b> {}\n\
         <b>Комментарий:</b> {}",
        escape_html(&draft.name),
        escape_html(&draft.phone),
        escape_html(&draft.address),
        draft.area.as_deref().map(escape_html).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        draft.comment.as_deref().map(escape_html).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    )
}

pub fn duplicate_client(client_name: &str) -> String {
    format!(
        "⚠️ Клиент <b>{}</b> уже есть в нашей базе. Заявка не создана, менеджер проверит ситуацию.",
        escape_html(client_name)
    )
}

pub fn client_submitted(client_name: &str) -> String {
    format!("✅ Клиент '{}' успешно отправлен!", escape_html(client_name))
}

pub fn stage_changed(client_name: &str, stage_label: &str, payout: Decimal) -> String {
    let mut text = format!(
        "🔔 <b>Статус клиента изменен</b>\n\n<b>Клиент:</b> {}\n<b>Этап:</b> {}",
        escape_html(client_name),
        escape_html(stage_label)
    );
    if payout > Decimal::ZERO {
        text.push_str(&format!("\n<b>Ваше вознаграждение:</b> {} ₽", payout));
    }
    text
}

pub fn clients_page(leads: &[Lead], page: u32, total_pages: u32) -> String {
    let mut text = format!("<b>📊 Мои клиенты</b> (стр. {} из {})\n", page + 1, total_pages);
    for lead in leads {
        text.push_str(&format!(
            "\n<b>{}</b> ({})\nЭтап: {}\nВознаграждение: {} ₽\n",
            escape_html(&lead.client_name),
            escape_html(&lead.client_phone),
            escape_html(&lead.stage),
            lead.payout
        ));
    }
    text
}

pub const SESSION_EXPIRED: &str = "Сессия устарела. Нажмите /start, чтобы начать заново.";
pub const CHOOSE_ROLE_WITH_BUTTONS: &str = "Пожалуйста, выберите роль с помощью кнопок ниже.";
pub const TEXT_UPDATED: &str = "✅ Текст обновлен.";

pub fn admin_added(username: &str, user_id: i64, role: &str) -> String {
    format!(
        "✅ Админ {} (ID: {}) успешно добавлен с ролью: <b>{}</b>.",
        escape_html(username),
        user_id,
        role
    )
}

pub fn admin_removed(user_id: i64) -> String {
    format!("✅ Админ (ID: {}) успешно удален.", user_id)
}

pub fn admin_not_found(user_id: i64) -> String {
    format!("❌ Админ (ID: {}) не найден.", user_id)
}

pub fn admins_list(admins: &[Admin]) -> String {
    let mut text = String::from("<b>Список администраторов:</b>\n");
    for admin in admins {
        text.push_str(&format!(
            "\n• {} (ID: <code>{}</code>)\n  <i>Роль: {}</i>",
            escape_html(&admin.username),
            admin.user_id,
            admin.role.as_str()
        ));
    }
    text
}

pub fn percent_updated(percent: Decimal) -> String {
    format!("✅ Процент вознаграждения установлен: {}%.", percent)
}

pub fn current_percent(percent: Decimal) -> String {
    format!("💰 Текущий процент вознаграждения: {}%.", percent)
}

pub fn broadcast_report(sent: usize, failed: usize) -> String {
    format!("📣 Рассылка завершена.\nДоставлено: {}\nОшибок: {}", sent, failed)
}
