// src/models/command.rs

use rust_decimal::Decimal;

use crate::models::{
    admin::AdminRole,
    settings::{parse_decimal, percent_in_range, TextSetting},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Verify(i64),
    Reject(i64),
    AddAdmin {
        user_id: i64,
        role: AdminRole,
        username: Option<String>,
    },
    DelAdmin(i64),
    ListAdmins,
    SetText {
        setting: TextSetting,
        value: String,
    },
    ShowPercent,
    SetPercent(Decimal),
    Broadcast(String),
}

/// Resultado da leitura de uma linha de texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParse {
    NotAdminCommand,
    Parsed(AdminCommand),
    // Comando conhecido com argumentos errados: papel exigido + dica de uso
    Usage { required: AdminRole, hint: &'static str },
}

pub const VERIFY_USAGE: &str = "Использование: /verify &lt;user_id&gt;";
pub const REJECT_USAGE: &str = "Использование: /reject &lt;user_id&gt;";
pub const ADD_ADMIN_USAGE: &str = "<b>Использование:</b> /addadmin &lt;user_id&gt; &lt;junior|senior&gt; [username]";
pub const DEL_ADMIN_USAGE: &str = "<b>Использование:</b> /deladmin &lt;user_id&gt;";
pub const SET_TEXT_USAGE: &str = "<b>Использование:</b> /settext &lt;welcome|info&gt; &lt;текст&gt;";
pub const SET_PERCENT_USAGE: &str = "<b>Использование:</b> /setpercent &lt;число от 0 до 100&gt; (например, 7.5)";
pub const BROADCAST_USAGE: &str = "<b>Использование:</b> /broadcast &lt;текст&gt;";

impl AdminCommand {
    /// Papel mínimo para executar o comando.
    pub fn required_role(&self) -> AdminRole {
        match self {
            AdminCommand::Verify(_) | AdminCommand::Reject(_) => AdminRole::Junior,
            _ => AdminRole::Senior,
        }
    }

    pub fn parse(text: &str) -> CommandParse {
        let text = text.trim();
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };
        // "/verify@MeuBot 123" -> "/verify"
        let name = head.split('@').next().unwrap_or(head);
        let args: Vec<&str> = rest.split_whitespace().collect();

        match name {
            "/verify" => match single_id(&args) {
                Some(id) => CommandParse::Parsed(AdminCommand::Verify(id)),
                None => usage(AdminRole::Junior, VERIFY_USAGE),
            },
            "/reject" => match single_id(&args) {
                Some(id) => CommandParse::Parsed(AdminCommand::Reject(id)),
                None => usage(AdminRole::Junior, REJECT_USAGE),
            },
            "/addadmin" => {
                if args.len() < 2 {
                    return usage(AdminRole::Senior, ADD_ADMIN_USAGE);
                }
                let (Ok(user_id), Some(role)) = (args[0].parse(), AdminRole::parse(args[1])) else {
                    return usage(AdminRole::Senior, ADD_ADMIN_USAGE);
                };
                let username = (args.len() > 2).then(|| args[2..].join(" "));
                CommandParse::Parsed(AdminCommand::AddAdmin { user_id, role, username })
            }
            "/deladmin" => match single_id(&args) {
                Some(id) => CommandParse::Parsed(AdminCommand::DelAdmin(id)),
                None => usage(AdminRole::Senior, DEL_ADMIN_USAGE),
            },
            "/listadmins" => CommandParse::Parsed(AdminCommand::ListAdmins),
            "/settext" => {
                // O texto pode ter quebras de linha, então não usamos `args` aqui
                let Some((key, value)) = rest.split_once(char::is_whitespace) else {
                    return usage(AdminRole::Senior, SET_TEXT_USAGE);
                };
                match TextSetting::parse(key) {
                    Some(setting) if !value.trim().is_empty() => {
                        CommandParse::Parsed(AdminCommand::SetText {
                            setting,
                            value: value.trim().to_string(),
                        })
                    }
                    _ => usage(AdminRole::Senior, SET_TEXT_USAGE),
                }
            }
            "/setpercent" => match args.as_slice() {
                // Sem argumento: só mostra o valor atual
                [] => CommandParse::Parsed(AdminCommand::ShowPercent),
                [raw] => match parse_decimal(raw) {
                    Some(value) if percent_in_range(value) => {
                        CommandParse::Parsed(AdminCommand::SetPercent(value))
                    }
                    _ => usage(AdminRole::Senior, SET_PERCENT_USAGE),
                },
                _ => usage(AdminRole::Senior, SET_PERCENT_USAGE),
            },
            "/broadcast" => {
                if rest.is_empty() {
                    usage(AdminRole::Senior, BROADCAST_USAGE)
                } else {
                    CommandParse::Parsed(AdminCommand::Broadcast(rest.to_string()))
                }
            }
            _ => CommandParse::NotAdminCommand,
        }
    }
}

fn usage(required: AdminRole, hint: &'static str) -> CommandParse {
    CommandParse::Usage { required, hint }
}

fn single_id(args: &[&str]) -> Option<i64> {
    match args {
        [raw] => raw.parse().ok(),
        _ => None,
    }
}
