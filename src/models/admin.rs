// src/models/admin.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Serialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "admin_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Junior,
    Senior,
}

impl AdminRole {
    pub fn as_str(self) -> &'static str {
        match self {
            AdminRole::Junior => "junior",
            AdminRole::Senior => "senior",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "junior" => Some(AdminRole::Junior),
            "senior" => Some(AdminRole::Senior),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Admin {
    pub user_id: i64,
    pub username: String,
    pub role: AdminRole,
}

// Predicados puros sobre o papel já buscado no banco.
// Compostos com && / || no lugar das antigas classes de filtro.

pub fn is_admin(role: Option<AdminRole>) -> bool {
    role.is_some()
}

pub fn is_senior(role: Option<AdminRole>) -> bool {
    role == Some(AdminRole::Senior)
}

/// `required` é o papel mínimo exigido pelo comando.
pub fn satisfies(role: Option<AdminRole>, required: AdminRole) -> bool {
    match required {
        AdminRole::Junior => is_admin(role),
        AdminRole::Senior => is_senior(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn senior_satisfies_everything_junior_only_junior() {
        assert!(satisfies(Some(AdminRole::Senior), AdminRole::Senior));
        assert!(satisfies(Some(AdminRole::Senior), AdminRole::Junior));
        assert!(satisfies(Some(AdminRole::Junior), AdminRole::Junior));
        assert!(!satisfies(Some(AdminRole::Junior), AdminRole::Senior));
        assert!(!satisfies(None, AdminRole::Junior));
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(AdminRole::parse("Senior"), Some(AdminRole::Senior));
        assert_eq!(AdminRole::parse("junior"), Some(AdminRole::Junior));
        assert_eq!(AdminRole::parse("boss"), None);
    }
}
