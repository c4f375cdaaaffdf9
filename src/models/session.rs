// src/models/session.rs

// Estado de um fluxo em andamento, por usuário do chat.
// Cada passo carrega só os campos já coletados, com tipo próprio.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Registration(RegistrationStep),
    Submission(SubmissionStep),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStep {
    AwaitingFullName,
    AwaitingPhone { full_name: String },
    AwaitingRole { full_name: String, phone: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStep {
    AwaitingName,
    AwaitingPhone { name: String },
    AwaitingAddress { name: String, phone: String },
    AwaitingArea { name: String, phone: String, address: String },
    AwaitingComment { name: String, phone: String, address: String, area: Option<String> },
    Confirming(LeadDraft),
}

/// Tudo que foi coletado, pronto para ser confirmado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub area: Option<String>,
    pub comment: Option<String>,
}
