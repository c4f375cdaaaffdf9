// src/common/stages.rs

use std::collections::HashMap;

/// Como um estágio da funil de clientes afeta o pagamento e as notificações.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Intermediate,
    Meeting,
    Win,
    Lose,
}

impl StageKind {
    /// Só estes estágios geram mensagem para o parceiro; o resto atualiza em silêncio.
    pub fn notifies_partner(self) -> bool {
        matches!(self, StageKind::Win | StageKind::Lose | StageKind::Meeting)
    }
}

#[derive(Debug, Clone)]
struct StageEntry {
    label: String,
    kind: StageKind,
}

// Tabela única: ID do estágio no Bitrix -> (rótulo, tipo).
// Usada tanto pelo cálculo de pagamento quanto pela lista de notificações.
#[derive(Debug, Clone, Default)]
pub struct StageCatalog {
    entries: HashMap<String, StageEntry>,
}

impl StageCatalog {
    pub fn new(win_stage: &str, lose_stage: &str, meeting_stage: Option<&str>) -> Self {
        let mut catalog = Self::default();
        catalog.insert(win_stage, "Успешно реализовано", StageKind::Win);
        catalog.insert(lose_stage, "Сделка провалена", StageKind::Lose);
        if let Some(meeting) = meeting_stage {
            catalog.insert(meeting, "Назначена встреча", StageKind::Meeting);
        }
        catalog
    }

    /// Aplica rótulos vindos da configuração (`ID=Rótulo;ID=Rótulo`).
    /// Um ID já conhecido mantém o tipo e só troca o rótulo.
    pub fn with_labels(mut self, raw: &str) -> Self {
        for (stage_id, label) in parse_labels(raw) {
            match self.entries.get_mut(&stage_id) {
                Some(entry) => entry.label = label,
                None => self.insert(&stage_id, &label, StageKind::Intermediate),
            }
        }
        self
    }

    fn insert(&mut self, stage_id: &str, label: &str, kind: StageKind) {
        self.entries.insert(
            stage_id.to_string(),
            StageEntry { label: label.to_string(), kind },
        );
    }

    /// Rótulo legível; estágio desconhecido volta como o próprio ID.
    pub fn label(&self, stage_id: &str) -> String {
        self.entries
            .get(stage_id)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| stage_id.to_string())
    }

    pub fn kind(&self, stage_id: &str) -> StageKind {
        self.entries
            .get(stage_id)
            .map(|e| e.kind)
            .unwrap_or(StageKind::Intermediate)
    }
}

fn parse_labels(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|pair| {
            let (id, label) = pair.split_once('=')?;
            let (id, label) = (id.trim(), label.trim());
            if id.is_empty() || label.is_empty() {
                None
            } else {
                Some((id.to_string(), label.to_string()))
            }
        })
        .collect()
}
