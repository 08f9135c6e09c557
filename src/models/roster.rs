use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Row of `vw_alunos_profissional`: a student linked to a professional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterEntry {
    pub aluno_id: String,
    pub profissional_id: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub objetivo: Option<String>,
    #[serde(default)]
    pub ultimo_peso_kg: Option<f64>,
    #[serde(default)]
    pub ultima_atividade: Option<NaiveDate>,
}

impl RosterEntry {
    pub fn display_name(&self) -> &str {
        self.nome
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.aluno_id)
    }
}
