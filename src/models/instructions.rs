use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which professional wrote the instructions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    Nutricionista,
    Personal,
}

impl InstructionKind {
    pub fn table(&self) -> &'static str {
        match self {
            InstructionKind::Nutricionista => "instrucoes_nutricionista",
            InstructionKind::Personal => "instrucoes_personal",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::Nutricionista => write!(f, "nutricionista"),
            InstructionKind::Personal => write!(f, "personal"),
        }
    }
}

impl FromStr for InstructionKind {
    type Err = crate::error::ZapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nutricionista" | "nutri" | "dieta" => Ok(InstructionKind::Nutricionista),
            "personal" | "treino" => Ok(InstructionKind::Personal),
            _ => Err(crate::error::ZapError::Validation(format!(
                "Invalid instruction kind: {}",
                s
            ))),
        }
    }
}

/// Row of `instrucoes_nutricionista` / `instrucoes_personal`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instruction {
    #[serde(default)]
    pub id: Option<String>,
    pub aluno_id: String,
    #[serde(default)]
    pub profissional_id: Option<String>,
    pub conteudo: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Upsert payload for the instruction tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstructionUpsert {
    pub aluno_id: String,
    pub profissional_id: String,
    pub conteudo: String,
    pub updated_at: DateTime<Utc>,
}

/// Body for the `chat-nutricionista` edge function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub aluno_id: String,
    pub tipo: InstructionKind,
    pub mensagem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrucoes_atuais: Option<String>,
}

/// Loose reply shape shared by the AI edge functions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AiReply {
    #[serde(default = "default_true", alias = "sucesso")]
    pub success: bool,
    #[serde(default, alias = "mensagem")]
    pub message: Option<String>,
    #[serde(default, alias = "resposta", alias = "sugestao", alias = "conteudo")]
    pub content: Option<String>,
}

fn default_true() -> bool {
    true
}

impl AiReply {
    /// Best text to show the user
    pub fn text(&self) -> &str {
        self.content
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tables() {
        assert_eq!(InstructionKind::Nutricionista.table(), "instrucoes_nutricionista");
        assert_eq!(InstructionKind::Personal.table(), "instrucoes_personal");
        assert_eq!("treino".parse::<InstructionKind>().unwrap(), InstructionKind::Personal);
        assert!("coach".parse::<InstructionKind>().is_err());
    }

    #[test]
    fn test_ai_reply_aliases() {
        let reply: AiReply =
            serde_json::from_str(r#"{"sucesso": true, "resposta": "Aumente a proteína no café."}"#)
                .unwrap();
        assert!(reply.success);
        assert_eq!(reply.text(), "Aumente a proteína no café.");

        let reply: AiReply = serde_json::from_str(r#"{"mensagem": "Dieta criada"}"#).unwrap();
        assert!(reply.success);
        assert_eq!(reply.text(), "Dieta criada");
    }
}
