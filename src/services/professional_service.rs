use chrono::Utc;
use std::sync::Arc;

use super::ProfileService;
use crate::aluno::AlunoResolver;
use crate::error::{Result, ZapError};
use crate::impersonation::ImpersonationState;
use crate::models::{
    AiReply, ChatRequest, Instruction, InstructionKind, InstructionUpsert, RosterEntry,
};
use crate::supabase::SupabaseClient;

/// Operations available to nutritionists and personal trainers
#[derive(Clone)]
pub struct ProfessionalService {
    client: Arc<SupabaseClient>,
    resolver: Arc<AlunoResolver>,
}

impl ProfessionalService {
    pub fn new(client: Arc<SupabaseClient>, resolver: Arc<AlunoResolver>) -> Self {
        Self { client, resolver }
    }

    /// Students linked to the logged-in professional
    pub async fn roster(&self) -> Result<Vec<RosterEntry>> {
        let user_id = self.client.require_user_id()?;

        self.client
            .from("vw_alunos_profissional")
            .select("*")
            .eq("profissional_id", &user_id)
            .order("nome", true)
            .execute()
            .await
    }

    /// Latest instructions of a kind for a student
    pub async fn instructions(
        &self,
        kind: InstructionKind,
        aluno_id: &str,
    ) -> Result<Option<Instruction>> {
        let mut rows: Vec<Instruction> = self
            .client
            .from(kind.table())
            .select("*")
            .eq("aluno_id", aluno_id)
            .order("updated_at", false)
            .limit(1)
            .execute()
            .await?;

        Ok(rows.pop())
    }

    pub async fn save_instructions(
        &self,
        kind: InstructionKind,
        aluno_id: &str,
        conteudo: &str,
    ) -> Result<Instruction> {
        if conteudo.trim().is_empty() {
            return Err(ZapError::Validation("Instructions cannot be empty".to_string()));
        }

        let profissional_id = self.client.require_user_id()?;
        let payload = InstructionUpsert {
            aluno_id: aluno_id.to_string(),
            profissional_id,
            conteudo: conteudo.trim().to_string(),
            updated_at: Utc::now(),
        };

        let mut rows: Vec<Instruction> = self
            .client
            .from(kind.table())
            .upsert(&payload, "aluno_id")
            .await?;

        let saved = rows
            .pop()
            .ok_or_else(|| ZapError::NotFound("Upsert returned no instruction row".to_string()))?;

        tracing::info!("Saved {} instructions for aluno {}", kind, aluno_id);
        Ok(saved)
    }

    /// Ask the assistant for an instruction draft
    pub async fn suggest_instructions(
        &self,
        kind: InstructionKind,
        aluno_id: &str,
        prompt: &str,
    ) -> Result<AiReply> {
        if prompt.trim().is_empty() {
            return Err(ZapError::Validation("Prompt cannot be empty".to_string()));
        }

        let current = self.instructions(kind, aluno_id).await?;
        let request = ChatRequest {
            aluno_id: aluno_id.to_string(),
            tipo: kind,
            mensagem: prompt.to_string(),
            instrucoes_atuais: current.map(|i| i.conteudo),
        };

        let reply: AiReply = self.client.invoke("chat-nutricionista", &request).await?;
        if !reply.success {
            return Err(ZapError::Validation(format!(
                "Suggestion failed: {}",
                reply.text()
            )));
        }
        Ok(reply)
    }

    /// Start viewing the app as one of the professional's students
    pub async fn start_impersonation(&self, aluno_id: &str) -> Result<ImpersonationState> {
        let user_id = self.client.require_user_id()?;

        let role = ProfileService::new(self.client.clone(), self.resolver.clone())
            .get_user_role()
            .await?;
        if !role.is_professional() {
            return Err(ZapError::Forbidden(
                "Only professionals can view a student's account".to_string(),
            ));
        }

        let roster = self.roster().await?;
        if !roster.iter().any(|entry| entry.aluno_id == aluno_id) {
            return Err(ZapError::Forbidden(format!(
                "Aluno {} is not on your roster",
                aluno_id
            )));
        }

        self.resolver.impersonation().start(&user_id, aluno_id, role)
    }

    pub fn stop_impersonation(&self) -> Result<bool> {
        self.resolver.impersonation().stop()
    }

    pub fn impersonation_status(&self) -> Result<Option<ImpersonationState>> {
        Ok(self
            .resolver
            .impersonation()
            .current()?
            .filter(ImpersonationState::is_usable))
    }
}
