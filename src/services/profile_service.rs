use std::sync::Arc;

use crate::aluno::AlunoResolver;
use crate::error::{Result, ZapError};
use crate::models::{PerfilCompletoAluno, RoleRow, UserProfile, UserRole};
use crate::supabase::SupabaseClient;

#[derive(Clone)]
pub struct ProfileService {
    client: Arc<SupabaseClient>,
    resolver: Arc<AlunoResolver>,
}

impl ProfileService {
    pub fn new(client: Arc<SupabaseClient>, resolver: Arc<AlunoResolver>) -> Self {
        Self { client, resolver }
    }

    /// Role of the logged-in user; missing or unknown roles count as aluno
    pub async fn get_user_role(&self) -> Result<UserRole> {
        let user_id = self.client.require_user_id()?;

        let row: Option<RoleRow> = self
            .client
            .from("profiles")
            .select("role")
            .eq("id", &user_id)
            .maybe_single()
            .await?;

        let role = row
            .and_then(|r| r.role)
            .map(|r| UserRole::from_role_str(&r))
            .unwrap_or_default();

        tracing::debug!("User {} has role {}", user_id, role);
        Ok(role)
    }

    /// Who is using the app and on whose data
    pub async fn current_profile(&self) -> Result<UserProfile> {
        let user_id = self.client.require_user_id()?;
        let email = Some(self.client.config().auth.email).filter(|e| !e.is_empty());
        let role = self.get_user_role().await?;
        let impersonating = self.resolver.impersonation().is_active()?;

        let aluno_id = match self.resolver.get_aluno_id().await {
            Ok(id) => Some(id),
            Err(ZapError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(UserProfile {
            user_id,
            email,
            role,
            aluno_id,
            impersonating,
        })
    }

    /// Full profile of the aluno currently in view
    pub async fn get_profile(&self) -> Result<Option<PerfilCompletoAluno>> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("vw_perfil_completo_aluno")
            .select("*")
            .eq("aluno_id", &aluno_id)
            .maybe_single()
            .await
    }
}
