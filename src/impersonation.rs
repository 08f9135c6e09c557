//! Client-side impersonation flag: a profissional browsing as one of their
//! alunos. Nothing here is enforced by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::UserRole;
use crate::storage::{Storage, SESSION_TREE};

const IMPERSONATION_KEY: &str = "impersonation";

/// Stored flag object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpersonationState {
    pub active: bool,
    pub professional_user_id: Option<String>,
    pub student_aluno_id: Option<String>,
    pub role: UserRole,
    pub started_at: DateTime<Utc>,
}

impl ImpersonationState {
    /// Active flag with both ids present and non-empty
    pub fn is_usable(&self) -> bool {
        let present = |id: &Option<String>| id.as_deref().is_some_and(|s| !s.is_empty());
        self.active && present(&self.professional_user_id) && present(&self.student_aluno_id)
    }
}

/// Reads and writes the impersonation flag
#[derive(Clone)]
pub struct Impersonation {
    storage: Storage,
}

impl Impersonation {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Begin viewing the app as `student_aluno_id`
    pub fn start(
        &self,
        professional_user_id: &str,
        student_aluno_id: &str,
        role: UserRole,
    ) -> Result<ImpersonationState> {
        let state = ImpersonationState {
            active: true,
            professional_user_id: Some(professional_user_id.to_string()),
            student_aluno_id: Some(student_aluno_id.to_string()),
            role,
            started_at: Utc::now(),
        };

        self.storage.set(SESSION_TREE, IMPERSONATION_KEY, &state)?;
        tracing::info!(
            "Impersonation started: {} as aluno {}",
            professional_user_id,
            student_aluno_id
        );
        Ok(state)
    }

    /// Drop the flag. Returns whether one was set.
    pub fn stop(&self) -> Result<bool> {
        let removed = self.storage.remove(SESSION_TREE, IMPERSONATION_KEY)?;
        if removed {
            tracing::info!("Impersonation stopped");
        }
        Ok(removed)
    }

    pub fn current(&self) -> Result<Option<ImpersonationState>> {
        self.storage.get(SESSION_TREE, IMPERSONATION_KEY)
    }

    pub fn is_active(&self) -> Result<bool> {
        Ok(self.current()?.is_some_and(|state| state.is_usable()))
    }

    /// Student id being viewed, when impersonation is active
    pub fn student_aluno_id(&self) -> Result<Option<String>> {
        Ok(self
            .current()?
            .filter(ImpersonationState::is_usable)
            .and_then(|state| state.student_aluno_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impersonation() -> Impersonation {
        Impersonation::new(Storage::temporary().unwrap())
    }

    #[test]
    fn test_start_and_stop() -> Result<()> {
        let imp = impersonation();
        assert!(!imp.is_active()?);

        let state = imp.start("prof-1", "aluno-9", UserRole::Profissional)?;
        assert!(state.active);
        assert!(imp.is_active()?);
        assert_eq!(imp.student_aluno_id()?.as_deref(), Some("aluno-9"));
        assert_eq!(imp.current()?, Some(state));

        assert!(imp.stop()?);
        assert!(!imp.is_active()?);
        assert!(imp.current()?.is_none());
        assert!(!imp.stop()?);
        Ok(())
    }

    #[test]
    fn test_flag_with_empty_id_is_inactive() -> Result<()> {
        let imp = impersonation();
        imp.start("prof-1", "", UserRole::Profissional)?;

        assert!(!imp.is_active()?);
        assert!(imp.student_aluno_id()?.is_none());
        Ok(())
    }

    #[test]
    fn test_inactive_flag_is_ignored() {
        let state = ImpersonationState {
            active: false,
            professional_user_id: Some("prof-1".to_string()),
            student_aluno_id: Some("aluno-9".to_string()),
            role: UserRole::Profissional,
            started_at: Utc::now(),
        };
        assert!(!state.is_usable());
    }
}
