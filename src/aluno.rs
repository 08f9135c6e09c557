//! Resolves which `alunos.id` the current session acts on.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::error::{Result, ZapError};
use crate::impersonation::Impersonation;
use crate::models::AlunoId;
use crate::storage::{Storage, ALUNO_CACHE_TREE};
use crate::supabase::{AuthEvent, SupabaseClient};

/// Looks up the aluno id behind the logged-in user, memoized in local
/// storage under `aluno_id:{project_ref}:{auth_user_id}`. An active
/// impersonation flag takes precedence over the lookup.
pub struct AlunoResolver {
    client: Arc<SupabaseClient>,
    storage: Storage,
    impersonation: Impersonation,
    events: Mutex<broadcast::Receiver<AuthEvent>>,
    last_user: Mutex<Option<String>>,
}

impl AlunoResolver {
    pub fn new(client: Arc<SupabaseClient>, storage: Storage) -> Self {
        let events = Mutex::new(client.on_auth_state_change());
        let last_user = Mutex::new(client.current_user_id());

        Self {
            impersonation: Impersonation::new(storage.clone()),
            client,
            storage,
            events,
            last_user,
        }
    }

    fn cache_prefix(&self) -> String {
        format!("aluno_id:{}:", self.client.project_ref())
    }

    fn cache_key(&self, user_id: &str) -> String {
        format!("{}{}", self.cache_prefix(), user_id)
    }

    /// Aluno id to use for data fetching
    pub async fn get_aluno_id(&self) -> Result<String> {
        self.process_auth_events()?;

        if let Some(student) = self.impersonation.student_aluno_id()? {
            tracing::debug!("Impersonation active, using aluno {}", student);
            return Ok(student);
        }

        self.own_aluno_id().await
    }

    /// Aluno id of the logged-in user, ignoring impersonation
    pub async fn own_aluno_id(&self) -> Result<String> {
        self.process_auth_events()?;

        let user_id = self.client.require_user_id()?;
        let key = self.cache_key(&user_id);

        if let Some(cached) = self.storage.get::<String>(ALUNO_CACHE_TREE, &key)? {
            tracing::debug!("Aluno id cache hit for {}", user_id);
            return Ok(cached);
        }

        let row: Option<AlunoId> = self
            .client
            .from("alunos")
            .select("id")
            .eq("user_id", &user_id)
            .maybe_single()
            .await?;

        let aluno_id = row
            .map(|r| r.id)
            .ok_or_else(|| ZapError::NotFound(format!("No aluno for user {}", user_id)))?;

        self.storage.set(ALUNO_CACHE_TREE, &key, &aluno_id)?;
        tracing::debug!("Cached aluno id {} for {}", aluno_id, user_id);
        Ok(aluno_id)
    }

    /// Record an id that is already known (e.g. right after onboarding)
    pub fn remember(&self, aluno_id: &str) -> Result<()> {
        let user_id = self.client.require_user_id()?;
        self.storage
            .set(ALUNO_CACHE_TREE, &self.cache_key(&user_id), &aluno_id.to_string())
    }

    /// Forget every cached id for this project
    pub fn invalidate(&self) -> Result<usize> {
        let removed = self
            .storage
            .remove_prefix(ALUNO_CACHE_TREE, &self.cache_prefix())?;
        tracing::debug!("Invalidated {} cached aluno ids", removed);
        Ok(removed)
    }

    pub fn impersonation(&self) -> &Impersonation {
        &self.impersonation
    }

    /// Drain pending auth events and invalidate accordingly
    fn process_auth_events(&self) -> Result<()> {
        let mut events = self.events.lock();

        loop {
            match events.try_recv() {
                Ok(AuthEvent::SignedOut) => {
                    self.invalidate()?;
                    *self.last_user.lock() = None;
                }
                Ok(AuthEvent::SignedIn { user_id }) | Ok(AuthEvent::TokenRefreshed { user_id }) => {
                    let mut last = self.last_user.lock();
                    if let Some(previous) = last.as_ref().filter(|p| **p != user_id) {
                        self.storage
                            .remove(ALUNO_CACHE_TREE, &self.cache_key(previous))?;
                    }
                    *last = Some(user_id);
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} auth events, dropping aluno cache", skipped);
                    self.invalidate()?;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        Ok(())
    }
}
