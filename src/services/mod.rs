// Business logic services over the Supabase project

pub mod dashboard_service;
pub mod diet_service;
pub mod professional_service;
pub mod profile_service;
pub mod progress_service;
pub mod workout_service;

pub use dashboard_service::{DashboardData, DashboardService};
pub use diet_service::DietService;
pub use professional_service::ProfessionalService;
pub use profile_service::ProfileService;
pub use progress_service::ProgressService;
pub use workout_service::WorkoutService;

use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::aluno::AlunoResolver;
use crate::config::Config;
use crate::error::Result;
use crate::storage::Storage;
use crate::supabase::{RetryConfig, SupabaseClient};

/// Shared handles every service needs
#[derive(Clone)]
pub struct ZapNutri {
    pub client: Arc<SupabaseClient>,
    pub storage: Storage,
    pub resolver: Arc<AlunoResolver>,
}

impl ZapNutri {
    pub fn new(config: Config, storage: Storage) -> Result<Self> {
        Self::with_retry_config(config, storage, RetryConfig::default())
    }

    pub fn with_retry_config(
        config: Config,
        storage: Storage,
        retry_config: RetryConfig,
    ) -> Result<Self> {
        let client = Arc::new(SupabaseClient::with_retry_config(config, retry_config)?);
        let resolver = Arc::new(AlunoResolver::new(client.clone(), storage.clone()));

        Ok(Self {
            client,
            storage,
            resolver,
        })
    }

    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.client.clone(), self.resolver.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.client.clone(), self.resolver.clone())
    }

    pub fn diet(&self) -> DietService {
        DietService::new(self.client.clone(), self.resolver.clone())
    }

    pub fn workouts(&self) -> WorkoutService {
        WorkoutService::new(self.client.clone(), self.resolver.clone())
    }

    pub fn progress(&self) -> ProgressService {
        ProgressService::new(self.client.clone(), self.resolver.clone())
    }

    pub fn professional(&self) -> ProfessionalService {
        ProfessionalService::new(self.client.clone(), self.resolver.clone())
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
