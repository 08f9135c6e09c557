use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::aluno::AlunoResolver;
use crate::charts::week_start;
use crate::error::Result;
use crate::models::{DailyNutritionSummary, PerfilCompletoAluno, WeeklyTrainingSummary};
use crate::supabase::SupabaseClient;

/// Everything the student dashboard shows at once. Each card is optional;
/// a missing row renders as an empty card.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardData {
    pub aluno_id: String,
    pub date: Option<NaiveDate>,
    pub profile: Option<PerfilCompletoAluno>,
    pub nutrition: Option<DailyNutritionSummary>,
    pub training: Option<WeeklyTrainingSummary>,
}

#[derive(Clone)]
pub struct DashboardService {
    client: Arc<SupabaseClient>,
    resolver: Arc<AlunoResolver>,
}

impl DashboardService {
    pub fn new(client: Arc<SupabaseClient>, resolver: Arc<AlunoResolver>) -> Self {
        Self { client, resolver }
    }

    /// Load the dashboard for `date`. The three reads run concurrently.
    pub async fn load(&self, date: NaiveDate) -> Result<DashboardData> {
        let aluno_id = self.resolver.get_aluno_id().await?;
        let monday = week_start(date);

        tracing::debug!("Loading dashboard for aluno {} on {}", aluno_id, date);

        let (profile, nutrition, training) = tokio::join!(
            self.client
                .from("vw_perfil_completo_aluno")
                .select("*")
                .eq("aluno_id", &aluno_id)
                .maybe_single::<PerfilCompletoAluno>(),
            self.client
                .from("vw_nutricao_resumo_diario")
                .select("*")
                .eq("aluno_id", &aluno_id)
                .eq("data", date)
                .maybe_single::<DailyNutritionSummary>(),
            self.client
                .from("vw_treino_resumo_semanal")
                .select("*")
                .eq("aluno_id", &aluno_id)
                .eq("semana_inicio", monday)
                .maybe_single::<WeeklyTrainingSummary>(),
        );

        Ok(DashboardData {
            aluno_id,
            date: Some(date),
            profile: profile?,
            nutrition: nutrition?,
            training: training?,
        })
    }
}
