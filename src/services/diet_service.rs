use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use super::today;
use crate::aluno::AlunoResolver;
use crate::error::{Result, ZapError};
use crate::models::{
    AiReply, ConsumptionInput, DailyConsumption, DailyNutritionSummary, DietRequest,
    FoodItemTemplate, NewConsumption, WeeklyMacroSummary,
};
use crate::supabase::SupabaseClient;

#[derive(Serialize)]
struct NoArgs {}

#[derive(Clone)]
pub struct DietService {
    client: Arc<SupabaseClient>,
    resolver: Arc<AlunoResolver>,
}

impl DietService {
    pub fn new(client: Arc<SupabaseClient>, resolver: Arc<AlunoResolver>) -> Self {
        Self { client, resolver }
    }

    /// Daily totals for `from <= data < to`, oldest first
    pub async fn daily_summaries(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyNutritionSummary>> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("vw_nutricao_resumo_diario")
            .select("*")
            .eq("aluno_id", &aluno_id)
            .gte("data", from)
            .lt("data", to)
            .order("data", true)
            .execute()
            .await
    }

    /// Totals for a single day, if anything was logged
    pub async fn daily_summary(&self, date: NaiveDate) -> Result<Option<DailyNutritionSummary>> {
        let mut rows = self.daily_summaries(date, date + Duration::days(1)).await?;
        Ok(rows.pop())
    }

    /// Food items logged on `date`
    pub async fn consumption_history(&self, date: NaiveDate) -> Result<Vec<DailyConsumption>> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("daily_consumption_history")
            .select("*")
            .eq("aluno_id", &aluno_id)
            .eq("data", date)
            .order("created_at", true)
            .execute()
            .await
    }

    pub async fn log_consumption(&self, input: ConsumptionInput) -> Result<DailyConsumption> {
        input.validate()?;

        let aluno_id = self.resolver.get_aluno_id().await?;
        let payload = NewConsumption::from_input(&aluno_id, &input, today());

        let mut rows: Vec<DailyConsumption> = self
            .client
            .from("daily_consumption_history")
            .insert(&payload)
            .await?;

        let row = rows.pop().ok_or_else(|| {
            ZapError::NotFound("Insert returned no consumption row".to_string())
        })?;

        tracing::info!(
            "Logged {} ({} kcal) for aluno {}",
            row.alimento,
            row.calorias,
            aluno_id
        );
        Ok(row)
    }

    pub async fn food_templates(&self) -> Result<Vec<FoodItemTemplate>> {
        self.client.rpc("get_food_items_template", &NoArgs {}).await
    }

    /// Ask the diet generator to build a complete plan
    pub async fn generate_diet(
        &self,
        preferencias: Option<String>,
        restricoes: Option<String>,
        refeicoes_por_dia: Option<u8>,
    ) -> Result<AiReply> {
        let aluno_id = self.resolver.get_aluno_id().await?;
        let request = DietRequest {
            aluno_id,
            preferencias,
            restricoes,
            refeicoes_por_dia,
        };

        tracing::info!("Requesting diet generation for aluno {}", request.aluno_id);
        self.client.invoke("criar-dieta-completa", &request).await
    }

    /// Seven days from `week_start`, zero-filled where nothing was logged
    pub async fn weekly_macros(&self, week_start: NaiveDate) -> Result<WeeklyMacroSummary> {
        let aluno_id = self.resolver.get_aluno_id().await?;
        let rows = self
            .daily_summaries(week_start, week_start + Duration::days(7))
            .await?;

        Ok(WeeklyMacroSummary::from_days(&aluno_id, week_start, &rows))
    }
}
