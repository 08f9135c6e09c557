use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::today;
use crate::aluno::AlunoResolver;
use crate::charts::metric_delta;
use crate::error::{Result, ZapError};
use crate::models::{
    BodyMetric, BodyMetricInput, ChartPoint, Goal, GoalInput, MetricDelta, NewBodyMetric, NewGoal,
};
use crate::supabase::SupabaseClient;

#[derive(Serialize)]
struct ChartDataArgs<'a> {
    p_aluno_id: &'a str,
    p_days: u32,
}

#[derive(Clone)]
pub struct ProgressService {
    client: Arc<SupabaseClient>,
    resolver: Arc<AlunoResolver>,
}

impl ProgressService {
    pub fn new(client: Arc<SupabaseClient>, resolver: Arc<AlunoResolver>) -> Self {
        Self { client, resolver }
    }

    /// Most recent body-metric samples, newest first
    pub async fn body_metrics(&self, limit: usize) -> Result<Vec<BodyMetric>> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("body_metrics")
            .select("*")
            .eq("aluno_id", &aluno_id)
            .order("data", false)
            .limit(limit)
            .execute()
            .await
    }

    /// Number of samples logged so far
    pub async fn body_metric_count(&self) -> Result<u64> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("body_metrics")
            .eq("aluno_id", &aluno_id)
            .count()
            .await
    }

    pub async fn log_body_metric(&self, input: BodyMetricInput) -> Result<BodyMetric> {
        input.validate()?;

        let aluno_id = self.resolver.get_aluno_id().await?;
        let payload = NewBodyMetric::from_input(&aluno_id, &input, today());

        let mut rows: Vec<BodyMetric> = self.client.from("body_metrics").insert(&payload).await?;
        let metric = rows
            .pop()
            .ok_or_else(|| ZapError::NotFound("Insert returned no metric row".to_string()))?;

        tracing::info!("Logged {} kg for aluno {}", metric.peso_kg, aluno_id);
        Ok(metric)
    }

    /// Change between the two latest samples, `None` with fewer than two
    pub async fn latest_delta(&self) -> Result<Option<MetricDelta>> {
        let samples = self.body_metrics(2).await?;
        Ok(metric_delta(&samples))
    }

    /// Goals of the aluno, open ones first
    pub async fn goals(&self) -> Result<Vec<Goal>> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("goals")
            .select("*")
            .eq("aluno_id", &aluno_id)
            .order("concluido", true)
            .order("data_alvo", true)
            .execute()
            .await
    }

    pub async fn create_goal(&self, input: GoalInput) -> Result<Goal> {
        input.validate()?;

        let aluno_id = self.resolver.get_aluno_id().await?;
        let payload = NewGoal::from_input(&aluno_id, &input);

        let mut rows: Vec<Goal> = self.client.from("goals").insert(&payload).await?;
        let goal = rows
            .pop()
            .ok_or_else(|| ZapError::NotFound("Insert returned no goal row".to_string()))?;

        tracing::info!("Created goal {} for aluno {}", goal.tipo, aluno_id);
        Ok(goal)
    }

    /// Mark a goal as reached
    pub async fn complete_goal(&self, goal_id: &str) -> Result<Goal> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        let mut rows: Vec<Goal> = self
            .client
            .from("goals")
            .eq("id", goal_id)
            .eq("aluno_id", &aluno_id)
            .update(&json!({
                "concluido": true,
                "data_conclusao": today(),
            }))
            .await?;

        rows.pop()
            .ok_or_else(|| ZapError::NotFound(format!("Goal {} not found", goal_id)))
    }

    /// Daily series for the progress charts over the last `days` days
    pub async fn chart_data(&self, days: u32) -> Result<Vec<ChartPoint>> {
        let aluno_id = self.resolver.get_aluno_id().await?;
        let args = ChartDataArgs {
            p_aluno_id: &aluno_id,
            p_days: days,
        };

        let mut points: Vec<ChartPoint> = self.client.rpc("get_aluno_chart_data", &args).await?;
        points.sort_by_key(|p| p.data);
        Ok(points)
    }
}
