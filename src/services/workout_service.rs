use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::today;
use crate::aluno::AlunoResolver;
use crate::charts::week_start;
use crate::error::{Result, ZapError};
use crate::models::{
    AiReply, NewWorkoutProgram, ProgramInput, ProgramWorkout, TrainingPlanRequest,
    WeeklyTrainingSummary, WorkoutExercise, WorkoutProgram,
};
use crate::supabase::SupabaseClient;

#[derive(Clone)]
pub struct WorkoutService {
    client: Arc<SupabaseClient>,
    resolver: Arc<AlunoResolver>,
}

impl WorkoutService {
    pub fn new(client: Arc<SupabaseClient>, resolver: Arc<AlunoResolver>) -> Self {
        Self { client, resolver }
    }

    /// All programs of the aluno, newest first
    pub async fn list_programs(&self) -> Result<Vec<WorkoutProgram>> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("workout_programs")
            .select("*")
            .eq("aluno_id", &aluno_id)
            .order("created_at", false)
            .execute()
            .await
    }

    pub async fn get_program(&self, program_id: &str) -> Result<WorkoutProgram> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("workout_programs")
            .select("*")
            .eq("id", program_id)
            .eq("aluno_id", &aluno_id)
            .maybe_single()
            .await?
            .ok_or_else(|| ZapError::NotFound(format!("Program {} not found", program_id)))
    }

    /// Create a new active program. Input is validated before anything is
    /// sent; the new row is inserted before the previous programs are
    /// deactivated, so the aluno always has an active program.
    pub async fn create_program(&self, input: ProgramInput) -> Result<WorkoutProgram> {
        input.validate()?;

        let aluno_id = self.resolver.get_aluno_id().await?;
        let payload = NewWorkoutProgram::from_input(&aluno_id, &input, today());

        let mut rows: Vec<WorkoutProgram> = self
            .client
            .from("workout_programs")
            .insert(&payload)
            .await?;

        let program = rows
            .pop()
            .ok_or_else(|| ZapError::NotFound("Insert returned no program row".to_string()))?;

        let deactivated: Vec<WorkoutProgram> = self
            .client
            .from("workout_programs")
            .eq("aluno_id", &aluno_id)
            .eq("is_active", true)
            .neq("id", &program.id)
            .update(&json!({ "is_active": false }))
            .await?;
        if !deactivated.is_empty() {
            tracing::debug!("Deactivated {} previous programs", deactivated.len());
        }

        tracing::info!("Created program {} ({})", program.nome_programa, program.id);
        Ok(program)
    }

    /// Activate or deactivate a program. Activating one deactivates the rest.
    pub async fn set_active(&self, program_id: &str, active: bool) -> Result<WorkoutProgram> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        if active {
            let _: Vec<WorkoutProgram> = self
                .client
                .from("workout_programs")
                .eq("aluno_id", &aluno_id)
                .eq("is_active", true)
                .neq("id", program_id)
                .update(&json!({ "is_active": false }))
                .await?;
        }

        let mut rows: Vec<WorkoutProgram> = self
            .client
            .from("workout_programs")
            .eq("id", program_id)
            .eq("aluno_id", &aluno_id)
            .update(&json!({ "is_active": active }))
            .await?;

        rows.pop()
            .ok_or_else(|| ZapError::NotFound(format!("Program {} not found", program_id)))
    }

    pub async fn delete_program(&self, program_id: &str) -> Result<()> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        let deleted: Vec<WorkoutProgram> = self
            .client
            .from("workout_programs")
            .eq("id", program_id)
            .eq("aluno_id", &aluno_id)
            .delete()
            .await?;

        if deleted.is_empty() {
            return Err(ZapError::NotFound(format!(
                "Program {} not found",
                program_id
            )));
        }

        tracing::info!("Deleted program {}", program_id);
        Ok(())
    }

    pub async fn program_workouts(&self, program_id: &str) -> Result<Vec<ProgramWorkout>> {
        self.client
            .from("program_workouts")
            .select("*")
            .eq("program_id", program_id)
            .order("ordem", true)
            .execute()
            .await
    }

    pub async fn workout_exercises(&self, workout_id: &str) -> Result<Vec<WorkoutExercise>> {
        self.client
            .from("workout_exercises")
            .select("*")
            .eq("workout_id", workout_id)
            .order("ordem", true)
            .execute()
            .await
    }

    /// Training summary for the current week
    pub async fn weekly_summary(&self) -> Result<Option<WeeklyTrainingSummary>> {
        let aluno_id = self.resolver.get_aluno_id().await?;

        self.client
            .from("vw_treino_resumo_semanal")
            .select("*")
            .eq("aluno_id", &aluno_id)
            .eq("semana_inicio", week_start(today()))
            .maybe_single()
            .await
    }

    /// Ask the plan generator for a new training plan
    pub async fn generate_plan(
        &self,
        frequencia_semanal: i32,
        objetivo: Option<String>,
        nivel: Option<String>,
        observacoes: Option<String>,
    ) -> Result<AiReply> {
        if !(1..=7).contains(&frequencia_semanal) {
            return Err(ZapError::Validation(
                "Weekly frequency must be between 1 and 7".to_string(),
            ));
        }

        let aluno_id = self.resolver.get_aluno_id().await?;
        let request = TrainingPlanRequest {
            aluno_id,
            objetivo,
            frequencia_semanal,
            nivel,
            observacoes,
        };

        tracing::info!("Requesting training plan for aluno {}", request.aluno_id);
        self.client.invoke("iniciar-plano-de-treino", &request).await
    }
}
