use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::not_blank;

/// Row of `workout_programs`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutProgram {
    pub id: String,
    pub aluno_id: String,
    pub nome_programa: String,
    #[serde(default)]
    pub objetivo: Option<String>,
    #[serde(default)]
    pub frequencia_semanal: Option<i32>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default = "default_version")]
    pub version: i32,
    #[serde(default)]
    pub data_inicio: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_version() -> i32 {
    1
}

/// What the user fills in to create a program
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProgramInput {
    #[validate(custom(function = "not_blank", message = "Program name is required"))]
    pub nome_programa: String,

    pub objetivo: Option<String>,

    #[validate(range(min = 1, max = 7, message = "Weekly frequency must be between 1 and 7"))]
    pub frequencia_semanal: i32,
}

/// Insert payload for `workout_programs`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWorkoutProgram {
    pub aluno_id: String,
    pub nome_programa: String,
    pub objetivo: Option<String>,
    pub frequencia_semanal: i32,
    pub is_active: bool,
    pub version: i32,
    pub data_inicio: NaiveDate,
}

impl NewWorkoutProgram {
    /// Fresh, active first version of a program starting on `today`
    pub fn from_input(aluno_id: &str, input: &ProgramInput, today: NaiveDate) -> Self {
        Self {
            aluno_id: aluno_id.to_string(),
            nome_programa: input.nome_programa.trim().to_string(),
            objetivo: input
                .objetivo
                .as_ref()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty()),
            frequencia_semanal: input.frequencia_semanal,
            is_active: true,
            version: 1,
            data_inicio: today,
        }
    }
}

/// Row of `program_workouts`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramWorkout {
    pub id: String,
    pub program_id: String,
    pub nome_treino: String,
    #[serde(default)]
    pub dia_semana: Option<i32>,
    #[serde(default)]
    pub ordem: Option<i32>,
    #[serde(default)]
    pub descricao: Option<String>,
}

/// Row of `workout_exercises`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    pub id: String,
    pub workout_id: String,
    pub nome_exercicio: String,
    #[serde(default)]
    pub series: Option<i32>,
    #[serde(default)]
    pub repeticoes: Option<String>,
    #[serde(default)]
    pub carga_kg: Option<f64>,
    #[serde(default)]
    pub descanso_segundos: Option<i32>,
    #[serde(default)]
    pub ordem: Option<i32>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl WorkoutExercise {
    /// "4x10 @ 30kg" style prescription line
    pub fn prescription(&self) -> String {
        let mut line = match (self.series, &self.repeticoes) {
            (Some(s), Some(r)) => format!("{}x{}", s, r),
            (Some(s), None) => format!("{} sets", s),
            (None, Some(r)) => r.clone(),
            (None, None) => String::from("-"),
        };
        if let Some(carga) = self.carga_kg {
            line.push_str(&format!(" @ {}kg", carga));
        }
        line
    }
}

/// Row of `vw_treino_resumo_semanal`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyTrainingSummary {
    pub aluno_id: String,
    pub semana_inicio: NaiveDate,
    #[serde(default)]
    pub treinos_planejados: i32,
    #[serde(default)]
    pub treinos_concluidos: i32,
    #[serde(default)]
    pub volume_total_kg: Option<f64>,
    #[serde(default)]
    pub minutos_totais: Option<f64>,
}

impl WeeklyTrainingSummary {
    /// Completed over planned, capped at 100%
    pub fn adherence_percentage(&self) -> f64 {
        if self.treinos_planejados <= 0 {
            return 0.0;
        }
        (self.treinos_concluidos as f64 / self.treinos_planejados as f64 * 100.0).min(100.0)
    }
}

/// Body for the `iniciar-plano-de-treino` edge function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlanRequest {
    pub aluno_id: String,
    pub objetivo: Option<String>,
    pub frequencia_semanal: i32,
    pub nivel: Option<String>,
    pub observacoes: Option<String>,
}
