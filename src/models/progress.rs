use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{finite, not_blank};

/// Row of `body_metrics`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyMetric {
    pub id: String,
    pub aluno_id: String,
    pub data: NaiveDate,
    pub peso_kg: f64,
    #[serde(default)]
    pub percentual_gordura: Option<f64>,
    #[serde(default)]
    pub cintura_cm: Option<f64>,
    #[serde(default)]
    pub massa_muscular_kg: Option<f64>,
}

/// What the user logs for a body-metric sample
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BodyMetricInput {
    pub data: Option<NaiveDate>,

    #[validate(range(exclusive_min = 0.0, max = 500.0, message = "Weight must be between 0 and 500 kg"))]
    pub peso_kg: f64,

    #[validate(
        range(min = 0.0, max = 100.0, message = "Body fat must be between 0 and 100%"),
        custom(function = "finite", message = "Body fat must be a number")
    )]
    pub percentual_gordura: Option<f64>,

    #[validate(range(exclusive_min = 0.0, message = "Waist must be positive"))]
    pub cintura_cm: Option<f64>,

    #[validate(range(exclusive_min = 0.0, message = "Muscle mass must be positive"))]
    pub massa_muscular_kg: Option<f64>,
}

/// Insert payload for `body_metrics`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBodyMetric {
    pub aluno_id: String,
    pub data: NaiveDate,
    pub peso_kg: f64,
    pub percentual_gordura: Option<f64>,
    pub cintura_cm: Option<f64>,
    pub massa_muscular_kg: Option<f64>,
}

impl NewBodyMetric {
    pub fn from_input(aluno_id: &str, input: &BodyMetricInput, today: NaiveDate) -> Self {
        Self {
            aluno_id: aluno_id.to_string(),
            data: input.data.unwrap_or(today),
            peso_kg: input.peso_kg,
            percentual_gordura: input.percentual_gordura,
            cintura_cm: input.cintura_cm,
            massa_muscular_kg: input.massa_muscular_kg,
        }
    }
}

/// Change between the two most recent samples
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDelta {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub peso_kg: f64,
    pub percentual_gordura: Option<f64>,
    pub cintura_cm: Option<f64>,
}

impl MetricDelta {
    pub fn days_between(&self) -> i64 {
        (self.to - self.from).num_days()
    }
}

/// Row of `goals`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    pub aluno_id: String,
    pub tipo: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub valor_inicial: Option<f64>,
    #[serde(default)]
    pub valor_alvo: Option<f64>,
    #[serde(default)]
    pub valor_atual: Option<f64>,
    #[serde(default)]
    pub data_alvo: Option<NaiveDate>,
    #[serde(default)]
    pub concluido: bool,
}

impl Goal {
    /// Progress from start to target, in percent, capped at 100.
    /// Works for both decreasing (weight loss) and increasing targets.
    pub fn progress_percentage(&self) -> f64 {
        let (Some(start), Some(target), Some(current)) =
            (self.valor_inicial, self.valor_alvo, self.valor_atual)
        else {
            return 0.0;
        };

        let span = target - start;
        if span == 0.0 {
            return if current == target { 100.0 } else { 0.0 };
        }

        ((current - start) / span * 100.0).clamp(0.0, 100.0)
    }

    /// Days remaining until the target date
    pub fn days_remaining(&self) -> Option<i64> {
        self.data_alvo
            .map(|date| (date - Utc::now().date_naive()).num_days())
    }
}

/// What the user fills in to create a goal
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GoalInput {
    #[validate(custom(function = "not_blank", message = "Goal type is required"))]
    pub tipo: String,
    pub descricao: Option<String>,
    #[validate(custom(function = "finite", message = "Start value must be a number"))]
    pub valor_inicial: Option<f64>,
    #[validate(custom(function = "finite", message = "Target value must be a number"))]
    pub valor_alvo: Option<f64>,
    pub data_alvo: Option<NaiveDate>,
}

/// Insert payload for `goals`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGoal {
    pub aluno_id: String,
    pub tipo: String,
    pub descricao: Option<String>,
    pub valor_inicial: Option<f64>,
    pub valor_alvo: Option<f64>,
    pub valor_atual: Option<f64>,
    pub data_alvo: Option<NaiveDate>,
    pub concluido: bool,
}

impl NewGoal {
    pub fn from_input(aluno_id: &str, input: &GoalInput) -> Self {
        Self {
            aluno_id: aluno_id.to_string(),
            tipo: input.tipo.trim().to_string(),
            descricao: input.descricao.clone(),
            valor_inicial: input.valor_inicial,
            valor_alvo: input.valor_alvo,
            valor_atual: input.valor_inicial,
            data_alvo: input.data_alvo,
            concluido: false,
        }
    }
}

/// Row returned by the `get_aluno_chart_data` RPC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub data: NaiveDate,
    #[serde(default)]
    pub peso: Option<f64>,
    #[serde(default)]
    pub calorias: Option<f64>,
    #[serde(default)]
    pub proteinas: Option<f64>,
    #[serde(default)]
    pub treinos: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(start: f64, target: f64, current: f64) -> Goal {
        Goal {
            id: "g1".to_string(),
            aluno_id: "a1".to_string(),
            tipo: "peso".to_string(),
            descricao: None,
            valor_inicial: Some(start),
            valor_alvo: Some(target),
            valor_atual: Some(current),
            data_alvo: None,
            concluido: false,
        }
    }

    #[test]
    fn test_goal_progress_decreasing_target() {
        assert_eq!(goal(90.0, 80.0, 85.0).progress_percentage(), 50.0);
        assert_eq!(goal(90.0, 80.0, 78.0).progress_percentage(), 100.0);
        assert_eq!(goal(90.0, 80.0, 92.0).progress_percentage(), 0.0);
    }

    #[test]
    fn test_goal_progress_increasing_target() {
        assert_eq!(goal(60.0, 70.0, 62.5).progress_percentage(), 25.0);
    }

    #[test]
    fn test_goal_without_values() {
        let mut g = goal(1.0, 2.0, 1.5);
        g.valor_atual = None;
        assert_eq!(g.progress_percentage(), 0.0);
        assert_eq!(g.days_remaining(), None);
    }

    #[test]
    fn test_body_metric_validation() {
        let mut input = BodyMetricInput {
            data: None,
            peso_kg: 80.0,
            percentual_gordura: Some(18.5),
            cintura_cm: None,
            massa_muscular_kg: None,
        };
        assert!(input.validate().is_ok());

        input.peso_kg = 0.0;
        assert!(input.validate().is_err());

        input.peso_kg = 80.0;
        input.percentual_gordura = Some(120.0);
        assert!(input.validate().is_err());

        input.percentual_gordura = Some(f64::NAN);
        let err = crate::ZapError::from(input.validate().unwrap_err());
        assert!(err.to_string().contains("Body fat must be a number"));

        input.percentual_gordura = None;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_goal_values_must_be_numbers() {
        let mut input = GoalInput {
            tipo: "peso".to_string(),
            descricao: None,
            valor_inicial: Some(90.0),
            valor_alvo: Some(80.0),
            data_alvo: None,
        };
        assert!(input.validate().is_ok());

        input.valor_alvo = Some(f64::NAN);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_metric_delta_days() {
        let delta = MetricDelta {
            from: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            peso_kg: -1.2,
            percentual_gordura: None,
            cintura_cm: None,
        };
        assert_eq!(delta.days_between(), 14);
    }
}
