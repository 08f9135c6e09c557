use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{finite, not_blank};

/// Row of `vw_nutricao_resumo_diario`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DailyNutritionSummary {
    pub aluno_id: String,
    pub data: NaiveDate,
    #[serde(default)]
    pub calorias_consumidas: f64,
    #[serde(default)]
    pub proteinas_consumidas: f64,
    #[serde(default)]
    pub carboidratos_consumidos: f64,
    #[serde(default)]
    pub gorduras_consumidas: f64,
    #[serde(default)]
    pub meta_calorias: Option<f64>,
    #[serde(default)]
    pub meta_proteinas: Option<f64>,
    #[serde(default)]
    pub meta_carboidratos: Option<f64>,
    #[serde(default)]
    pub meta_gorduras: Option<f64>,
}

impl DailyNutritionSummary {
    /// Zero-consumption day used to fill gaps in a week
    pub fn empty(aluno_id: &str, data: NaiveDate) -> Self {
        Self {
            aluno_id: aluno_id.to_string(),
            data,
            ..Default::default()
        }
    }

    /// Calories consumed against the target, if one is set
    pub fn calorie_progress(&self) -> Option<f64> {
        match self.meta_calorias {
            Some(meta) if meta > 0.0 => Some(self.calorias_consumidas / meta * 100.0),
            _ => None,
        }
    }

    /// Calories still available today (negative when over)
    pub fn calories_remaining(&self) -> Option<f64> {
        self.meta_calorias.map(|meta| meta - self.calorias_consumidas)
    }
}

/// Row of `daily_consumption_history`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyConsumption {
    pub id: String,
    pub aluno_id: String,
    pub data: NaiveDate,
    #[serde(default)]
    pub refeicao: Option<String>,
    pub alimento: String,
    #[serde(default)]
    pub quantidade_g: f64,
    #[serde(default)]
    pub calorias: f64,
    #[serde(default)]
    pub proteinas: f64,
    #[serde(default)]
    pub carboidratos: f64,
    #[serde(default)]
    pub gorduras: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// What the user logs for one food item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConsumptionInput {
    pub data: Option<NaiveDate>,
    pub refeicao: Option<String>,

    #[validate(custom(function = "not_blank", message = "Food name is required"))]
    pub alimento: String,

    #[validate(
        range(min = 0.0, message = "Quantity cannot be negative"),
        custom(function = "finite", message = "Quantity must be a number")
    )]
    pub quantidade_g: f64,

    #[validate(
        range(min = 0.0, message = "Calories cannot be negative"),
        custom(function = "finite", message = "Calories must be a number")
    )]
    pub calorias: f64,

    #[validate(
        range(min = 0.0, message = "Protein cannot be negative"),
        custom(function = "finite", message = "Protein must be a number")
    )]
    pub proteinas: f64,

    #[validate(
        range(min = 0.0, message = "Carbohydrates cannot be negative"),
        custom(function = "finite", message = "Carbohydrates must be a number")
    )]
    pub carboidratos: f64,

    #[validate(
        range(min = 0.0, message = "Fat cannot be negative"),
        custom(function = "finite", message = "Fat must be a number")
    )]
    pub gorduras: f64,
}

/// Insert payload for `daily_consumption_history`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewConsumption {
    pub aluno_id: String,
    pub data: NaiveDate,
    pub refeicao: Option<String>,
    pub alimento: String,
    pub quantidade_g: f64,
    pub calorias: f64,
    pub proteinas: f64,
    pub carboidratos: f64,
    pub gorduras: f64,
}

impl NewConsumption {
    pub fn from_input(aluno_id: &str, input: &ConsumptionInput, today: NaiveDate) -> Self {
        Self {
            aluno_id: aluno_id.to_string(),
            data: input.data.unwrap_or(today),
            refeicao: input.refeicao.clone(),
            alimento: input.alimento.trim().to_string(),
            quantidade_g: input.quantidade_g,
            calorias: input.calorias,
            proteinas: input.proteinas,
            carboidratos: input.carboidratos,
            gorduras: input.gorduras,
        }
    }
}

/// Row returned by the `get_food_items_template` RPC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodItemTemplate {
    #[serde(default)]
    pub id: Option<String>,
    pub nome: String,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default = "default_portion")]
    pub porcao_g: f64,
    #[serde(default)]
    pub calorias: f64,
    #[serde(default)]
    pub proteinas: f64,
    #[serde(default)]
    pub carboidratos: f64,
    #[serde(default)]
    pub gorduras: f64,
}

fn default_portion() -> f64 {
    100.0
}

impl FoodItemTemplate {
    /// Scale the template's macros to `grams`
    pub fn to_input(&self, grams: f64, refeicao: Option<String>) -> ConsumptionInput {
        let factor = if self.porcao_g > 0.0 {
            grams / self.porcao_g
        } else {
            0.0
        };

        ConsumptionInput {
            data: None,
            refeicao,
            alimento: self.nome.clone(),
            quantidade_g: grams,
            calorias: self.calorias * factor,
            proteinas: self.proteinas * factor,
            carboidratos: self.carboidratos * factor,
            gorduras: self.gorduras * factor,
        }
    }
}

/// Seven days of nutrition starting on `week_start`, gaps filled with zeros
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyMacroSummary {
    pub week_start: NaiveDate,
    pub days: Vec<DailyNutritionSummary>,
    pub total_calorias: f64,
    pub total_proteinas: f64,
    pub total_carboidratos: f64,
    pub total_gorduras: f64,
    pub days_logged: usize,
}

impl WeeklyMacroSummary {
    pub fn from_days(aluno_id: &str, week_start: NaiveDate, rows: &[DailyNutritionSummary]) -> Self {
        let days: Vec<DailyNutritionSummary> = (0..7)
            .map(|offset| {
                let date = week_start + Duration::days(offset);
                rows.iter()
                    .find(|row| row.data == date)
                    .cloned()
                    .unwrap_or_else(|| DailyNutritionSummary::empty(aluno_id, date))
            })
            .collect();

        let days_logged = days.iter().filter(|d| d.calorias_consumidas > 0.0).count();

        Self {
            week_start,
            total_calorias: days.iter().map(|d| d.calorias_consumidas).sum(),
            total_proteinas: days.iter().map(|d| d.proteinas_consumidas).sum(),
            total_carboidratos: days.iter().map(|d| d.carboidratos_consumidos).sum(),
            total_gorduras: days.iter().map(|d| d.gorduras_consumidas).sum(),
            days_logged,
            days,
        }
    }

    /// Average calories over the days that have any logging
    pub fn average_calories(&self) -> f64 {
        if self.days_logged == 0 {
            return 0.0;
        }
        self.total_calorias / self.days_logged as f64
    }
}

/// Body for the `criar-dieta-completa` edge function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietRequest {
    pub aluno_id: String,
    pub preferencias: Option<String>,
    pub restricoes: Option<String>,
    pub refeicoes_por_dia: Option<u8>,
}
