use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sexo {
    Masculino,
    Feminino,
    Outro,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objetivo {
    Emagrecimento,
    Hipertrofia,
    Manutencao,
    Performance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NivelAtividade {
    Sedentario,
    Leve,
    Moderado,
    Intenso,
    MuitoIntenso,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Experiencia {
    Iniciante,
    Intermediario,
    Avancado,
}

impl Sexo {
    pub const ALL: [Sexo; 3] = [Sexo::Masculino, Sexo::Feminino, Sexo::Outro];
}

impl Objetivo {
    pub const ALL: [Objetivo; 4] = [
        Objetivo::Emagrecimento,
        Objetivo::Hipertrofia,
        Objetivo::Manutencao,
        Objetivo::Performance,
    ];
}

impl NivelAtividade {
    pub const ALL: [NivelAtividade; 5] = [
        NivelAtividade::Sedentario,
        NivelAtividade::Leve,
        NivelAtividade::Moderado,
        NivelAtividade::Intenso,
        NivelAtividade::MuitoIntenso,
    ];

    /// Multiplier applied to basal metabolic rate
    pub fn factor(&self) -> f64 {
        match self {
            NivelAtividade::Sedentario => 1.2,
            NivelAtividade::Leve => 1.375,
            NivelAtividade::Moderado => 1.55,
            NivelAtividade::Intenso => 1.725,
            NivelAtividade::MuitoIntenso => 1.9,
        }
    }
}

impl Experiencia {
    pub const ALL: [Experiencia; 3] = [
        Experiencia::Iniciante,
        Experiencia::Intermediario,
        Experiencia::Avancado,
    ];
}

macro_rules! display_as_serde_name {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    let value = serde_json::to_value(self).map_err(|_| fmt::Error)?;
                    write!(f, "{}", value.as_str().unwrap_or_default())
                }
            }
        )*
    };
}

display_as_serde_name!(Sexo, Objetivo, NivelAtividade, Experiencia);

/// Everything the onboarding wizard collects. Fields fill in step by step.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OnboardingData {
    // step 1: personal info
    pub nome: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub sexo: Option<Sexo>,
    // step 2: body measures
    pub altura_cm: Option<f64>,
    pub peso_kg: Option<f64>,
    // step 3
    pub objetivo: Option<Objetivo>,
    // step 4
    pub nivel_atividade: Option<NivelAtividade>,
    // step 5
    #[serde(default)]
    pub restricoes_alimentares: Vec<String>,
    // step 6
    #[serde(default)]
    pub alimentos_preferidos: Vec<String>,
    pub refeicoes_por_dia: Option<u8>,
    // step 7
    pub experiencia_treino: Option<Experiencia>,
    pub frequencia_treino: Option<u8>,
    // step 8
    pub peso_meta_kg: Option<f64>,
}

impl OnboardingData {
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth = self.data_nascimento?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        Some(age)
    }

    /// Daily calorie estimate (Mifflin-St Jeor, activity factor, goal adjustment)
    pub fn estimated_calories(&self, today: NaiveDate) -> Option<f64> {
        let weight = self.peso_kg?;
        let height = self.altura_cm?;
        let age = self.age_on(today)? as f64;

        let base = 10.0 * weight + 6.25 * height - 5.0 * age;
        let bmr = match self.sexo? {
            Sexo::Masculino => base + 5.0,
            Sexo::Feminino => base - 161.0,
            Sexo::Outro => base - 78.0,
        };

        let tdee = bmr * self.nivel_atividade?.factor();
        let adjusted = match self.objetivo? {
            Objetivo::Emagrecimento => tdee - 500.0,
            Objetivo::Hipertrofia => tdee + 300.0,
            Objetivo::Manutencao | Objetivo::Performance => tdee,
        };

        Some(adjusted.round())
    }
}

/// Upsert payload for `alunos`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlunoUpsert {
    pub user_id: String,
    pub nome: String,
    pub data_nascimento: NaiveDate,
    pub sexo: Sexo,
    pub altura_cm: f64,
    pub objetivo: Objetivo,
    pub nivel_atividade: NivelAtividade,
    pub experiencia_treino: Experiencia,
    pub frequencia_treino: u8,
    pub meta_calorias: Option<f64>,
    pub onboarding_completo: bool,
}

/// Upsert payload for `preferencias_alimentares`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodPreferencesUpsert {
    pub aluno_id: String,
    pub restricoes: Vec<String>,
    pub alimentos_preferidos: Vec<String>,
    pub refeicoes_por_dia: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(NivelAtividade::MuitoIntenso.to_string(), "muito_intenso");
        assert_eq!(Objetivo::Manutencao.to_string(), "manutencao");
        assert_eq!(
            serde_json::to_value(Sexo::Feminino).unwrap(),
            serde_json::json!("feminino")
        );
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let data = OnboardingData {
            data_nascimento: NaiveDate::from_ymd_opt(1990, 6, 15),
            ..Default::default()
        };
        assert_eq!(data.age_on(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()), Some(33));
        assert_eq!(data.age_on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), Some(34));
    }

    #[test]
    fn test_estimated_calories() {
        let data = OnboardingData {
            data_nascimento: NaiveDate::from_ymd_opt(1994, 1, 1),
            sexo: Some(Sexo::Masculino),
            altura_cm: Some(180.0),
            peso_kg: Some(80.0),
            objetivo: Some(Objetivo::Manutencao),
            nivel_atividade: Some(NivelAtividade::Sedentario),
            ..Default::default()
        };

        // 10*80 + 6.25*180 - 5*30 + 5 = 1780; * 1.2 = 2136
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(data.estimated_calories(today), Some(2136.0));

        let incomplete = OnboardingData::default();
        assert_eq!(incomplete.estimated_calories(today), None);
    }
}
