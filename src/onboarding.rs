//! Nine-step onboarding wizard for new students.

use chrono::NaiveDate;
use std::fmt;

use crate::aluno::AlunoResolver;
use crate::error::{Result, ZapError};
use crate::models::{
    Aluno, AlunoUpsert, FoodPreferencesUpsert, NewBodyMetric, NewGoal, OnboardingData,
};
use crate::supabase::SupabaseClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OnboardingStep {
    PersonalInfo = 1,
    BodyMeasures,
    Goal,
    ActivityLevel,
    Restrictions,
    Preferences,
    Training,
    TargetWeight,
    Review,
}

impl OnboardingStep {
    pub const COUNT: u8 = 9;

    pub const ALL: [OnboardingStep; 9] = [
        OnboardingStep::PersonalInfo,
        OnboardingStep::BodyMeasures,
        OnboardingStep::Goal,
        OnboardingStep::ActivityLevel,
        OnboardingStep::Restrictions,
        OnboardingStep::Preferences,
        OnboardingStep::Training,
        OnboardingStep::TargetWeight,
        OnboardingStep::Review,
    ];

    /// 1-based position
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            OnboardingStep::PersonalInfo => "Dados pessoais",
            OnboardingStep::BodyMeasures => "Medidas corporais",
            OnboardingStep::Goal => "Objetivo",
            OnboardingStep::ActivityLevel => "Nível de atividade",
            OnboardingStep::Restrictions => "Restrições alimentares",
            OnboardingStep::Preferences => "Preferências e refeições",
            OnboardingStep::Training => "Experiência de treino",
            OnboardingStep::TargetWeight => "Peso meta",
            OnboardingStep::Review => "Revisão",
        }
    }

    fn next(&self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(OnboardingStep::Review)
    }

    fn previous(&self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(OnboardingStep::PersonalInfo)
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.number(), Self::COUNT, self.title())
    }
}

/// Writes issued by `submit`, in order
pub const WRITE_ALUNOS: &str = "alunos";
pub const WRITE_BODY_METRICS: &str = "body_metrics";
pub const WRITE_GOALS: &str = "goals";
pub const WRITE_PREFERENCES: &str = "preferencias_alimentares";

/// Linear wizard state
#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    step: OnboardingStep,
    data: OnboardingData,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self::with_data(OnboardingData::default())
    }

    pub fn with_data(data: OnboardingData) -> Self {
        Self {
            step: OnboardingStep::PersonalInfo,
            data,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn data(&self) -> &OnboardingData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut OnboardingData {
        &mut self.data
    }

    pub fn is_review(&self) -> bool {
        self.step == OnboardingStep::Review
    }

    /// Validate the current step and move forward. Stays on the review step.
    pub fn advance(&mut self) -> Result<OnboardingStep> {
        validate_step(self.step, &self.data)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Move one step back, never before the first
    pub fn back(&mut self) -> OnboardingStep {
        self.step = self.step.previous();
        self.step
    }

    /// Every step before review passes validation
    pub fn validate_all(&self) -> Result<()> {
        OnboardingStep::ALL
            .iter()
            .filter(|step| **step != OnboardingStep::Review)
            .try_for_each(|step| validate_step(*step, &self.data))
    }

    /// Write the collected data. Only allowed on the review step.
    ///
    /// Writes run in order and stop at the first failure, which is reported
    /// as `ZapError::Onboarding` with the writes that already went through.
    /// Nothing is rolled back. Returns the new aluno id.
    pub async fn submit(
        &self,
        client: &SupabaseClient,
        resolver: &AlunoResolver,
        today: NaiveDate,
    ) -> Result<String> {
        if !self.is_review() {
            return Err(ZapError::Validation(format!(
                "Onboarding can only be submitted from the review step (currently on {})",
                self.step
            )));
        }
        self.validate_all()?;

        let user_id = client.require_user_id()?;
        let aluno = self.aluno_upsert(&user_id, today)?;
        let mut completed: Vec<&'static str> = Vec::new();

        let fail = |step: &'static str, completed: &[&'static str], source: ZapError| {
            tracing::error!("Onboarding write {} failed: {}", step, source);
            ZapError::Onboarding {
                step,
                completed: completed.to_vec(),
                source: Box::new(source),
            }
        };

        let aluno_id = match client
            .from("alunos")
            .upsert::<_, Aluno>(&aluno, "user_id")
            .await
        {
            Ok(mut rows) => match rows.pop() {
                Some(row) => row.id,
                None => {
                    let missing = ZapError::NotFound("Upsert returned no aluno row".to_string());
                    return Err(fail(WRITE_ALUNOS, &completed, missing));
                }
            },
            Err(e) => return Err(fail(WRITE_ALUNOS, &completed, e)),
        };
        completed.push(WRITE_ALUNOS);

        let peso_kg = self.data.peso_kg.unwrap_or_default();
        let metric = NewBodyMetric {
            aluno_id: aluno_id.clone(),
            data: today,
            peso_kg,
            percentual_gordura: None,
            cintura_cm: None,
            massa_muscular_kg: None,
        };
        if let Err(e) = client
            .from("body_metrics")
            .insert::<_, serde_json::Value>(&metric)
            .await
        {
            return Err(fail(WRITE_BODY_METRICS, &completed, e));
        }
        completed.push(WRITE_BODY_METRICS);

        let goal = NewGoal {
            aluno_id: aluno_id.clone(),
            tipo: "peso".to_string(),
            descricao: self.data.objetivo.map(|o| o.to_string()),
            valor_inicial: Some(peso_kg),
            valor_alvo: self.data.peso_meta_kg,
            valor_atual: Some(peso_kg),
            data_alvo: None,
            concluido: false,
        };
        if let Err(e) = client.from("goals").insert::<_, serde_json::Value>(&goal).await {
            return Err(fail(WRITE_GOALS, &completed, e));
        }
        completed.push(WRITE_GOALS);

        let preferences = FoodPreferencesUpsert {
            aluno_id: aluno_id.clone(),
            restricoes: self.data.restricoes_alimentares.clone(),
            alimentos_preferidos: self.data.alimentos_preferidos.clone(),
            refeicoes_por_dia: self.data.refeicoes_por_dia.unwrap_or(3),
        };
        if let Err(e) = client
            .from("preferencias_alimentares")
            .upsert::<_, serde_json::Value>(&preferences, "aluno_id")
            .await
        {
            return Err(fail(WRITE_PREFERENCES, &completed, e));
        }

        resolver.remember(&aluno_id)?;
        tracing::info!("Onboarding complete for aluno {}", aluno_id);
        Ok(aluno_id)
    }

    fn aluno_upsert(&self, user_id: &str, today: NaiveDate) -> Result<AlunoUpsert> {
        let missing = |field: &str| ZapError::Validation(format!("{} is required", field));
        let data = &self.data;

        Ok(AlunoUpsert {
            user_id: user_id.to_string(),
            nome: data
                .nome
                .as_deref()
                .map(str::trim)
                .ok_or_else(|| missing("Name"))?
                .to_string(),
            data_nascimento: data.data_nascimento.ok_or_else(|| missing("Birth date"))?,
            sexo: data.sexo.ok_or_else(|| missing("Sex"))?,
            altura_cm: data.altura_cm.ok_or_else(|| missing("Height"))?,
            objetivo: data.objetivo.ok_or_else(|| missing("Goal"))?,
            nivel_atividade: data.nivel_atividade.ok_or_else(|| missing("Activity level"))?,
            experiencia_treino: data
                .experiencia_treino
                .ok_or_else(|| missing("Training experience"))?,
            frequencia_treino: data
                .frequencia_treino
                .ok_or_else(|| missing("Training frequency"))?,
            meta_calorias: data.estimated_calories(today),
            onboarding_completo: true,
        })
    }
}

/// Check the fields a step collects
pub fn validate_step(step: OnboardingStep, data: &OnboardingData) -> Result<()> {
    let invalid = |message: &str| Err(ZapError::Validation(message.to_string()));

    match step {
        OnboardingStep::PersonalInfo => {
            if data.nome.as_deref().map_or(true, |n| n.trim().is_empty()) {
                return invalid("Name is required");
            }
            if data.data_nascimento.is_none() {
                return invalid("Birth date is required");
            }
            if data.sexo.is_none() {
                return invalid("Sex is required");
            }
        }
        OnboardingStep::BodyMeasures => {
            match data.altura_cm {
                Some(h) if (50.0..=272.0).contains(&h) => {}
                _ => return invalid("Height must be between 50 and 272 cm"),
            }
            match data.peso_kg {
                Some(w) if w > 0.0 && w <= 500.0 => {}
                _ => return invalid("Weight must be between 0 and 500 kg"),
            }
        }
        OnboardingStep::Goal => {
            if data.objetivo.is_none() {
                return invalid("Choose a goal");
            }
        }
        OnboardingStep::ActivityLevel => {
            if data.nivel_atividade.is_none() {
                return invalid("Choose an activity level");
            }
        }
        OnboardingStep::Restrictions => {}
        OnboardingStep::Preferences => match data.refeicoes_por_dia {
            Some(n) if (1..=8).contains(&n) => {}
            _ => return invalid("Meals per day must be between 1 and 8"),
        },
        OnboardingStep::Training => {
            if data.experiencia_treino.is_none() {
                return invalid("Choose a training experience");
            }
            match data.frequencia_treino {
                Some(n) if (1..=7).contains(&n) => {}
                _ => return invalid("Weekly frequency must be between 1 and 7"),
            }
        }
        OnboardingStep::TargetWeight => match data.peso_meta_kg {
            Some(w) if w > 0.0 && w <= 500.0 => {}
            _ => return invalid("Target weight must be between 0 and 500 kg"),
        },
        OnboardingStep::Review => {}
    }

    Ok(())
}
