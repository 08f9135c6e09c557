use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role string stored per auth user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Aluno,
    Profissional,
}

impl UserRole {
    /// Lenient parse of the stored role string; anything unknown is a student
    pub fn from_role_str(role: &str) -> Self {
        match role.trim().to_lowercase().as_str() {
            "profissional" | "professional" | "nutricionista" | "personal" => {
                UserRole::Profissional
            }
            _ => UserRole::Aluno,
        }
    }

    /// Landing route after login
    pub fn home_route(&self) -> &'static str {
        match self {
            UserRole::Aluno => "/aluno/dashboard",
            UserRole::Profissional => "/profissional/dashboard",
        }
    }

    pub fn is_professional(&self) -> bool {
        matches!(self, UserRole::Profissional)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Aluno => write!(f, "aluno"),
            UserRole::Profissional => write!(f, "profissional"),
        }
    }
}

impl FromStr for UserRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_role_str(s))
    }
}

/// Row of the `profiles` table as far as routing is concerned
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRow {
    #[serde(default)]
    pub role: Option<String>,
}

/// Row of the `alunos` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aluno {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Id-only projection used for aluno resolution
#[derive(Debug, Clone, Deserialize)]
pub struct AlunoId {
    pub id: String,
}

/// Row of `vw_perfil_completo_aluno`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PerfilCompletoAluno {
    pub aluno_id: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub idade: Option<i32>,
    #[serde(default)]
    pub sexo: Option<String>,
    #[serde(default)]
    pub altura_cm: Option<f64>,
    #[serde(default)]
    pub peso_atual_kg: Option<f64>,
    #[serde(default)]
    pub peso_meta_kg: Option<f64>,
    #[serde(default)]
    pub objetivo: Option<String>,
    #[serde(default)]
    pub nivel_atividade: Option<String>,
    #[serde(default)]
    pub meta_calorias: Option<f64>,
    #[serde(default)]
    pub meta_proteinas: Option<f64>,
    #[serde(default)]
    pub meta_carboidratos: Option<f64>,
    #[serde(default)]
    pub meta_gorduras: Option<f64>,
}

impl PerfilCompletoAluno {
    /// Body-mass index from height and current weight
    pub fn imc(&self) -> Option<f64> {
        let height_m = self.altura_cm? / 100.0;
        let weight = self.peso_atual_kg?;
        if height_m <= 0.0 {
            return None;
        }
        Some(weight / (height_m * height_m))
    }

    /// Kilograms left to the target weight (negative when above target)
    pub fn kg_to_goal(&self) -> Option<f64> {
        Some(self.peso_meta_kg? - self.peso_atual_kg?)
    }
}

/// Who is using the app right now
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub aluno_id: Option<String>,
    pub impersonating: bool,
}
