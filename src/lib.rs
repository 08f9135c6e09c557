//! ZapNutri client library: typed access to the ZapNutri Supabase backend
//! (auth, tables, views, RPCs, Edge Functions) plus the client-side state
//! the app keeps locally.

pub mod aluno;
pub mod charts;
pub mod config;
pub mod error;
pub mod impersonation;
pub mod models;
pub mod onboarding;
pub mod services;
pub mod storage;
pub mod supabase;

pub use aluno::AlunoResolver;
pub use config::Config;
pub use error::{Result, ZapError};
pub use impersonation::{Impersonation, ImpersonationState};
pub use onboarding::{OnboardingStep, OnboardingWizard};
pub use services::ZapNutri;
pub use storage::Storage;
pub use supabase::{ApiError, AuthEvent, RetryConfig, SupabaseClient};
