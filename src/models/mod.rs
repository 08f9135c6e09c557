// Transit DTOs mirroring table, view and RPC rows

pub mod aluno;
pub mod instructions;
pub mod nutrition;
pub mod onboarding;
pub mod progress;
pub mod roster;
pub mod validation;
pub mod workout;

pub use aluno::*;
pub use instructions::*;
pub use nutrition::*;
pub use onboarding::*;
pub use progress::*;
pub use roster::*;
pub use workout::*;
