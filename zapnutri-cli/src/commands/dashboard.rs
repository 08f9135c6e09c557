use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;
use crate::output;
use crate::ui::{App, Dashboard};

#[derive(Args)]
pub struct DashboardCommand {}

impl DashboardCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let app = ctx.connect_authenticated()?;

        loop {
            let state = output::with_spinner("Loading dashboard...", App::load(&app))
                .await
                .context("Failed to load dashboard")?;

            let chosen = Dashboard::new(state)?.run()?;

            // Picking a student from the roster reopens the dashboard as them
            match chosen {
                Some(aluno_id) => {
                    app.professional().start_impersonation(&aluno_id).await?;
                    output::success(&format!("Now viewing aluno {}", aluno_id));
                }
                None => break,
            }
        }

        Ok(())
    }
}
