use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};
use serde_json::json;

use zapnutri::models::validation::{validate_email, validate_password};
use zapnutri::models::UserRole;
use zapnutri::ZapError;

use super::Context;
use crate::output;

#[derive(Args)]
pub struct LoginCommand {
    /// Account email; prompted when omitted
    #[arg(short, long)]
    email: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        println!("ZapNutri - Login");
        println!();

        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };
        let password = Password::new().with_prompt("Password").interact()?;

        let app = ctx.connect()?;
        let session = output::with_spinner(
            &format!("Logging in as {}...", email),
            app.client.sign_in_with_password(email.trim(), &password),
        )
        .await?;

        // A different user may have been logged in before
        app.resolver.invalidate()?;

        let role = app.profile().get_user_role().await?;

        output::success("Login successful!");
        println!();
        output::field("Email", session.user.email.as_deref().unwrap_or(&email));
        output::field("Role", role);
        output::field("Home", role.home_route());
        println!();
        print_next_steps(role);

        Ok(())
    }
}

fn print_next_steps(role: UserRole) {
    match role {
        UserRole::Profissional => {
            println!("Use '{}' to see your students.", "zapnutri pro students".cyan());
        }
        UserRole::Aluno => {
            println!("Use '{}' to open your dashboard.", "zapnutri dashboard".cyan());
        }
    }
}

#[derive(Args)]
pub struct RegisterCommand {
    /// Account email; prompted when omitted
    #[arg(short, long)]
    email: Option<String>,

    /// Full name; prompted when omitted
    #[arg(short, long)]
    name: Option<String>,
}

impl RegisterCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        println!("ZapNutri - Create account");
        println!();

        let name = match self.name {
            Some(name) => name,
            None => Input::new().with_prompt("Full name").interact_text()?,
        };
        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };
        let password = Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?;

        if let Err(e) = validate_email(&email) {
            bail!(e.message.unwrap_or_default().to_string());
        }
        if let Err(e) = validate_password(&password) {
            bail!(e.message.unwrap_or_default().to_string());
        }

        let app = ctx.connect()?;
        let metadata = json!({ "nome": name.trim() });
        let outcome = output::with_spinner(
            "Creating account...",
            app.client.sign_up(email.trim(), &password, &metadata),
        )
        .await?;

        if outcome.session.is_some() {
            output::success("Account created and logged in!");
            println!();
            println!(
                "Next, tell us about yourself with '{}'.",
                "zapnutri onboarding".cyan()
            );
        } else {
            output::success("Account created!");
            println!();
            println!("Check {} to confirm your email, then log in.", email.trim());
        }

        Ok(())
    }
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let app = ctx.connect()?;

    if !app.client.is_authenticated() {
        println!("You are not logged in.");
        return Ok(());
    }

    app.client.sign_out().await?;
    app.resolver.impersonation().stop()?;
    app.resolver.invalidate()?;

    output::success("Logged out successfully!");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let app = ctx.connect()?;

    if !app.client.is_authenticated() {
        println!("You are not logged in.");
        println!();
        println!("Use 'zapnutri login' to authenticate.");
        return Ok(());
    }

    let user = match output::with_spinner("Fetching user information...", app.client.get_user())
        .await
    {
        Ok(user) => user,
        Err(e @ ZapError::Api(_)) | Err(e @ ZapError::NotAuthenticated) => {
            println!("Your session may have expired.");
            println!("Use 'zapnutri login' to authenticate again.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let profile = app.profile().current_profile().await?;

    output::success("Authenticated as:");
    println!();
    output::field("Email", user.email.as_deref().unwrap_or("-"));
    output::field("User ID", user.id);
    output::field("Role", profile.role);
    output::field("Home", profile.role.home_route());
    output::field(
        "Aluno ID",
        profile.aluno_id.as_deref().unwrap_or("(onboarding pending)"),
    );
    if profile.impersonating {
        println!();
        output::warning("Viewing a student's account. Use 'zapnutri pro stop' to return.");
    }

    Ok(())
}
