use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::Editor;

use zapnutri::models::InstructionKind;
use zapnutri::ZapNutri;

use super::Context;
use crate::output;

/// Connect and make sure the caller is a professional
async fn connect_professional(ctx: &Context) -> Result<ZapNutri> {
    let app = ctx.connect_authenticated()?;
    let role = app.profile().get_user_role().await?;
    if !role.is_professional() {
        bail!("This command is only available to professionals");
    }
    Ok(app)
}

pub async fn students(ctx: &Context) -> Result<()> {
    let app = connect_professional(ctx).await?;
    let roster = output::with_spinner("Loading students...", app.professional().roster()).await?;

    output::header("Your students");
    if roster.is_empty() {
        println!("No students linked to your account yet.");
        return Ok(());
    }

    for entry in &roster {
        println!(
            "  {:<28} {:<16} {:>8}  {}",
            console::truncate_str(entry.display_name(), 28, "…"),
            entry.objetivo.as_deref().unwrap_or("-"),
            output::or_dash(entry.ultimo_peso_kg, " kg"),
            entry.aluno_id.dimmed()
        );
    }
    println!();
    println!(
        "View a student's account with '{}'.",
        "zapnutri pro impersonate <aluno_id>".cyan()
    );
    Ok(())
}

pub async fn impersonate(ctx: &Context, aluno_id: &str) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let state = output::with_spinner(
        "Checking roster...",
        app.professional().start_impersonation(aluno_id),
    )
    .await?;

    output::success(&format!(
        "Now viewing aluno {}",
        state.student_aluno_id.as_deref().unwrap_or(aluno_id)
    ));
    println!(
        "Student commands (diet, workout, progress, dashboard) now act on this account. Use '{}' to return.",
        "zapnutri pro stop".cyan()
    );
    Ok(())
}

pub fn stop(ctx: &Context) -> Result<()> {
    let app = ctx.connect()?;
    if app.professional().stop_impersonation()? {
        output::success("Back to your own account");
    } else {
        println!("You were not viewing a student's account.");
    }
    Ok(())
}

pub fn status(ctx: &Context) -> Result<()> {
    let app = ctx.connect()?;

    match app.professional().impersonation_status()? {
        Some(state) => {
            output::warning("Viewing a student's account");
            output::field("Aluno", state.student_aluno_id.as_deref().unwrap_or("-"));
            output::field(
                "Since",
                state.started_at.format("%d/%m/%Y %H:%M").to_string(),
            );
        }
        None => println!("Not viewing any student's account."),
    }
    Ok(())
}

pub async fn show_instructions(ctx: &Context, kind: InstructionKind, aluno_id: &str) -> Result<()> {
    let app = connect_professional(ctx).await?;
    let instruction = output::with_spinner(
        "Loading instructions...",
        app.professional().instructions(kind, aluno_id),
    )
    .await?;

    output::header(&format!("Instructions ({})", kind));
    match instruction {
        Some(instruction) => {
            if let Some(updated) = instruction.updated_at {
                println!("{}", format!("Updated {}", updated.format("%d/%m/%Y %H:%M")).dimmed());
                println!();
            }
            println!("{}", instruction.conteudo);
        }
        None => println!("No instructions for this student yet."),
    }
    Ok(())
}

pub async fn save_instructions(
    ctx: &Context,
    kind: InstructionKind,
    aluno_id: &str,
    text: Option<String>,
) -> Result<()> {
    let app = connect_professional(ctx).await?;
    let service = app.professional();

    let text = match text {
        Some(text) => text,
        None => {
            let current = service
                .instructions(kind, aluno_id)
                .await?
                .map(|i| i.conteudo)
                .unwrap_or_default();
            match Editor::new().extension(".md").edit(&current)? {
                Some(edited) => edited,
                None => {
                    println!("Editor closed without saving. Nothing changed.");
                    return Ok(());
                }
            }
        }
    };

    output::with_spinner(
        "Saving instructions...",
        service.save_instructions(kind, aluno_id, &text),
    )
    .await?;
    output::success(&format!("Saved {} instructions", kind));
    Ok(())
}

pub async fn suggest_instructions(
    ctx: &Context,
    kind: InstructionKind,
    aluno_id: &str,
    prompt: &str,
) -> Result<()> {
    let app = connect_professional(ctx).await?;
    let reply = output::with_spinner(
        "Asking the assistant...",
        app.professional().suggest_instructions(kind, aluno_id, prompt),
    )
    .await?;

    output::header("Suggestion");
    println!("{}", reply.text());
    println!();
    println!(
        "Save it with '{}'.",
        format!("zapnutri pro instructions save {} {}", kind, aluno_id).cyan()
    );
    Ok(())
}
