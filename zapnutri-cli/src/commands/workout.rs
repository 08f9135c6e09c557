use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use zapnutri::models::{ProgramInput, WorkoutProgram};

use super::Context;
use crate::output;

fn print_program_line(program: &WorkoutProgram) {
    let marker = if program.is_active {
        "●".green().to_string()
    } else {
        "○".dimmed().to_string()
    };
    println!(
        "  {} {:<30} {}x/wk  v{}  {}",
        marker,
        console::truncate_str(&program.nome_programa, 30, "…"),
        program
            .frequencia_semanal
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string()),
        program.version,
        program.id.dimmed()
    );
}

pub async fn list(ctx: &Context) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let programs =
        output::with_spinner("Loading programs...", app.workouts().list_programs()).await?;

    output::header("Training programs");
    if programs.is_empty() {
        println!("No programs yet.");
        println!();
        println!(
            "Create one with '{}'.",
            "zapnutri workout create <name>".cyan()
        );
        return Ok(());
    }

    for program in &programs {
        print_program_line(program);
    }
    Ok(())
}

pub async fn create(
    ctx: &Context,
    name: String,
    frequency: i32,
    goal: Option<String>,
) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let input = ProgramInput {
        nome_programa: name,
        objetivo: goal,
        frequencia_semanal: frequency,
    };

    let program =
        output::with_spinner("Creating program...", app.workouts().create_program(input)).await?;

    output::success(&format!(
        "Program '{}' created and set as active",
        program.nome_programa
    ));
    output::field("ID", &program.id);
    Ok(())
}

pub async fn show(ctx: &Context, id: &str) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let service = app.workouts();

    let program = output::with_spinner("Loading program...", service.get_program(id)).await?;
    let workouts = service.program_workouts(&program.id).await?;

    output::header(&program.nome_programa);
    output::field("Status", if program.is_active { "active" } else { "inactive" });
    output::field("Goal", program.objetivo.as_deref().unwrap_or("-"));
    output::field(
        "Frequency",
        program
            .frequencia_semanal
            .map(|f| format!("{}x per week", f))
            .unwrap_or_else(|| "-".to_string()),
    );
    if let Some(start) = program.data_inicio {
        output::field("Started", start.format("%d/%m/%Y"));
    }
    println!();

    if workouts.is_empty() {
        println!("This program has no workouts yet.");
        return Ok(());
    }

    for workout in &workouts {
        println!("{}", workout.nome_treino.bold());
        if let Some(descricao) = &workout.descricao {
            println!("  {}", descricao.dimmed());
        }

        let exercises = service.workout_exercises(&workout.id).await?;
        for exercise in &exercises {
            println!(
                "  • {:<28} {}",
                console::truncate_str(&exercise.nome_exercicio, 28, "…"),
                exercise.prescription()
            );
        }
        println!();
    }

    Ok(())
}

pub async fn set_active(ctx: &Context, id: &str, active: bool) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let program = output::with_spinner(
        "Updating program...",
        app.workouts().set_active(id, active),
    )
    .await?;

    let state = if program.is_active { "active" } else { "inactive" };
    output::success(&format!("Program '{}' is now {}", program.nome_programa, state));
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let app = ctx.connect_authenticated()?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete program {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    output::with_spinner("Deleting program...", app.workouts().delete_program(id)).await?;
    output::success("Program deleted");
    Ok(())
}

pub async fn week(ctx: &Context) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let summary =
        output::with_spinner("Loading weekly summary...", app.workouts().weekly_summary()).await?;

    output::header("Training this week");
    match summary {
        Some(summary) => {
            output::field(
                "Sessions",
                format!(
                    "{} / {}",
                    summary.treinos_concluidos, summary.treinos_planejados
                ),
            );
            output::field(
                "Adherence",
                format!("{:.0}%", summary.adherence_percentage()),
            );
            output::field("Volume", output::or_dash(summary.volume_total_kg, " kg"));
            output::field("Time", output::or_dash(summary.minutos_totais, " min"));
        }
        None => println!("No training recorded this week."),
    }
    Ok(())
}

pub async fn generate(
    ctx: &Context,
    frequency: i32,
    goal: Option<String>,
    level: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let app = ctx.connect_authenticated()?;

    let reply = output::with_spinner(
        "Generating your training plan (this can take a while)...",
        app.workouts().generate_plan(frequency, goal, level, notes),
    )
    .await?;

    if !reply.success {
        anyhow::bail!("Plan generation failed: {}", reply.text());
    }

    output::success("Training plan generated!");
    if !reply.text().is_empty() {
        println!();
        println!("{}", reply.text());
    }
    println!();
    println!("See it with '{}'.", "zapnutri workout list".cyan());
    Ok(())
}
