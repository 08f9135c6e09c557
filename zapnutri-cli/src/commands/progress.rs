use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;

use zapnutri::charts::{format_day_label, weight_series};
use zapnutri::models::{BodyMetricInput, GoalInput};

use super::Context;
use crate::output;

pub async fn metrics(ctx: &Context, limit: usize) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let progress = app.progress();
    let (samples, total) = output::with_spinner("Loading body metrics...", async {
        tokio::try_join!(progress.body_metrics(limit), progress.body_metric_count())
    })
    .await?;

    output::header("Body metrics");
    if samples.is_empty() {
        println!("No samples yet. Log one with 'zapnutri progress log <kg>'.");
        return Ok(());
    }
    println!(
        "  {}",
        format!("Showing {} of {} samples", samples.len(), total).dimmed()
    );

    println!("  {:<12} {:>8} {:>8} {:>9}", "Date", "kg", "fat %", "waist");
    for sample in &samples {
        println!(
            "  {:<12} {:>8.1} {:>8} {:>9}",
            sample.data.format("%d/%m/%Y"),
            sample.peso_kg,
            output::or_dash(sample.percentual_gordura, ""),
            output::or_dash(sample.cintura_cm, " cm"),
        );
    }
    Ok(())
}

pub async fn log(
    ctx: &Context,
    weight: f64,
    fat: Option<f64>,
    waist: Option<f64>,
    muscle: Option<f64>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let input = BodyMetricInput {
        data: date,
        peso_kg: weight,
        percentual_gordura: fat,
        cintura_cm: waist,
        massa_muscular_kg: muscle,
    };

    let metric =
        output::with_spinner("Saving sample...", app.progress().log_body_metric(input)).await?;
    output::success(&format!(
        "Logged {:.1} kg on {}",
        metric.peso_kg,
        metric.data.format("%d/%m/%Y")
    ));
    Ok(())
}

pub async fn delta(ctx: &Context) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let delta = output::with_spinner("Comparing samples...", app.progress().latest_delta()).await?;

    output::header("Latest change");
    let Some(delta) = delta else {
        println!("At least two samples are needed to compare.");
        return Ok(());
    };

    output::field(
        "Period",
        format!(
            "{} → {} ({} days)",
            format_day_label(delta.from),
            format_day_label(delta.to),
            delta.days_between()
        ),
    );
    let weight = output::signed(delta.peso_kg, "kg");
    output::field(
        "Weight",
        if delta.peso_kg <= 0.0 {
            weight.green()
        } else {
            weight.yellow()
        },
    );
    if let Some(fat) = delta.percentual_gordura {
        output::field("Body fat", output::signed(fat, "%"));
    }
    if let Some(waist) = delta.cintura_cm {
        output::field("Waist", output::signed(waist, "cm"));
    }
    Ok(())
}

pub async fn goals(ctx: &Context, all: bool) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let mut goals = output::with_spinner("Loading goals...", app.progress().goals()).await?;
    if !all {
        goals.retain(|g| !g.concluido);
    }

    output::header("Goals");
    if goals.is_empty() {
        println!("No goals. Add one with 'zapnutri progress goal-add <type>'.");
        return Ok(());
    }

    for goal in &goals {
        let status = if goal.concluido {
            "✓".green().to_string()
        } else {
            format!("{:>3.0}%", goal.progress_percentage())
        };
        let due = match goal.days_remaining() {
            Some(days) if days >= 0 => format!("{} days left", days),
            Some(days) => format!("{} days overdue", -days).red().to_string(),
            None => String::new(),
        };

        println!(
            "  {} {:<12} {} → {}  {}  {}",
            status,
            goal.tipo,
            output::or_dash(goal.valor_inicial, ""),
            output::or_dash(goal.valor_alvo, ""),
            due,
            goal.id.dimmed()
        );
        if let Some(descricao) = &goal.descricao {
            println!("        {}", descricao.dimmed());
        }
    }
    Ok(())
}

pub async fn goal_add(
    ctx: &Context,
    tipo: String,
    target: Option<f64>,
    start: Option<f64>,
    description: Option<String>,
    due: Option<NaiveDate>,
) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let input = GoalInput {
        tipo,
        descricao: description,
        valor_inicial: start,
        valor_alvo: target,
        data_alvo: due,
    };

    let goal = output::with_spinner("Creating goal...", app.progress().create_goal(input)).await?;
    output::success(&format!("Goal '{}' created", goal.tipo));
    output::field("ID", &goal.id);
    Ok(())
}

pub async fn goal_done(ctx: &Context, id: &str) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let goal = output::with_spinner("Updating goal...", app.progress().complete_goal(id)).await?;
    output::success(&format!("Goal '{}' completed. Nice work!", goal.tipo));
    Ok(())
}

pub async fn chart(ctx: &Context, days: Option<u32>) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let days = days.unwrap_or(app.client.config().ui.chart_days);

    let points =
        output::with_spinner("Loading chart data...", app.progress().chart_data(days)).await?;
    let series = weight_series(&points);

    output::header(&format!("Weight, last {} days", days));
    if series.is_empty() {
        println!("No weight readings in this period.");
        return Ok(());
    }

    let min = series.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = series
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(0.1);

    for (label, value) in &series {
        let width = 1 + ((value - min) / span * 39.0).round() as usize;
        println!("  {} {:>6.1} {}", label, value, "█".repeat(width).cyan());
    }
    Ok(())
}
