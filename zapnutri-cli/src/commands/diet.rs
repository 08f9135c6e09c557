use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use colored::Colorize;

use zapnutri::charts::{format_day_label, week_start};
use zapnutri::models::{ConsumptionInput, DailyNutritionSummary};

use super::Context;
use crate::output;

/// Arguments of `diet log`
pub struct LogEntry {
    pub food: String,
    pub grams: f64,
    pub template: bool,
    pub kcal: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal: Option<String>,
    pub date: Option<NaiveDate>,
}

pub async fn today(ctx: &Context) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let date = Utc::now().date_naive();

    let summary = output::with_spinner("Loading today's nutrition...", app.diet().daily_summary(date))
        .await?;

    output::header(&format!("Nutrition {}", date.format("%d/%m/%Y")));
    match summary {
        Some(summary) => print_summary(&summary),
        None => {
            println!("Nothing logged today.");
            println!();
            println!("Log a meal with '{}'.", "zapnutri diet log <food>".cyan());
        }
    }

    Ok(())
}

fn print_summary(summary: &DailyNutritionSummary) {
    let against = |consumed: f64, target: Option<f64>, unit: &str| match target {
        Some(target) => format!("{:.0} / {:.0} {}", consumed, target, unit),
        None => format!("{:.0} {}", consumed, unit),
    };

    output::field(
        "Calories",
        against(summary.calorias_consumidas, summary.meta_calorias, "kcal"),
    );
    output::field(
        "Protein",
        against(summary.proteinas_consumidas, summary.meta_proteinas, "g"),
    );
    output::field(
        "Carbs",
        against(summary.carboidratos_consumidos, summary.meta_carboidratos, "g"),
    );
    output::field(
        "Fat",
        against(summary.gorduras_consumidas, summary.meta_gorduras, "g"),
    );

    if let (Some(progress), Some(remaining)) =
        (summary.calorie_progress(), summary.calories_remaining())
    {
        println!();
        let line = format!("{:.0}% of target, {:.0} kcal left", progress, remaining);
        if remaining < 0.0 {
            println!("  {}", line.red());
        } else {
            println!("  {}", line.green());
        }
    }
}

pub async fn history(ctx: &Context, date: Option<NaiveDate>) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    let items = output::with_spinner("Loading food log...", app.diet().consumption_history(date))
        .await?;

    output::header(&format!("Food log {}", date.format("%d/%m/%Y")));
    if items.is_empty() {
        println!("Nothing logged on this day.");
        return Ok(());
    }

    println!(
        "  {:<14} {:<24} {:>7} {:>8} {:>6} {:>6} {:>6}",
        "Meal", "Food", "g", "kcal", "P", "C", "F"
    );
    for item in &items {
        println!(
            "  {:<14} {:<24} {:>7.0} {:>8.0} {:>6.1} {:>6.1} {:>6.1}",
            console::truncate_str(item.refeicao.as_deref().unwrap_or("-"), 14, "…"),
            console::truncate_str(&item.alimento, 24, "…"),
            item.quantidade_g,
            item.calorias,
            item.proteinas,
            item.carboidratos,
            item.gorduras,
        );
    }

    let total: f64 = items.iter().map(|i| i.calorias).sum();
    println!();
    output::field("Total", format!("{:.0} kcal", total));

    Ok(())
}

pub async fn log(ctx: &Context, entry: LogEntry) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let diet = app.diet();

    let mut input = if entry.template {
        let templates =
            output::with_spinner("Loading food templates...", diet.food_templates()).await?;
        let wanted = entry.food.trim().to_lowercase();
        let template = templates
            .iter()
            .find(|t| t.nome.to_lowercase() == wanted)
            .or_else(|| templates.iter().find(|t| t.nome.to_lowercase().contains(&wanted)))
            .ok_or_else(|| anyhow!("No food template matches '{}'", entry.food))?;
        template.to_input(entry.grams, entry.meal.clone())
    } else {
        ConsumptionInput {
            data: None,
            refeicao: entry.meal.clone(),
            alimento: entry.food.clone(),
            quantidade_g: entry.grams,
            calorias: entry.kcal,
            proteinas: entry.protein,
            carboidratos: entry.carbs,
            gorduras: entry.fat,
        }
    };
    input.data = entry.date;

    let row = output::with_spinner("Logging...", diet.log_consumption(input)).await?;

    output::success(&format!(
        "Logged {} ({:.0} g, {:.0} kcal) on {}",
        row.alimento,
        row.quantidade_g,
        row.calorias,
        format_day_label(row.data)
    ));
    Ok(())
}

pub async fn week(ctx: &Context, date: Option<NaiveDate>) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let start = week_start(date.unwrap_or_else(|| Utc::now().date_naive()));

    let summary =
        output::with_spinner("Loading weekly macros...", app.diet().weekly_macros(start)).await?;

    output::header(&format!("Week of {}", start.format("%d/%m/%Y")));
    println!(
        "  {:<6} {:>8} {:>7} {:>7} {:>7}",
        "Day", "kcal", "P", "C", "F"
    );
    for day in &summary.days {
        println!(
            "  {:<6} {:>8.0} {:>7.1} {:>7.1} {:>7.1}",
            format_day_label(day.data),
            day.calorias_consumidas,
            day.proteinas_consumidas,
            day.carboidratos_consumidos,
            day.gorduras_consumidas,
        );
    }
    println!();
    output::field("Days logged", summary.days_logged);
    output::field("Avg kcal", format!("{:.0}", summary.average_calories()));
    output::field("Total kcal", format!("{:.0}", summary.total_calorias));

    Ok(())
}

pub async fn templates(ctx: &Context, search: Option<String>) -> Result<()> {
    let app = ctx.connect_authenticated()?;

    let mut templates =
        output::with_spinner("Loading food templates...", app.diet().food_templates()).await?;
    if let Some(search) = search {
        let search = search.to_lowercase();
        templates.retain(|t| t.nome.to_lowercase().contains(&search));
    }

    output::header("Food templates");
    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }

    for t in &templates {
        println!(
            "  {:<28} {:>5.0} g  {:>6.0} kcal  P {:>5.1}  C {:>5.1}  F {:>5.1}",
            console::truncate_str(&t.nome, 28, "…"),
            t.porcao_g,
            t.calorias,
            t.proteinas,
            t.carboidratos,
            t.gorduras,
        );
    }

    Ok(())
}

pub async fn generate(
    ctx: &Context,
    preferences: Option<String>,
    restrictions: Option<String>,
    meals: Option<u8>,
) -> Result<()> {
    let app = ctx.connect_authenticated()?;

    let reply = output::with_spinner(
        "Generating your diet (this can take a while)...",
        app.diet().generate_diet(preferences, restrictions, meals),
    )
    .await?;

    if !reply.success {
        anyhow::bail!("Diet generation failed: {}", reply.text());
    }

    output::success("Diet generated!");
    if !reply.text().is_empty() {
        println!();
        println!("{}", reply.text());
    }
    Ok(())
}
