use anyhow::Result;
use chrono::{NaiveDate, Utc};
use colored::Colorize;
use console::Term;
use dialoguer::{Confirm, Input, Select};

use zapnutri::models::{Experiencia, NivelAtividade, Objetivo, OnboardingData, Sexo};
use zapnutri::{OnboardingStep, OnboardingWizard, ZapError};

use super::Context;
use crate::output;

pub async fn run(ctx: &Context) -> Result<()> {
    let app = ctx.connect_authenticated()?;
    let term = Term::stdout();
    let mut wizard = OnboardingWizard::new();

    loop {
        term.clear_screen()?;
        println!("{} {}", "ZapNutri - Onboarding".green().bold(), wizard.step());
        println!();

        if wizard.is_review() {
            print_review(wizard.data());
            println!();

            let choice = Select::new()
                .with_prompt("Everything right?")
                .items(&["Confirm and save", "Go back", "Cancel"])
                .default(0)
                .interact()?;

            match choice {
                0 => break,
                1 => {
                    wizard.back();
                    continue;
                }
                _ => {
                    println!("Onboarding cancelled. Nothing was saved.");
                    return Ok(());
                }
            }
        }

        prompt_step(&mut wizard)?;

        if let Err(e) = wizard.advance() {
            output::failure(&e.to_string());
            let retry = Confirm::new()
                .with_prompt("Try this step again?")
                .default(true)
                .interact()?;
            if !retry {
                return Err(e.into());
            }
        }
    }

    let today = Utc::now().date_naive();
    let result = output::with_spinner(
        "Saving your profile...",
        wizard.submit(&app.client, &app.resolver, today),
    )
    .await;

    match result {
        Ok(aluno_id) => {
            output::success("Profile saved!");
            output::field("Aluno ID", aluno_id);
            println!();
            println!("Open your dashboard with '{}'.", "zapnutri dashboard".cyan());
            Ok(())
        }
        Err(ZapError::Onboarding {
            step,
            completed,
            source,
        }) => {
            if !completed.is_empty() {
                output::warning(&format!("Already saved: {}", completed.join(", ")));
            }
            anyhow::bail!("Could not save {}: {}", step, source)
        }
        Err(e) => Err(e.into()),
    }
}

fn prompt_step(wizard: &mut OnboardingWizard) -> Result<()> {
    let step = wizard.step();
    let data = wizard.data_mut();

    match step {
        OnboardingStep::PersonalInfo => {
            data.nome = Some(text("Full name", data.nome.clone())?);
            data.data_nascimento = Some(date("Birth date (YYYY-MM-DD)", data.data_nascimento)?);
            data.sexo = Some(choose("Sex", &Sexo::ALL, data.sexo)?);
        }
        OnboardingStep::BodyMeasures => {
            data.altura_cm = Some(number("Height (cm)", data.altura_cm)?);
            data.peso_kg = Some(number("Weight (kg)", data.peso_kg)?);
        }
        OnboardingStep::Goal => {
            data.objetivo = Some(choose("Main goal", &Objetivo::ALL, data.objetivo)?);
        }
        OnboardingStep::ActivityLevel => {
            data.nivel_atividade = Some(choose(
                "Activity level",
                &NivelAtividade::ALL,
                data.nivel_atividade,
            )?);
        }
        OnboardingStep::Restrictions => {
            data.restricoes_alimentares = list(
                "Dietary restrictions, comma separated (empty for none)",
                &data.restricoes_alimentares,
            )?;
        }
        OnboardingStep::Preferences => {
            data.alimentos_preferidos = list(
                "Favourite foods, comma separated",
                &data.alimentos_preferidos,
            )?;
            data.refeicoes_por_dia = Some(
                Input::new()
                    .with_prompt("Meals per day")
                    .default(data.refeicoes_por_dia.unwrap_or(4))
                    .interact_text()?,
            );
        }
        OnboardingStep::Training => {
            data.experiencia_treino = Some(choose(
                "Training experience",
                &Experiencia::ALL,
                data.experiencia_treino,
            )?);
            data.frequencia_treino = Some(
                Input::new()
                    .with_prompt("Training sessions per week")
                    .default(data.frequencia_treino.unwrap_or(3))
                    .interact_text()?,
            );
        }
        OnboardingStep::TargetWeight => {
            data.peso_meta_kg = Some(number("Target weight (kg)", data.peso_meta_kg.or(data.peso_kg))?);
        }
        OnboardingStep::Review => {}
    }

    Ok(())
}

fn print_review(data: &OnboardingData) {
    let today = Utc::now().date_naive();
    let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    output::header("Review");
    output::field("Name", show(data.nome.clone()));
    output::field("Birth date", show(data.data_nascimento.map(|d| d.format("%d/%m/%Y").to_string())));
    output::field("Sex", show(data.sexo.map(|s| s.to_string())));
    output::field("Height", output::or_dash(data.altura_cm, " cm"));
    output::field("Weight", output::or_dash(data.peso_kg, " kg"));
    output::field("Goal", show(data.objetivo.map(|o| o.to_string())));
    output::field("Activity", show(data.nivel_atividade.map(|n| n.to_string())));
    output::field("Restrictions", joined(&data.restricoes_alimentares));
    output::field("Favourites", joined(&data.alimentos_preferidos));
    output::field("Meals/day", show(data.refeicoes_por_dia.map(|n| n.to_string())));
    output::field("Experience", show(data.experiencia_treino.map(|e| e.to_string())));
    output::field("Sessions/wk", show(data.frequencia_treino.map(|n| n.to_string())));
    output::field("Target", output::or_dash(data.peso_meta_kg, " kg"));
    output::field("Daily kcal", output::or_dash(data.estimated_calories(today), " kcal"));
}

fn joined(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn text(prompt: &str, current: Option<String>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(current) = current {
        input = input.default(current);
    }
    Ok(input.interact_text()?)
}

fn number(prompt: &str, current: Option<f64>) -> Result<f64> {
    let mut input = Input::<f64>::new().with_prompt(prompt);
    if let Some(current) = current {
        input = input.default(current);
    }
    Ok(input.interact_text()?)
}

fn date(prompt: &str, current: Option<NaiveDate>) -> Result<NaiveDate> {
    let mut input = Input::<NaiveDate>::new().with_prompt(prompt);
    if let Some(current) = current {
        input = input.default(current);
    }
    Ok(input.interact_text()?)
}

fn list(prompt: &str, current: &[String]) -> Result<Vec<String>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(current.join(", "))
        .allow_empty(true)
        .interact_text()?;

    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

fn choose<T>(prompt: &str, options: &[T], current: Option<T>) -> Result<T>
where
    T: Copy + PartialEq + std::fmt::Display,
{
    let default = current
        .and_then(|c| options.iter().position(|o| *o == c))
        .unwrap_or(0);

    let index = Select::new()
        .with_prompt(prompt)
        .items(options)
        .default(default)
        .interact()?;

    Ok(options[index])
}
