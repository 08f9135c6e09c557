use anyhow::Result;
use std::process::Command;

use zapnutri::Config;

use super::Context;
use crate::output;

pub fn show_config(ctx: &Context) -> Result<()> {
    let mut config = ctx.load_config()?;

    // Never print live tokens
    for token in [&mut config.auth.access_token, &mut config.auth.refresh_token] {
        if !token.is_empty() {
            *token = "********".to_string();
        }
    }
    let config_str = toml::to_string_pretty(&config)?;

    output::header("Current Configuration");
    println!("# {}", ctx.config_file()?.display());
    println!();
    println!("{}", config_str);

    Ok(())
}

pub fn edit_config(ctx: &Context) -> Result<()> {
    let config_file = ctx.config_file()?;

    // Ensure config file exists
    if !config_file.exists() {
        Config::load_from(&config_file)?.save()?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    Command::new(editor).arg(&config_file).status()?;

    // Make sure the result still parses
    Config::load_from(&config_file)?;
    output::success("Configuration saved!");

    Ok(())
}

pub fn init_config(
    ctx: &Context,
    url: Option<String>,
    anon_key: Option<String>,
    force: bool,
) -> Result<()> {
    let config_file = ctx.config_file()?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let mut config = Config::for_project(
        url.unwrap_or_else(|| Config::default().supabase.url),
        anon_key.unwrap_or_default(),
    );
    config.path = Some(config_file.clone());
    config.save()?;

    output::success(&format!(
        "Configuration initialized at: {}",
        config_file.display()
    ));
    println!();
    println!("You can edit it with: zapnutri config edit");

    Ok(())
}
