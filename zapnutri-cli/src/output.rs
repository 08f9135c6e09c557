//! Status lines and spinners shared by all commands.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Error line on stderr
pub fn failure(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message.yellow());
}

pub fn header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "────────────────────────────────".dimmed());
}

/// `label: value` line with a dimmed label
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<14} {}", format!("{}:", label).dimmed(), value);
}

pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Run a remote call behind a spinner
pub async fn with_spinner<F, T>(message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let bar = spinner(message);
    let result = future.await;
    bar.finish_and_clear();
    result
}

/// `Some(v)` formatted with `unit`, or a dash
pub fn or_dash(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{:.1}{}", v, unit))
        .unwrap_or_else(|| "-".to_string())
}

/// Signed value for deltas, e.g. `+0.4 kg` / `-1.2 kg`
pub fn signed(value: f64, unit: &str) -> String {
    format!("{:+.1} {}", value, unit)
}
