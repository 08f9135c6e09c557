use chrono::NaiveDate;
use crossterm::event::KeyCode;
use zapnutri::charts::{Macro, MacroChart};
use zapnutri::models::{DailyNutritionSummary, RosterEntry};
use zapnutri::services::DashboardData;
use zapnutri_cli::ui::{App, View};

fn day(d: u32, kcal: f64, protein: f64) -> DailyNutritionSummary {
    DailyNutritionSummary {
        aluno_id: "a1".to_string(),
        data: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
        calorias_consumidas: kcal,
        proteinas_consumidas: protein,
        carboidratos_consumidos: 200.0,
        gorduras_consumidas: 60.0,
        ..Default::default()
    }
}

fn student_app() -> App {
    let chart = MacroChart::from_days(&[day(6, 2100.0, 140.0), day(7, 1900.0, 120.0)]);
    App::student(DashboardData::default(), chart, Vec::new(), false)
}

fn roster_entry(id: &str, nome: &str) -> RosterEntry {
    RosterEntry {
        aluno_id: id.to_string(),
        profissional_id: "prof-1".to_string(),
        nome: Some(nome.to_string()),
        email: None,
        objetivo: None,
        ultimo_peso_kg: None,
        ultima_atividade: None,
    }
}

#[test]
fn test_legend_keys_toggle_series() {
    let mut app = student_app();
    let calories_before = app.chart.series()[0].values.clone();

    app.handle_key(KeyCode::Char('2'));
    assert!(!app.chart.is_visible(Macro::Protein));
    assert_eq!(app.chart.visible_series().len(), 3);

    // Other series keep their values
    let calories = app
        .chart
        .visible_series()
        .into_iter()
        .find(|s| s.metric == Macro::Calories)
        .unwrap();
    assert_eq!(calories.values, calories_before);

    app.handle_key(KeyCode::Char('2'));
    assert!(app.chart.is_visible(Macro::Protein));
}

#[test]
fn test_help_overlay_swallows_keys() {
    let mut app = student_app();
    app.handle_key(KeyCode::Char('?'));
    assert!(app.show_help);

    app.handle_key(KeyCode::Char('1'));
    assert!(app.chart.is_visible(Macro::Calories));

    app.handle_key(KeyCode::Esc);
    assert!(!app.show_help);
    assert!(!app.should_quit);
}

#[test]
fn test_quit() {
    let mut app = student_app();
    app.handle_key(KeyCode::Char('q'));
    assert!(app.should_quit);
}

#[test]
fn test_roster_navigation_and_selection() {
    let mut app = App::professional(vec![
        roster_entry("a1", "Ana"),
        roster_entry("a2", "Bruno"),
    ]);
    assert_eq!(app.view, View::Professional);

    app.handle_key(KeyCode::Up);
    assert_eq!(app.selected_index, 0);

    app.handle_key(KeyCode::Down);
    app.handle_key(KeyCode::Down);
    assert_eq!(app.selected_index, 1);

    app.handle_key(KeyCode::Enter);
    assert_eq!(app.chosen_student.as_deref(), Some("a2"));
    assert!(app.should_quit);
}

#[test]
fn test_legend_keys_ignored_in_professional_view() {
    let mut app = App::professional(Vec::new());
    app.handle_key(KeyCode::Char('1'));
    app.handle_key(KeyCode::Enter);
    assert!(app.chosen_student.is_none());
    assert!(!app.should_quit);
}
