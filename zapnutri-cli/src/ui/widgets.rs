use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Gauge, List, ListItem, Paragraph, Widget},
};

use zapnutri::charts::{format_day_label, Macro, MacroChart};
use zapnutri::models::{
    BodyMetric, DailyNutritionSummary, PerfilCompletoAluno, RosterEntry, WeeklyTrainingSummary,
};

use super::app::{App, View};

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Gray))
}

fn label_value(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::Gray)),
        Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn empty_card(inner: Rect, buf: &mut Buffer, text: &str) {
    Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .render(inner, buf);
}

pub fn macro_color(metric: Macro) -> Color {
    match metric {
        Macro::Calories => Color::Yellow,
        Macro::Protein => Color::Red,
        Macro::Carbs => Color::Cyan,
        Macro::Fat => Color::Magenta,
    }
}

/// Render the student's profile card
pub fn render_profile_card(
    area: Rect,
    buf: &mut Buffer,
    profile: Option<&PerfilCompletoAluno>,
    impersonating: bool,
) {
    let title = if impersonating {
        " 👤 Perfil (visualizando aluno) "
    } else {
        " 👤 Perfil "
    };
    let block = panel(title);
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(profile) = profile else {
        empty_card(inner, buf, "Perfil incompleto.\nRode 'zapnutri onboarding'.");
        return;
    };

    let fmt = |v: Option<f64>, unit: &str| {
        v.map(|v| format!("{:.1} {}", v, unit))
            .unwrap_or_else(|| "-".to_string())
    };

    let lines = vec![
        label_value(
            "Nome",
            profile.nome.clone().unwrap_or_else(|| "-".to_string()),
            Color::White,
        ),
        label_value(
            "Objetivo",
            profile.objetivo.clone().unwrap_or_else(|| "-".to_string()),
            Color::Green,
        ),
        label_value("Peso", fmt(profile.peso_atual_kg, "kg"), Color::Cyan),
        label_value("Meta", fmt(profile.peso_meta_kg, "kg"), Color::Cyan),
        label_value(
            "Falta",
            profile
                .kg_to_goal()
                .map(|v| format!("{:+.1} kg", v))
                .unwrap_or_else(|| "-".to_string()),
            Color::Yellow,
        ),
        label_value(
            "IMC",
            profile
                .imc()
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string()),
            Color::White,
        ),
    ];

    Paragraph::new(lines).render(inner, buf);
}

/// Render today's calories gauge and macro totals
pub fn render_today_macros(area: Rect, buf: &mut Buffer, summary: Option<&DailyNutritionSummary>) {
    let block = panel(" 🍽  Hoje ");
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(summary) = summary else {
        empty_card(inner, buf, "Nada registrado hoje.");
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let progress = summary.calorie_progress().unwrap_or(0.0);
    let gauge_color = if progress > 100.0 {
        Color::Red
    } else {
        Color::Green
    };
    Gauge::default()
        .gauge_style(Style::default().fg(gauge_color))
        .ratio((progress / 100.0).clamp(0.0, 1.0))
        .label(format!(
            "{:.0} / {} kcal",
            summary.calorias_consumidas,
            summary
                .meta_calorias
                .map(|m| format!("{:.0}", m))
                .unwrap_or_else(|| "?".to_string())
        ))
        .render(rows[0], buf);

    let lines = vec![
        Line::from(""),
        label_value(
            "Proteínas",
            format!("{:.0} g", summary.proteinas_consumidas),
            macro_color(Macro::Protein),
        ),
        label_value(
            "Carboidr.",
            format!("{:.0} g", summary.carboidratos_consumidos),
            macro_color(Macro::Carbs),
        ),
        label_value(
            "Gorduras",
            format!("{:.0} g", summary.gorduras_consumidas),
            macro_color(Macro::Fat),
        ),
    ];
    Paragraph::new(lines).render(rows[1], buf);
}

/// Render this week's training summary
pub fn render_training(area: Rect, buf: &mut Buffer, summary: Option<&WeeklyTrainingSummary>) {
    let block = panel(" 🏋 Treino da semana ");
    let inner = block.inner(area);
    block.render(area, buf);

    let Some(summary) = summary else {
        empty_card(inner, buf, "Nenhum treino nesta semana.");
        return;
    };

    let lines = vec![
        label_value(
            "Treinos",
            format!(
                "{} / {}",
                summary.treinos_concluidos, summary.treinos_planejados
            ),
            Color::Green,
        ),
        label_value(
            "Adesão",
            format!("{:.0}%", summary.adherence_percentage()),
            Color::Yellow,
        ),
        label_value(
            "Volume",
            summary
                .volume_total_kg
                .map(|v| format!("{:.0} kg", v))
                .unwrap_or_else(|| "-".to_string()),
            Color::Cyan,
        ),
    ];
    Paragraph::new(lines).render(inner, buf);
}

/// Legend line: `[1] Calorias [2] Proteínas ...`, hidden entries dimmed
pub fn legend_line(chart: &MacroChart) -> Line<'static> {
    let spans: Vec<Span> = Macro::ALL
        .iter()
        .enumerate()
        .map(|(idx, metric)| {
            let style = if chart.is_visible(*metric) {
                Style::default()
                    .fg(macro_color(*metric))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            };
            Span::styled(format!("[{}] {}  ", idx + 1, metric.label()), style)
        })
        .collect();

    Line::from(spans)
}

/// Render the weekly macro chart, one bar row per visible macro so each
/// keeps its own scale
pub fn render_macro_chart(area: Rect, buf: &mut Buffer, chart: &MacroChart) {
    let block = panel(" 📊 Macros da semana ");
    let inner = block.inner(area);
    block.render(area, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    Paragraph::new(legend_line(chart)).render(rows[0], buf);

    let visible = chart.visible_series();
    if visible.is_empty() {
        empty_card(rows[1], buf, "Todas as séries ocultas. Use 1-4 para exibir.");
        return;
    }

    let constraints = vec![Constraint::Ratio(1, visible.len() as u32); visible.len()];
    let series_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(rows[1]);

    for (series, series_area) in visible.iter().zip(series_areas.iter()) {
        let data: Vec<(&str, u64)> = chart
            .labels
            .iter()
            .map(String::as_str)
            .zip(series.values.iter())
            .map(|(label, value)| (label, value.max(0.0).round() as u64))
            .collect();

        let color = macro_color(series.metric);
        let title = format!(" {} ({}) ", series.metric.label(), series.metric.unit());

        BarChart::default()
            .block(Block::default().title(title).title_style(Style::default().fg(color)))
            .data(&data)
            .bar_width(5)
            .bar_gap(1)
            .bar_style(Style::default().fg(color))
            .value_style(Style::default().fg(Color::Black).bg(color))
            .render(*series_area, buf);
    }
}

/// Render the most recent body-metric samples
pub fn render_body_metrics(area: Rect, buf: &mut Buffer, metrics: &[BodyMetric]) {
    let block = panel(" ⚖  Medidas recentes ");
    let inner = block.inner(area);
    block.render(area, buf);

    if metrics.is_empty() {
        empty_card(inner, buf, "Nenhuma medida registrada.");
        return;
    }

    let items: Vec<ListItem> = metrics
        .iter()
        .map(|m| {
            let fat = m
                .percentual_gordura
                .map(|f| format!("{:.1}%", f))
                .unwrap_or_else(|| "-".to_string());
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}  ", format_day_label(m.data)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:>6.1} kg", m.peso_kg),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(format!("  {:>6}", fat), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render the professional's student list
pub fn render_roster(area: Rect, buf: &mut Buffer, roster: &[RosterEntry], selected: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 👥 Seus alunos ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    block.render(area, buf);

    if roster.is_empty() {
        empty_card(inner, buf, "Nenhum aluno vinculado.");
        return;
    }

    let items: Vec<ListItem> = roster
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let style = if idx == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };

            let content = format!(
                " {:<28} {:<16} {:>9} {}",
                entry.display_name(),
                entry.objetivo.as_deref().unwrap_or("-"),
                entry
                    .ultimo_peso_kg
                    .map(|p| format!("{:.1} kg", p))
                    .unwrap_or_else(|| "-".to_string()),
                entry
                    .ultima_atividade
                    .map(format_day_label)
                    .unwrap_or_default(),
            );
            ListItem::new(Line::from(Span::styled(content, style)))
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render help overlay
pub fn render_help_overlay(area: Rect, buf: &mut Buffer, view: View) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ❓ Help ")
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    block.render(area, buf);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(Color::Cyan)))
    };

    let mut help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match view {
        View::Student => {
            help_text.push(section("Chart legend:"));
            help_text.push(Line::from("  1        - Toggle calories"));
            help_text.push(Line::from("  2        - Toggle protein"));
            help_text.push(Line::from("  3        - Toggle carbs"));
            help_text.push(Line::from("  4        - Toggle fat"));
        }
        View::Professional => {
            help_text.push(section("Students:"));
            help_text.push(Line::from("  ↑/k      - Move up"));
            help_text.push(Line::from("  ↓/j      - Move down"));
            help_text.push(Line::from("  Enter    - View as this student"));
        }
    }

    help_text.extend([
        Line::from(""),
        section("Other:"),
        Line::from("  ?        - Toggle this help"),
        Line::from("  q/Esc    - Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or ESC to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    Paragraph::new(help_text).render(inner, buf);
}

/// Render status bar at bottom
pub fn render_status_bar(area: Rect, buf: &mut Buffer, app: &App) {
    let mode = match (app.view, app.impersonating) {
        (View::Professional, _) => Span::styled(
            " Profissional ",
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        (View::Student, true) => Span::styled(
            " Visualizando aluno ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        (View::Student, false) => Span::styled(
            " Aluno ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
    };

    let help_hint = Span::styled(
        " Press ? for help ",
        Style::default().fg(Color::Gray).bg(Color::DarkGray),
    );

    Paragraph::new(Line::from(vec![mode, help_hint])).render(area, buf);
}
