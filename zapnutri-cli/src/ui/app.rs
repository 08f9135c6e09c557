use anyhow::Result;
use chrono::Utc;
use crossterm::event::KeyCode;

use zapnutri::charts::{week_start, Macro, MacroChart};
use zapnutri::models::{BodyMetric, RosterEntry, UserRole};
use zapnutri::services::DashboardData;
use zapnutri::ZapNutri;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Student,
    Professional,
}

/// Application state for the TUI dashboard
pub struct App {
    /// Should the application quit?
    pub should_quit: bool,
    /// Show help overlay
    pub show_help: bool,
    pub view: View,
    /// Student cards
    pub dashboard: DashboardData,
    pub chart: MacroChart,
    pub metrics: Vec<BodyMetric>,
    /// A professional is viewing this student's account
    pub impersonating: bool,
    /// Professional view
    pub roster: Vec<RosterEntry>,
    pub selected_index: usize,
    /// Student picked from the roster with Enter
    pub chosen_student: Option<String>,
}

impl App {
    pub fn student(
        dashboard: DashboardData,
        chart: MacroChart,
        metrics: Vec<BodyMetric>,
        impersonating: bool,
    ) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            view: View::Student,
            dashboard,
            chart,
            metrics,
            impersonating,
            roster: Vec::new(),
            selected_index: 0,
            chosen_student: None,
        }
    }

    pub fn professional(roster: Vec<RosterEntry>) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            view: View::Professional,
            dashboard: DashboardData::default(),
            chart: MacroChart::from_days(&[]),
            metrics: Vec::new(),
            impersonating: false,
            roster,
            selected_index: 0,
            chosen_student: None,
        }
    }

    /// Fetch everything the dashboard shows. Professionals get their roster
    /// unless they are viewing a student's account.
    pub async fn load(app: &ZapNutri) -> Result<Self> {
        let role = app.profile().get_user_role().await?;
        let impersonating = app.resolver.impersonation().is_active()?;

        if role == UserRole::Profissional && !impersonating {
            let roster = app.professional().roster().await?;
            return Ok(Self::professional(roster));
        }

        let today = Utc::now().date_naive();
        let diet = app.diet();
        let progress = app.progress();
        let dashboard = app.dashboard();

        let (data, week, metrics) = tokio::join!(
            dashboard.load(today),
            diet.weekly_macros(week_start(today)),
            progress.body_metrics(5),
        );

        let chart = MacroChart::from_days(&week?.days);
        Ok(Self::student(data?, chart, metrics?, impersonating))
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) {
        // Help overlay takes precedence
        if self.show_help {
            if matches!(key, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }

            KeyCode::Char('?') => {
                self.show_help = true;
            }

            // Legend toggles
            KeyCode::Char(c) if self.view == View::Student => {
                if let Some(metric) = Macro::from_key(c) {
                    self.chart.toggle(metric);
                }
            }

            KeyCode::Up | KeyCode::Char('k') if self.view == View::Professional => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }

            KeyCode::Down | KeyCode::Char('j') if self.view == View::Professional => {
                if self.selected_index + 1 < self.roster.len() {
                    self.selected_index += 1;
                }
            }

            KeyCode::Enter if self.view == View::Professional => {
                if let Some(entry) = self.roster.get(self.selected_index) {
                    self.chosen_student = Some(entry.aluno_id.clone());
                    self.should_quit = true;
                }
            }

            _ => {}
        }
    }
}
