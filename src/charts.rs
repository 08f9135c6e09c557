//! Reshaping of rows into chart-ready series.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::models::{BodyMetric, ChartPoint, DailyNutritionSummary, MetricDelta};

/// `dd/mm` axis label
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Macro {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 4] = [Macro::Calories, Macro::Protein, Macro::Carbs, Macro::Fat];

    /// Legend key `1`-`4`
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(Macro::Calories),
            '2' => Some(Macro::Protein),
            '3' => Some(Macro::Carbs),
            '4' => Some(Macro::Fat),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Macro::Calories => "Calorias",
            Macro::Protein => "Proteínas",
            Macro::Carbs => "Carboidratos",
            Macro::Fat => "Gorduras",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Macro::Calories => "kcal",
            _ => "g",
        }
    }

    fn value(&self, day: &DailyNutritionSummary) -> f64 {
        match self {
            Macro::Calories => day.calorias_consumidas,
            Macro::Protein => day.proteinas_consumidas,
            Macro::Carbs => day.carboidratos_consumidos,
            Macro::Fat => day.gorduras_consumidas,
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    pub metric: Macro,
    pub values: Vec<f64>,
    pub visible: bool,
}

/// Macro bar chart with a toggleable legend
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MacroChart {
    pub labels: Vec<String>,
    series: Vec<Series>,
}

impl MacroChart {
    /// One label per day and one series per macro, all visible
    pub fn from_days(days: &[DailyNutritionSummary]) -> Self {
        let labels = days.iter().map(|d| format_day_label(d.data)).collect();
        let series = Macro::ALL
            .iter()
            .map(|metric| Series {
                metric: *metric,
                values: days.iter().map(|d| metric.value(d)).collect(),
                visible: true,
            })
            .collect();

        Self { labels, series }
    }

    /// Flip a legend entry. Returns the new visibility.
    pub fn toggle(&mut self, metric: Macro) -> bool {
        match self.series.iter_mut().find(|s| s.metric == metric) {
            Some(series) => {
                series.visible = !series.visible;
                series.visible
            }
            None => false,
        }
    }

    pub fn is_visible(&self, metric: Macro) -> bool {
        self.series
            .iter()
            .any(|s| s.metric == metric && s.visible)
    }

    /// Every series, hidden ones included, in legend order
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn visible_series(&self) -> Vec<&Series> {
        self.series.iter().filter(|s| s.visible).collect()
    }
}

/// Latest minus previous sample, `None` with fewer than two samples
pub fn metric_delta(samples: &[BodyMetric]) -> Option<MetricDelta> {
    let mut sorted: Vec<&BodyMetric> = samples.iter().collect();
    sorted.sort_by_key(|m| m.data);

    let [.., previous, latest] = sorted.as_slice() else {
        return None;
    };

    let diff = |a: Option<f64>, b: Option<f64>| Some(a? - b?);

    Some(MetricDelta {
        from: previous.data,
        to: latest.data,
        peso_kg: latest.peso_kg - previous.peso_kg,
        percentual_gordura: diff(latest.percentual_gordura, previous.percentual_gordura),
        cintura_cm: diff(latest.cintura_cm, previous.cintura_cm),
    })
}

/// `(label, kg)` pairs for the days that have a weight reading
pub fn weight_series(points: &[ChartPoint]) -> Vec<(String, f64)> {
    points
        .iter()
        .filter_map(|p| p.peso.map(|peso| (format_day_label(p.data), peso)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn day(d: u32, kcal: f64, prot: f64, carbs: f64, fat: f64) -> DailyNutritionSummary {
        DailyNutritionSummary {
            aluno_id: "a1".to_string(),
            data: date(d),
            calorias_consumidas: kcal,
            proteinas_consumidas: prot,
            carboidratos_consumidos: carbs,
            gorduras_consumidas: fat,
            ..Default::default()
        }
    }

    fn metric(d: u32, peso: f64, gordura: Option<f64>) -> BodyMetric {
        BodyMetric {
            id: format!("m{}", d),
            aluno_id: "a1".to_string(),
            data: date(d),
            peso_kg: peso,
            percentual_gordura: gordura,
            cintura_cm: None,
            massa_muscular_kg: None,
        }
    }

    #[test]
    fn test_day_label_and_week_start() {
        assert_eq!(format_day_label(date(7)), "07/05");
        // 2024-05-09 is a Thursday
        assert_eq!(week_start(date(9)), date(6));
        assert_eq!(week_start(date(6)), date(6));
        assert_eq!(week_start(date(12)), date(6));
    }

    #[test]
    fn test_toggle_hides_only_that_series() {
        let mut chart = MacroChart::from_days(&[
            day(6, 2000.0, 150.0, 220.0, 60.0),
            day(7, 1800.0, 140.0, 190.0, 55.0),
        ]);
        let before: Vec<Series> = chart.series().to_vec();

        assert!(!chart.toggle(Macro::Protein));
        assert!(!chart.is_visible(Macro::Protein));

        let visible = chart.visible_series();
        assert_eq!(visible.len(), 3);
        assert!(visible.iter().all(|s| s.metric != Macro::Protein));
        for series in visible {
            let original = before.iter().find(|s| s.metric == series.metric).unwrap();
            assert_eq!(series.values, original.values);
        }

        assert!(chart.toggle(Macro::Protein));
        assert_eq!(chart.visible_series().len(), 4);
        assert_eq!(chart.labels, vec!["06/05", "07/05"]);
    }

    #[test]
    fn test_legend_keys() {
        assert_eq!(Macro::from_key('1'), Some(Macro::Calories));
        assert_eq!(Macro::from_key('4'), Some(Macro::Fat));
        assert_eq!(Macro::from_key('5'), None);
    }

    #[test]
    fn test_metric_delta_sorts_by_date() {
        let samples = vec![
            metric(15, 81.2, Some(19.0)),
            metric(1, 83.0, None),
            metric(8, 82.0, Some(20.0)),
        ];

        let delta = metric_delta(&samples).unwrap();
        assert_eq!(delta.from, date(8));
        assert_eq!(delta.to, date(15));
        assert!((delta.peso_kg - (-0.8)).abs() < 1e-9);
        assert_eq!(delta.percentual_gordura, Some(-1.0));
        assert_eq!(delta.cintura_cm, None);
    }

    #[test]
    fn test_metric_delta_needs_two_samples() {
        assert_eq!(metric_delta(&[]), None);
        assert_eq!(metric_delta(&[metric(1, 80.0, None)]), None);
    }

    #[test]
    fn test_weight_series_skips_missing_readings() {
        let points = vec![
            ChartPoint {
                data: date(1),
                peso: Some(80.5),
                calorias: None,
                proteinas: None,
                treinos: None,
            },
            ChartPoint {
                data: date(2),
                peso: None,
                calorias: Some(2100.0),
                proteinas: None,
                treinos: Some(1),
            },
        ];

        assert_eq!(weight_series(&points), vec![("01/05".to_string(), 80.5)]);
    }
}
