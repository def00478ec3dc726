//! Assembly of chart descriptions from the reshaped tables.
//!
//! A [`ChartSpec`] holds everything the renderer draws: the per-capita
//! series, event annotations, reference lines and axis limits. Building it
//! is pure data work, so it is tested without touching an image backend.

use chrono::{Duration, NaiveDate};
use tracing::{debug, instrument};

use crate::analyzers::rates::{PopulationTable, per_million};
use crate::analyzers::reference::{ReferenceLine, reference_lines};
use crate::analyzers::types::{Direction, EntityTable, Event, Metric, Population, Scope};
use crate::constants::{AS_OF_SOURCE, PROVINCE_LEAD_DAYS};
use crate::error::{DataError, Result};

/// Fraction of the log-scaled data range added above and below.
const Y_MARGIN: f64 = 0.05;
/// Axis limits of a chart with nothing to draw.
const EMPTY_Y_RANGE: (f64, f64) = (1.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// The plotted metric, one legend entry per entity.
    Primary,
    /// Deaths drawn faintly under the confirmed cases.
    Overlay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub entity: String,
    pub code: String,
    pub label: Option<String>,
    pub color: usize,
    pub kind: SeriesKind,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl Series {
    /// Runs of drawable points as `(days since origin, value)`, limited to
    /// dates within `visible`. Missing and non-positive values cannot sit on a
    /// log axis and split the line.
    pub fn segments(&self, origin: NaiveDate, visible: (NaiveDate, NaiveDate)) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        let points = self
            .points
            .iter()
            .filter(|(date, _)| *date >= visible.0 && *date <= visible.1);
        for (date, value) in points {
            match value {
                Some(v) if *v > 0.0 => current.push((days_between(origin, *date), *v)),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub label: String,
    pub date: NaiveDate,
    pub value: f64,
    pub direction: Direction,
    pub color: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub file_stem: String,
    pub legend_title: String,
    pub y_label: String,
    pub as_of: String,
    /// Data window; reference line x coordinates are days since its start.
    pub x_range: (NaiveDate, NaiveDate),
    /// First date shown on the axis.
    pub axis_start: NaiveDate,
    pub y_range: (f64, f64),
    pub series: Vec<Series>,
    /// Legend entry standing for all overlay series.
    pub overlay_label: Option<String>,
    pub annotations: Vec<Annotation>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ChartSpec {
    /// Dates drawn on the x-axis, both ends included.
    pub fn visible_dates(&self) -> (NaiveDate, NaiveDate) {
        (self.axis_start, self.x_range.1)
    }

    pub fn shows(&self, date: NaiveDate) -> bool {
        let (from, to) = self.visible_dates();
        date >= from && date <= to
    }
}

/// How a chart is drawn, independent of the entities on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub scope: Scope,
    pub metric: Metric,
    /// Smoothed daily changes instead of cumulative counts.
    pub daily: bool,
    pub window: usize,
    pub reference_rates: Vec<f64>,
    /// Group number in the file name, if any.
    pub variant: Option<usize>,
}

impl ChartOptions {
    pub fn file_stem(&self) -> String {
        let daily = if self.daily { "Daily" } else { "" };
        let variant = self.variant.map(|v| v.to_string()).unwrap_or_default();
        format!("{}{}{}{}", self.scope, self.metric, daily, variant)
    }

    fn y_label(&self) -> String {
        if self.daily {
            format!("Daily rate per million people ({}-day average)", self.window)
        } else {
            "Rate per million people".to_string()
        }
    }
}

pub fn days_between(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

/// Legend text: short code, headline count in thousands and population in
/// millions. Provinces are small enough to need a decimal.
pub fn legend_label(scope: Scope, population: &Population, headline: f64) -> String {
    match scope {
        Scope::Countries => format!(
            "{}: {}k/{}M",
            population.code,
            (headline / 1e3).trunc() as i64,
            population.millions().trunc() as i64
        ),
        Scope::Provinces => format!(
            "{}: {:.1}k/{:.1}M",
            population.code,
            headline / 1e3,
            population.millions()
        ),
    }
}

/// Builds the chart of `entities` from `primary`, optionally overlaid with
/// `overlay` (deaths under confirmed cases).
///
/// # Errors
///
/// Fails if an entity has no series or no population, or if nothing on the
/// chart is drawable.
#[instrument(skip_all, fields(chart = %options.file_stem(), entities = entities.len()))]
pub fn build_chart(
    entities: &[String],
    primary: &EntityTable,
    overlay: Option<&EntityTable>,
    populations: &PopulationTable,
    events: &[Event],
    options: &ChartOptions,
) -> Result<ChartSpec> {
    let (Some(&first), Some(&last)) = (primary.dates.first(), primary.dates.last()) else {
        return Err(DataError::InvalidPlotWindow("no dates to plot".to_string()));
    };

    let mut series = Vec::new();
    let mut annotations = Vec::new();

    for (color, entity) in entities.iter().enumerate() {
        let row = primary.get(entity)?;
        let population = populations.lookup(entity)?;
        let rates = per_million(&row.values, population);

        let headline = if options.daily { row.peak() } else { row.latest() };
        let label = legend_label(options.scope, population, headline.unwrap_or(0.0));

        for event in events.iter().filter(|e| &e.entity == entity) {
            let value = primary
                .date_index(event.date)
                .and_then(|i| rates[i])
                .filter(|v| *v > 0.0);
            match value {
                Some(value) => annotations.push(Annotation {
                    label: event.label.clone(),
                    date: event.date,
                    value,
                    direction: event.direction,
                    color,
                }),
                None => debug!(entity = %entity, event = %event.label, "No value at event date, skipping"),
            }
        }

        series.push(Series {
            entity: entity.clone(),
            code: population.code.clone(),
            label: Some(label),
            color,
            kind: SeriesKind::Primary,
            points: primary.dates.iter().copied().zip(rates).collect(),
        });

        if let Some(overlay) = overlay {
            let row = overlay.get(entity)?;
            series.push(Series {
                entity: entity.clone(),
                code: population.code.clone(),
                label: None,
                color,
                kind: SeriesKind::Overlay,
                points: overlay
                    .dates
                    .iter()
                    .copied()
                    .zip(per_million(&row.values, population))
                    .collect(),
            });
        }
    }

    let start = match options.scope {
        Scope::Countries => first,
        Scope::Provinces => annotations
            .iter()
            .map(|a| a.date)
            .max()
            .map(|latest| (latest - Duration::days(PROVINCE_LEAD_DAYS)).max(first))
            .unwrap_or(first),
    };
    let axis_start = match options.scope {
        Scope::Countries => first - Duration::days(1),
        Scope::Provinces => start,
    };
    annotations.retain(|a| a.date >= start && a.date <= last);

    let y_range = y_limits(&series, start, last);
    let span = days_between(start, last);
    let reference_lines = if span > 0.0 {
        reference_lines(&options.reference_rates, (0.0, span), y_range)?
    } else {
        Vec::new()
    };

    Ok(ChartSpec {
        file_stem: options.file_stem(),
        legend_title: options.metric.title().to_string(),
        y_label: options.y_label(),
        as_of: format!("{AS_OF_SOURCE}\nto {last}"),
        x_range: (start, last),
        axis_start,
        y_range,
        series,
        overlay_label: overlay.map(|_| Metric::Deaths.title().to_string()),
        annotations,
        reference_lines,
    })
}

/// Log-scale limits covering every drawable value between `start` and `end`.
/// A window without positive values gets an empty default axis.
fn y_limits(series: &[Series], start: NaiveDate, end: NaiveDate) -> (f64, f64) {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.points.iter())
        .filter(|(date, _)| *date >= start && *date <= end)
        .filter_map(|(_, v)| v.filter(|v| *v > 0.0))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !lo.is_finite() || !hi.is_finite() {
        debug!(%start, %end, "No positive values to plot, using an empty axis");
        return EMPTY_Y_RANGE;
    }

    let (log_lo, log_hi) = (lo.ln(), hi.ln());
    let pad = if log_hi > log_lo {
        (log_hi - log_lo) * Y_MARGIN
    } else {
        std::f64::consts::LN_2
    };
    ((log_lo - pad).exp(), (log_hi + pad).exp())
}
