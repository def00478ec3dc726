//! End-to-end chart production: load the sources, reshape them and assemble
//! one [`ChartSpec`] per output image.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::analyzers::aggregate::{by_country, daily, subdivisions};
use crate::analyzers::normalize::normalize;
use crate::analyzers::rates::PopulationTable;
use crate::analyzers::types::{EntityTable, Event, Metric, Scope, TimeSeriesTable};
use crate::config::{PlotConfig, Sources};
use crate::constants::{EVENTS, PROVINCE_COUNTRY};
use crate::fetch::{HttpClient, load_source};
use crate::output::{export_rates, render_png};
use crate::parser::{parse_events, parse_province_population, parse_time_series, parse_world_population};
use crate::plots::{ChartOptions, ChartSpec, build_chart};

/// Every table a run needs, cleaned and ready to aggregate.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub cases: TimeSeriesTable,
    pub deaths: TimeSeriesTable,
    pub populations: PopulationTable,
    /// Only loaded when the provinces chart is requested.
    pub provinces: Option<PopulationTable>,
    pub events: Vec<Event>,
}

impl Dataset {
    /// Loads every source one after the other; the first failure aborts.
    #[instrument(skip_all, fields(with_provinces = with_provinces))]
    pub fn fetch<C: HttpClient>(client: &C, sources: &Sources, with_provinces: bool) -> Result<Self> {
        let cases = load_source(client, &sources.cases)?;
        let deaths = load_source(client, &sources.deaths)?;
        let population = load_source(client, &sources.population)?;
        let provinces = if with_provinces {
            Some(load_source(client, &sources.province_population)?)
        } else {
            None
        };

        Self::from_texts(&cases, &deaths, &population, provinces.as_deref())
    }

    /// Parses and normalizes already loaded sources. The event table is the
    /// embedded one.
    pub fn from_texts(
        cases: &str,
        deaths: &str,
        population: &str,
        province_population: Option<&str>,
    ) -> Result<Self> {
        let cases = normalize(parse_time_series(cases).context("confirmed cases table")?)?;
        let deaths = normalize(parse_time_series(deaths).context("deaths table")?)?;
        let populations = parse_world_population(population).context("population table")?;
        let provinces = province_population
            .map(parse_province_population)
            .transpose()
            .context("province population table")?;
        let events = parse_events(EVENTS)?;

        info!(
            cases = cases.rows.len(),
            deaths = deaths.rows.len(),
            dates = cases.dates.len(),
            populations = populations.len(),
            events = events.len(),
            "Dataset ready"
        );

        Ok(Self {
            cases,
            deaths,
            populations,
            provinces,
            events,
        })
    }

    fn table(&self, metric: Metric) -> &TimeSeriesTable {
        match metric {
            Metric::Confirmed => &self.cases,
            Metric::Deaths => &self.deaths,
        }
    }
}

/// Confirmed charts carry deaths underneath; deaths charts stand alone.
fn overlay_metric(metric: Metric) -> Option<Metric> {
    match metric {
        Metric::Confirmed => Some(Metric::Deaths),
        Metric::Deaths => None,
    }
}

fn smoothed(table: EntityTable, daily_rates: bool, window: usize) -> crate::error::Result<EntityTable> {
    if daily_rates { daily(&table, window) } else { Ok(table) }
}

/// One chart per configured country group, numbered from 1.
#[instrument(skip(dataset, config))]
pub fn country_charts(
    dataset: &Dataset,
    config: &PlotConfig,
    metric: Metric,
    daily_rates: bool,
) -> Result<Vec<ChartSpec>> {
    let primary = smoothed(by_country(dataset.table(metric))?, daily_rates, config.window)?;
    let overlay = overlay_metric(metric)
        .map(|m| smoothed(by_country(dataset.table(m))?, daily_rates, config.window))
        .transpose()?;

    config
        .country_groups
        .iter()
        .enumerate()
        .map(|(i, group)| -> Result<ChartSpec> {
            let options = ChartOptions {
                scope: Scope::Countries,
                metric,
                daily: daily_rates,
                window: config.window,
                reference_rates: config.reference_rates.clone(),
                variant: Some(i + 1),
            };
            let chart = build_chart(
                group,
                &primary,
                overlay.as_ref(),
                &dataset.populations,
                &dataset.events,
                &options,
            )?;
            Ok(chart)
        })
        .collect()
}

/// The chart of the provinces with the most cumulative cases or deaths.
#[instrument(skip(dataset, config))]
pub fn province_chart(
    dataset: &Dataset,
    config: &PlotConfig,
    metric: Metric,
    daily_rates: bool,
) -> Result<ChartSpec> {
    let populations = dataset
        .provinces
        .as_ref()
        .context("province populations were not loaded")?;

    let cumulative = subdivisions(dataset.table(metric), PROVINCE_COUNTRY)?;
    let provinces: Vec<String> = cumulative
        .names()
        .take(config.province_count)
        .map(str::to_string)
        .collect();
    info!(?provinces, "Provinces selected");

    let primary = smoothed(cumulative, daily_rates, config.window)?;
    let overlay = overlay_metric(metric)
        .map(|m| {
            smoothed(
                subdivisions(dataset.table(m), PROVINCE_COUNTRY)?,
                daily_rates,
                config.window,
            )
        })
        .transpose()?;

    let options = ChartOptions {
        scope: Scope::Provinces,
        metric,
        daily: daily_rates,
        window: config.window,
        reference_rates: config.reference_rates.clone(),
        variant: None,
    };
    let chart = build_chart(
        &provinces,
        &primary,
        overlay.as_ref(),
        populations,
        &dataset.events,
        &options,
    )?;
    Ok(chart)
}

/// Renders `spec` into `output_dir`, plus its rates as CSV when `export` is
/// set. Returns every file written.
pub fn write_chart(spec: &ChartSpec, output_dir: &Path, export: bool) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let mut written = vec![render_png(spec, output_dir)?];
    if export {
        written.push(export_rates(spec, output_dir)?);
    }
    Ok(written)
}
