//! Data types used by the reshaping pipeline.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::constants::{LAT_COLUMN, LONG_COLUMN, PROVINCE_COLUMN};
use crate::error::{DataError, Result};

/// Header formats of date columns, tried in order.
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%Y-%m-%d"];

/// Classification of a source column, decided once from its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Label(String),
    Date(NaiveDate),
}

impl ColumnKind {
    pub fn classify(header: &str) -> Self {
        let header = header.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(header, fmt).ok())
            .map(ColumnKind::Date)
            .unwrap_or_else(|| ColumnKind::Label(header.to_string()))
    }

    /// How cells of this column combine when rows are grouped.
    pub fn reduction(&self) -> Reduction {
        match self {
            ColumnKind::Date(_) => Reduction::Sum,
            ColumnKind::Label(name) if name == LAT_COLUMN || name == LONG_COLUMN => {
                Reduction::Mean
            }
            ColumnKind::Label(name) if name == PROVINCE_COLUMN => Reduction::Join,
            ColumnKind::Label(_) => Reduction::First,
        }
    }
}

/// Per-column strategy used when collapsing several rows into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
    Join,
    First,
}

/// A raw source table: label columns plus cumulative counts per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    pub labels: Vec<String>,
    /// Strictly increasing.
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub labels: Vec<String>,
    pub counts: Vec<f64>,
}

impl TimeSeriesTable {
    /// Position of a label column, failing when the source lacks it.
    pub fn label_index(&self, name: &str) -> Result<usize> {
        self.labels
            .iter()
            .position(|l| l == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// One row per entity; `None` marks a value that must not be plotted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityTable {
    pub labels: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<EntityRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRow {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl EntityTable {
    pub fn get(&self, name: &str) -> Result<&EntityRow> {
        self.rows
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| DataError::UnknownSeries(name.to_string()))
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }
}

impl EntityRow {
    /// Last valid value of the series.
    pub fn latest(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    pub fn peak(&self) -> Option<f64> {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

/// Population of an entity and the short code shown in legends.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub count: f64,
    pub code: String,
}

impl Population {
    pub fn millions(&self) -> f64 {
        self.count / 1e6
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown arrow direction '{other}'")),
        }
    }
}

/// A policy action shown as an annotation on the entity's line.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub entity: String,
    pub label: String,
    pub date: NaiveDate,
    pub direction: Direction,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Metric {
    Confirmed,
    Deaths,
}

impl Metric {
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed cases",
            Metric::Deaths => "Deaths",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Confirmed => write!(f, "Confirmed"),
            Metric::Deaths => write!(f, "Deaths"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Countries,
    Provinces,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Countries => write!(f, "Countries"),
            Scope::Provinces => write!(f, "Provinces"),
        }
    }
}
