//! Domain errors raised while reading, reshaping and plotting the data.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("table has no date columns")]
    NoDates,

    #[error("date column '{0}' is not later than the column before it")]
    UnorderedDates(String),

    #[error("invalid number '{value}' in column '{column}' on line {line}")]
    InvalidNumber {
        column: String,
        line: usize,
        value: String,
    },

    #[error("invalid event on line {line}: {reason}")]
    InvalidEvent { line: usize, reason: String },

    #[error("no population data for '{name}' (best matches: {})", .suggestions.join(", "))]
    UnknownEntity {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("no time series for '{0}'")]
    UnknownSeries(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("rolling window must be at least 1")]
    InvalidWindow,

    #[error("invalid plot window: {0}")]
    InvalidPlotWindow(String),

    #[error("no usable font found (tried: {})", .0.join(", "))]
    NoFont(Vec<String>),
}

pub type Result<T> = std::result::Result<T, DataError>;
