//! Reshaping of the case and death tables into plottable per-capita rates.
//!
//! This module cleans the raw JHU CSSE tables, collapses subdivisions into
//! countries, derives smoothed daily changes, scales counts by population
//! and places the growth-rate reference lines.

pub mod aggregate;
pub mod normalize;
pub mod rates;
pub mod reference;
pub mod types;
pub mod utility;
