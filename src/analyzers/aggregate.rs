use crate::analyzers::types::{
    ColumnKind, EntityRow, EntityTable, Reduction, TableRow, TimeSeriesTable,
};
use crate::analyzers::utility::{first_difference, mean, rolling_mean};
use crate::constants::{COUNTRY_COLUMN, LAT_COLUMN, LONG_COLUMN, PROVINCE_COLUMN};
use crate::error::{DataError, Result};
use std::collections::BTreeMap;
use tracing::debug;

impl Reduction {
    /// Combines the label cells of grouped rows.
    pub fn reduce_labels(&self, cells: &[&str]) -> String {
        match self {
            Reduction::Join => cells.join(","),
            Reduction::Mean | Reduction::Sum => {
                let numbers: Vec<f64> = cells.iter().filter_map(|c| c.trim().parse().ok()).collect();
                if numbers.is_empty() {
                    return String::new();
                }
                match self {
                    Reduction::Mean => mean(&numbers).to_string(),
                    _ => numbers.iter().sum::<f64>().to_string(),
                }
            }
            Reduction::First => cells.first().map(|c| c.to_string()).unwrap_or_default(),
        }
    }

    /// Combines the counts of grouped rows for one date.
    pub fn reduce_counts(&self, cells: &[f64]) -> f64 {
        match self {
            Reduction::Sum => cells.iter().sum(),
            Reduction::Mean => mean(cells),
            Reduction::Join | Reduction::First => cells.first().copied().unwrap_or(0.0),
        }
    }
}

/// Collapses subdivision rows into one row per country, sorted by country.
///
/// Each label column is reduced with the strategy its classification selects;
/// date columns are summed.
pub fn by_country(table: &TimeSeriesTable) -> Result<EntityTable> {
    let country = table.label_index(COUNTRY_COLUMN)?;

    let mut groups: BTreeMap<&str, Vec<&TableRow>> = BTreeMap::new();
    for row in &table.rows {
        groups.entry(row.labels[country].as_str()).or_default().push(row);
    }

    let label_columns: Vec<(usize, Reduction)> = table
        .labels
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != country)
        .map(|(i, name)| (i, ColumnKind::Label(name.clone()).reduction()))
        .collect();
    let date_reduction = table
        .dates
        .first()
        .map(|d| ColumnKind::Date(*d).reduction())
        .unwrap_or(Reduction::Sum);

    let rows = groups
        .into_iter()
        .map(|(name, members)| {
            let labels = label_columns
                .iter()
                .map(|(i, reduction)| {
                    let cells: Vec<&str> = members.iter().map(|r| r.labels[*i].as_str()).collect();
                    reduction.reduce_labels(&cells)
                })
                .collect();

            let values = (0..table.dates.len())
                .map(|d| {
                    let cells: Vec<f64> = members.iter().map(|r| r.counts[d]).collect();
                    Some(date_reduction.reduce_counts(&cells))
                })
                .collect();

            EntityRow {
                name: name.to_string(),
                labels,
                values,
            }
        })
        .collect::<Vec<_>>();

    debug!(countries = rows.len(), "Rows aggregated by country");

    Ok(EntityTable {
        labels: label_columns
            .iter()
            .map(|(i, _)| table.labels[*i].clone())
            .collect(),
        dates: table.dates.clone(),
        rows,
    })
}

/// Rows of one country keyed by subdivision, largest latest count first.
pub fn subdivisions(table: &TimeSeriesTable, country_name: &str) -> Result<EntityTable> {
    let country = table.label_index(COUNTRY_COLUMN)?;
    let province = table.label_index(PROVINCE_COLUMN)?;

    let kept: Vec<usize> = table
        .labels
        .iter()
        .enumerate()
        .filter(|(_, l)| ![COUNTRY_COLUMN, PROVINCE_COLUMN, LAT_COLUMN, LONG_COLUMN].contains(&l.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut rows: Vec<EntityRow> = table
        .rows
        .iter()
        .filter(|r| r.labels[country] == country_name && !r.labels[province].is_empty())
        .map(|r| EntityRow {
            name: r.labels[province].clone(),
            labels: kept.iter().map(|i| r.labels[*i].clone()).collect(),
            values: r.counts.iter().copied().map(Some).collect(),
        })
        .collect();

    if rows.is_empty() {
        return Err(DataError::UnknownSeries(country_name.to_string()));
    }

    rows.sort_by(|a, b| {
        let a = a.latest().unwrap_or(0.0);
        let b = b.latest().unwrap_or(0.0);
        b.total_cmp(&a)
    });

    Ok(EntityTable {
        labels: kept.iter().map(|i| table.labels[*i].clone()).collect(),
        dates: table.dates.clone(),
        rows,
    })
}

/// Replaces cumulative counts with the centered rolling mean of daily changes.
///
/// Zero means become missing. Dates without a complete window are dropped,
/// so the result covers `dates[1 + window / 2 ..len - window / 2]`.
pub fn daily(table: &EntityTable, window: usize) -> Result<EntityTable> {
    if window == 0 {
        return Err(DataError::InvalidWindow);
    }

    let half = window / 2;
    let changed_dates = table.dates.get(1..).unwrap_or_default();
    let range = if changed_dates.len() > 2 * half {
        half..changed_dates.len() - half
    } else {
        0..0
    };

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let smoothed = rolling_mean(&first_difference(&row.values), window);
            EntityRow {
                name: row.name.clone(),
                labels: row.labels.clone(),
                values: smoothed[range.clone()]
                    .iter()
                    .map(|v| v.filter(|x| *x != 0.0))
                    .collect(),
            }
        })
        .collect();

    Ok(EntityTable {
        labels: table.labels.clone(),
        dates: changed_dates[range].to_vec(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    fn raw_table() -> TimeSeriesTable {
        let row = |p: &str, c: &str, lat: &str, counts: Vec<f64>| TableRow {
            labels: vec![p.to_string(), c.to_string(), lat.to_string(), "0".to_string()],
            counts,
        };
        TimeSeriesTable {
            labels: vec![
                PROVINCE_COLUMN.to_string(),
                COUNTRY_COLUMN.to_string(),
                LAT_COLUMN.to_string(),
                LONG_COLUMN.to_string(),
            ],
            dates: dates(3),
            rows: vec![
                row("Ontario", "Canada", "50", vec![1.0, 2.0, 3.0]),
                row("Quebec", "Canada", "46", vec![10.0, 20.0, 40.0]),
                row("", "Italy", "41.9", vec![5.0, 6.0, 7.0]),
            ],
        }
    }

    #[test]
    fn test_reduce_labels() {
        assert_eq!(Reduction::Join.reduce_labels(&["a", "b"]), "a,b");
        assert_eq!(Reduction::Mean.reduce_labels(&["50", "46"]), "48");
        assert_eq!(Reduction::First.reduce_labels(&["x", "y"]), "x");
        assert_eq!(Reduction::Mean.reduce_labels(&["", "n/a"]), "");
    }

    #[test]
    fn test_by_country() {
        let table = by_country(&raw_table()).unwrap();

        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Canada", "Italy"]);
        assert_eq!(table.labels, vec![PROVINCE_COLUMN, LAT_COLUMN, LONG_COLUMN]);

        let canada = table.get("Canada").unwrap();
        assert_eq!(canada.labels, vec!["Ontario,Quebec", "48", "0"]);
        assert_eq!(canada.values, vec![Some(11.0), Some(22.0), Some(43.0)]);
    }

    #[test]
    fn test_subdivisions_sorted_by_latest() {
        let table = subdivisions(&raw_table(), "Canada").unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Quebec", "Ontario"]);
        assert!(table.labels.is_empty());
        assert!(subdivisions(&raw_table(), "Atlantis").is_err());
    }

    #[test]
    fn test_daily_constant_growth() {
        let n = 20;
        let table = EntityTable {
            labels: vec![],
            dates: dates(n),
            rows: vec![EntityRow {
                name: "X".to_string(),
                labels: vec![],
                values: (0..n).map(|i| Some(100.0 + 5.0 * i as f64)).collect(),
            }],
        };

        let smoothed = daily(&table, 7).unwrap();
        // 19 differences, 3 dropped at each end
        assert_eq!(smoothed.dates.len(), 13);
        assert_eq!(smoothed.dates[0], table.dates[4]);
        assert_eq!(smoothed.dates.last(), table.dates.get(n - 4));
        for v in &smoothed.rows[0].values {
            assert!((v.unwrap() - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_daily_zero_is_missing() {
        let table = EntityTable {
            labels: vec![],
            dates: dates(6),
            rows: vec![EntityRow {
                name: "X".to_string(),
                labels: vec![],
                values: vec![Some(1.0); 6],
            }],
        };
        let smoothed = daily(&table, 3).unwrap();
        assert_eq!(smoothed.dates.len(), 3);
        assert!(smoothed.rows[0].values.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_daily_rejects_empty_window() {
        let table = EntityTable::default();
        assert!(matches!(daily(&table, 0), Err(DataError::InvalidWindow)));
    }

    #[test]
    fn test_daily_short_table() {
        let table = EntityTable {
            labels: vec![],
            dates: dates(3),
            rows: vec![EntityRow {
                name: "X".to_string(),
                labels: vec![],
                values: vec![Some(1.0), Some(2.0), Some(3.0)],
            }],
        };
        let smoothed = daily(&table, 7).unwrap();
        assert!(smoothed.dates.is_empty());
        assert!(smoothed.rows[0].values.is_empty());
    }
}
