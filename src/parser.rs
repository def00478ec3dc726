//! CSV and fixed-width parsers for the source tables.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::analyzers::rates::PopulationTable;
use crate::analyzers::types::{ColumnKind, Event, Population, TableRow, TimeSeriesTable};
use crate::constants::{POP_RENAME, SGC_CODES, TAIWAN_CODE, TAIWAN_POPULATION};
use crate::error::{DataError, Result};

/// Parses a JHU CSSE time series CSV.
///
/// Headers are classified once: anything that parses as a date is a date
/// column, everything else a label column.
///
/// # Errors
///
/// Fails if there are no date columns, if dates are not strictly increasing,
/// or if a count cell is not a number. Empty count cells read as zero.
pub fn parse_time_series(text: &str) -> Result<TimeSeriesTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();

    let kinds: Vec<ColumnKind> = headers.iter().map(ColumnKind::classify).collect();

    let mut table = TimeSeriesTable::default();
    for (kind, header) in kinds.iter().zip(headers.iter()) {
        match kind {
            ColumnKind::Label(name) => table.labels.push(name.clone()),
            ColumnKind::Date(date) => {
                if table.dates.last().is_some_and(|last| last >= date) {
                    return Err(DataError::UnorderedDates(header.to_string()));
                }
                table.dates.push(*date);
            }
        }
    }
    if table.dates.is_empty() {
        return Err(DataError::NoDates);
    }

    for (n, record) in rdr.records().enumerate() {
        let record = record?;
        let line = n + 2;
        let mut row = TableRow {
            labels: Vec::with_capacity(table.labels.len()),
            counts: Vec::with_capacity(table.dates.len()),
        };

        for (i, kind) in kinds.iter().enumerate() {
            let cell = record.get(i).unwrap_or("").trim();
            match kind {
                ColumnKind::Label(_) => row.labels.push(cell.to_string()),
                ColumnKind::Date(_) if cell.is_empty() => row.counts.push(0.0),
                ColumnKind::Date(_) => {
                    let count = cell.parse::<f64>().map_err(|_| DataError::InvalidNumber {
                        column: headers.get(i).unwrap_or("").to_string(),
                        line,
                        value: cell.to_string(),
                    })?;
                    row.counts.push(count);
                }
            }
        }
        table.rows.push(row);
    }

    debug!(
        rows = table.rows.len(),
        dates = table.dates.len(),
        "Time series parsed"
    );
    Ok(table)
}

/// A row of the World Bank population table.
#[derive(Debug, Deserialize)]
struct WorldPopulationRecord {
    #[serde(rename = "Country Name")]
    name: String,
    #[serde(rename = "Country Code")]
    code: String,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Value")]
    value: f64,
}

/// Parses the World Bank population CSV, keeping the latest year of every
/// country and renaming countries onto the JHU CSSE names.
pub fn parse_world_population(text: &str) -> Result<PopulationTable> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let mut latest: HashMap<String, WorldPopulationRecord> = HashMap::new();

    for result in rdr.deserialize() {
        let record: WorldPopulationRecord = result?;
        let newer = latest
            .get(&record.code)
            .is_none_or(|existing| existing.year <= record.year);
        if newer {
            latest.insert(record.code.clone(), record);
        }
    }

    let mut table = PopulationTable::new();
    for record in latest.into_values() {
        let name = POP_RENAME
            .iter()
            .find(|(alias, _)| *alias == record.name)
            .map(|(_, name)| name.to_string())
            .unwrap_or(record.name);
        table.insert(
            name,
            Population {
                count: record.value,
                code: record.code,
            },
        );
    }
    table.insert(
        "Taiwan",
        Population {
            count: TAIWAN_POPULATION,
            code: TAIWAN_CODE.to_string(),
        },
    );

    debug!(entries = table.len(), "World population parsed");
    Ok(table)
}

const PROVINCE_CODE_COLUMN: &str = "Geographic code";
const PROVINCE_NAME_COLUMN: &str = "Geographic name";
const PROVINCE_POPULATION_COLUMN: &str = "Population, 2016";

/// Parses the Statistics Canada census table. Footnote rows at the end of the
/// file do not parse and are skipped.
pub fn parse_province_population(text: &str) -> Result<PopulationTable> {
    let text = text.trim_start_matches('\u{feff}');
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let code_col = column(PROVINCE_CODE_COLUMN)?;
    let name_col = column(PROVINCE_NAME_COLUMN)?;
    let pop_col = column(PROVINCE_POPULATION_COLUMN)?;

    let mut table = PopulationTable::new();
    for record in rdr.records() {
        let record = record?;
        let name = record.get(name_col).unwrap_or("").trim();
        let code = record.get(code_col).and_then(|c| c.trim().parse::<u32>().ok());
        let count = record
            .get(pop_col)
            .and_then(|p| p.trim().replace(',', "").parse::<f64>().ok());

        let (Some(code), Some(count)) = (code, count) else {
            debug!(?record, "Skipping non-data row");
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let short = SGC_CODES
            .iter()
            .find(|(sgc, _)| *sgc == code)
            .map(|(_, short)| short.to_string())
            .unwrap_or_else(|| name.to_string());
        table.insert(name, Population { count, code: short });
    }

    debug!(entries = table.len(), "Province population parsed");
    Ok(table)
}

const EVENT_COLUMNS: [&str; 5] = ["country", "event", "date", "arrow", "source"];

/// Parses a fixed-width event table whose cells are right-aligned to the end
/// of their header word. Blank lines are ignored.
pub fn parse_events(text: &str) -> Result<Vec<Event>> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Ok(Vec::new());
    };

    let names: Vec<&str> = header.split_whitespace().collect();
    let mut ends = Vec::new();
    let mut word_end = None;
    for (i, c) in header.chars().enumerate() {
        if c.is_whitespace() {
            if let Some(end) = word_end.take() {
                ends.push(end);
            }
        } else {
            word_end = Some(i + 1);
        }
    }
    ends.extend(word_end);

    let index = |name: &str| {
        names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let [country, event, date, arrow, source] = [
        index(EVENT_COLUMNS[0])?,
        index(EVENT_COLUMNS[1])?,
        index(EVENT_COLUMNS[2])?,
        index(EVENT_COLUMNS[3])?,
        index(EVENT_COLUMNS[4])?,
    ];

    let mut events = Vec::new();
    for (n, line) in lines {
        let line_no = n + 1;
        let cells = split_fixed_width(line, &ends);
        let invalid = |reason: String| DataError::InvalidEvent {
            line: line_no,
            reason,
        };

        let when = NaiveDate::parse_from_str(&cells[date], "%Y-%m-%d")
            .map_err(|e| invalid(format!("date '{}': {e}", cells[date])))?;
        let direction = cells[arrow].parse().map_err(&invalid)?;
        if cells[country].is_empty() || cells[event].is_empty() {
            return Err(invalid("missing country or event".to_string()));
        }

        events.push(Event {
            entity: cells[country].clone(),
            label: cells[event].clone(),
            date: when,
            direction,
            source: cells[source].clone(),
        });
    }

    debug!(events = events.len(), "Events parsed");
    Ok(events)
}

/// Cuts `line` at the column end positions; the last cell takes the rest.
fn split_fixed_width(line: &str, ends: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut start = 0;
    ends.iter()
        .enumerate()
        .map(|(i, end)| {
            let stop = if i + 1 == ends.len() {
                chars.len()
            } else {
                (*end).min(chars.len())
            };
            let cell: String = chars[start.min(stop)..stop].iter().collect();
            start = stop;
            cell.trim().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Direction;
    use crate::constants::EVENTS;

    const SERIES: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Italy,41.9,12.6,0,2,5
Ontario,Canada,51.2,-85.3,1,,3
";

    #[test]
    fn test_parse_time_series() {
        let table = parse_time_series(SERIES).unwrap();
        assert_eq!(table.labels, vec!["Province/State", "Country/Region", "Lat", "Long"]);
        assert_eq!(table.dates.len(), 3);
        assert_eq!(table.last_date(), NaiveDate::from_ymd_opt(2020, 1, 24));
        assert_eq!(table.rows[0].labels[0], "");
        assert_eq!(table.rows[0].counts, vec![0.0, 2.0, 5.0]);
        assert_eq!(table.rows[1].counts, vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_parse_time_series_without_dates() {
        let result = parse_time_series("Province/State,Country/Region\n,Italy\n");
        assert!(matches!(result, Err(DataError::NoDates)));
    }

    #[test]
    fn test_parse_time_series_unordered_dates() {
        let result = parse_time_series("Country/Region,1/23/20,1/22/20\nItaly,1,2\n");
        assert!(matches!(result, Err(DataError::UnorderedDates(d)) if d == "1/22/20"));
    }

    #[test]
    fn test_parse_time_series_bad_count() {
        let result = parse_time_series("Country/Region,1/22/20\nItaly,lots\n");
        match result {
            Err(DataError::InvalidNumber { column, line, value }) => {
                assert_eq!(column, "1/22/20");
                assert_eq!(line, 2);
                assert_eq!(value, "lots");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_world_population_keeps_latest_year() {
        let text = "\
Country Name,Country Code,Year,Value
Italy,ITA,2017,60500000
Italy,ITA,2018,60400000
\"Korea, Rep.\",KOR,2018,51600000
Russian Federation,RUS,2018,144500000
";
        let table = parse_world_population(text).unwrap();
        assert_eq!(table.lookup("Italy").unwrap().count, 60_400_000.0);
        assert_eq!(table.lookup("South Korea").unwrap().code, "KOR");
        assert_eq!(table.lookup("Russia").unwrap().code, "RUS");
        assert_eq!(table.lookup("Taiwan").unwrap().code, "TW");
        assert!(table.lookup("Korea, Rep.").is_err());
    }

    #[test]
    fn test_parse_province_population() {
        let text = "\
Geographic code,Geographic name,\"Population, 2016\"
1,Canada,35151728
35,Ontario,13448494
24,Quebec,8164361

Note:,Footnotes follow
";
        let table = parse_province_population(text).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("Ontario").unwrap().code, "ON");
        assert_eq!(table.lookup("Quebec").unwrap().count, 8_164_361.0);
        assert_eq!(table.lookup("Canada").unwrap().code, "Canada");
    }

    #[test]
    fn test_parse_province_population_missing_column() {
        let result = parse_province_population("Geographic code,Name\n35,Ontario\n");
        assert!(matches!(result, Err(DataError::MissingColumn(_))));
    }

    #[test]
    fn test_parse_embedded_events() {
        let events = parse_events(EVENTS).unwrap();
        assert_eq!(events.len(), 18);

        let first = &events[0];
        assert_eq!(first.entity, "China");
        assert_eq!(first.label, "Wuhan lockdown");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 1, 23).unwrap());
        assert_eq!(first.direction, Direction::Up);

        let bc = events.iter().find(|e| e.entity == "British Columbia").unwrap();
        assert_eq!(bc.label, "state of emergency");
        assert_eq!(bc.direction, Direction::Down);
        assert!(bc.source.ends_with("in_British_Columbia"));
    }

    #[test]
    fn test_parse_events_bad_arrow() {
        let text = "\
country  event        date arrow source
  Italy   test  2020-03-01  left      x
";
        match parse_events(text) {
            Err(DataError::InvalidEvent { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected invalid event, got {other:?}"),
        }
    }
}
