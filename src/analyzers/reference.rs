//! Reference lines for an assumed constant daily growth rate.
//!
//! A line reaches the top-right corner of the plot window and runs backwards
//! at rate `r` until it meets either the bottom or the left edge, so it reads
//! as "growth at exactly r per day" whatever the scale of the data.

use crate::error::{DataError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub rate: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl ReferenceLine {
    pub fn label(&self) -> String {
        format!("{:.0}%/day", 100.0 * self.rate)
    }
}

/// Places the line for `rate` inside `x_range` × `y_range` (y on a log axis).
///
/// # Errors
///
/// Fails with [`DataError::InvalidPlotWindow`] for a non-positive rate or an
/// empty or non-positive window.
pub fn solve(rate: f64, x_range: (f64, f64), y_range: (f64, f64)) -> Result<ReferenceLine> {
    let (x0, x1) = x_range;
    let (y0, y1) = y_range;

    if !(rate > 0.0) {
        return Err(DataError::InvalidPlotWindow(format!("growth rate {rate}")));
    }
    if !(x1 > x0) {
        return Err(DataError::InvalidPlotWindow(format!("x range {x0}..{x1}")));
    }
    if !(y0 > 0.0 && y1 > y0) {
        return Err(DataError::InvalidPlotWindow(format!("y range {y0}..{y1}")));
    }

    let growth = 1.0 + rate;
    let x = x1 - (y1 / y0).ln() / growth.ln();
    let start = if x < x0 {
        (x0, y1 / growth.powf(x1 - x0))
    } else {
        (x, y0)
    };

    Ok(ReferenceLine {
        rate,
        start,
        end: (x1, y1),
    })
}

pub fn reference_lines(
    rates: &[f64],
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Result<Vec<ReferenceLine>> {
    rates.iter().map(|r| solve(*r, x_range, y_range)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ends_at_top_right() {
        let windows = [
            ((0.0, 60.0), (0.01, 1000.0)),
            ((0.0, 10.0), (0.01, 1000.0)),
            ((-1.0, 120.0), (1.0, 2.0)),
            ((5.0, 6.0), (1e-3, 1e6)),
        ];
        for rate in [0.05, 0.1, 0.4, 1.0] {
            for (x_range, y_range) in windows {
                let line = solve(rate, x_range, y_range).unwrap();
                assert_eq!(line.end, (x_range.1, y_range.1));
                assert!(line.start.0 >= x_range.0);
                assert!(line.start.1 >= y_range.0 * (1.0 - 1e-12));
                assert!(line.start.0 <= line.end.0);
            }
        }
    }

    #[test]
    fn test_line_hits_bottom_edge() {
        // 10%/day from 1 to 1.1^10 takes exactly 10 days
        let y1 = 1.1f64.powi(10);
        let line = solve(0.1, (0.0, 100.0), (1.0, y1)).unwrap();
        assert!((line.start.0 - 90.0).abs() < 1e-9);
        assert_eq!(line.start.1, 1.0);
    }

    #[test]
    fn test_line_clamped_to_left_edge() {
        let line = solve(0.1, (0.0, 10.0), (1.0, 1e6)).unwrap();
        assert_eq!(line.start.0, 0.0);
        assert!((line.start.1 - 1e6 / 1.1f64.powi(10)).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_window() {
        assert!(solve(0.0, (0.0, 1.0), (1.0, 2.0)).is_err());
        assert!(solve(0.1, (1.0, 1.0), (1.0, 2.0)).is_err());
        assert!(solve(0.1, (0.0, 1.0), (0.0, 2.0)).is_err());
        assert!(solve(0.1, (0.0, 1.0), (2.0, 1.0)).is_err());
    }

    #[test]
    fn test_label() {
        let lines = reference_lines(&[0.1, 0.4], (0.0, 30.0), (0.1, 100.0)).unwrap();
        let labels: Vec<_> = lines.iter().map(ReferenceLine::label).collect();
        assert_eq!(labels, vec!["10%/day", "40%/day"]);
    }
}
