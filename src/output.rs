//! Rendering and persistence of charts.
//!
//! Charts are drawn to PNG with plotters; the per-capita series behind a
//! chart can also be written out as CSV.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::combinators::LogCoord;
use plotters::coord::types::RangedCoordf64;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::{FontTransform, register_font};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analyzers::types::Direction;
use crate::constants::{DPI, FIGURE_SIZE};
use crate::error::DataError;
use crate::plots::{ChartSpec, Series, SeriesKind, days_between};

const FONT_FAMILY: &str = "sans-serif";
const ARROW_LENGTH: i32 = 20;
const ARROW_HEAD: i32 = 7;
const REFERENCE_COLORS: [RGBColor; 3] = [RGBColor(0, 0, 0), RGBColor(100, 100, 100), RGBColor(170, 170, 170)];
/// Dash and gap lengths in pixels of the reference lines.
const REFERENCE_DASHES: [(i32, i32); 3] = [(8, 4), (4, 3), (2, 2)];
const OVERLAY_DOTS: (i32, i32) = (2, 3);

/// Image size in pixels.
pub fn figure_pixels() -> (u32, u32) {
    (
        (FIGURE_SIZE.0 * DPI as f64).round() as u32,
        (FIGURE_SIZE.1 * DPI as f64).round() as u32,
    )
}

/// Registers the first readable TrueType file in `candidates` as the
/// sans-serif font. The bitmap backend ships no font of its own.
pub fn load_font(candidates: &[String]) -> Result<PathBuf> {
    for candidate in candidates {
        let Ok(bytes) = std::fs::read(candidate) else {
            debug!(font = %candidate, "Font not found");
            continue;
        };
        // plotters keeps registered fonts for the rest of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!(font = %candidate, "Font registered");
                return Ok(PathBuf::from(candidate));
            }
            Err(_) => warn!(font = %candidate, "Not a usable font"),
        }
    }
    Err(DataError::NoFont(candidates.to_vec()).into())
}

fn series_color(index: usize) -> RGBAColor {
    Palette99::pick(index).to_rgba()
}

/// Line style plus an optional `(dash, gap)` pattern.
#[derive(Clone, Copy)]
struct Pen {
    style: ShapeStyle,
    dashes: Option<(i32, i32)>,
}

fn series_pen(series: &Series) -> Pen {
    let color = series_color(series.color);
    match series.kind {
        SeriesKind::Primary => Pen {
            style: color.stroke_width(2),
            dashes: None,
        },
        SeriesKind::Overlay => Pen {
            style: color.mix(0.5).stroke_width(1),
            dashes: Some(OVERLAY_DOTS),
        },
    }
}

fn overlay_legend_pen() -> Pen {
    Pen {
        style: BLACK.mix(0.5).stroke_width(1),
        dashes: Some(OVERLAY_DOTS),
    }
}

fn reference_pen(index: usize) -> Pen {
    Pen {
        style: REFERENCE_COLORS[index % REFERENCE_COLORS.len()].stroke_width(1),
        dashes: Some(REFERENCE_DASHES[index % REFERENCE_DASHES.len()]),
    }
}

/// Draws `spec` and saves it as `<dir>/<file_stem>.png`.
#[tracing::instrument(skip(spec), fields(chart = %spec.file_stem))]
pub fn render_png(spec: &ChartSpec, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.png", spec.file_stem));

    let root = BitMapBackend::new(&path, figure_pixels()).into_drawing_area();
    draw_chart(spec, &root)?;
    root.present()?;
    drop(root);

    info!(path = %path.display(), "Chart saved");
    Ok(path)
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type Plot<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, LogCoord<f64>>>;

fn draw_chart(spec: &ChartSpec, root: &Area<'_>) -> Result<()> {
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (plot_area, legend_area) = root.split_horizontally(width * 3 / 4);

    let origin = spec.x_range.0;
    let x0 = days_between(origin, spec.axis_start);
    let x1 = days_between(origin, spec.x_range.1);
    let (y0, y1) = spec.y_range;

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, (y0..y1).log_scale())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(8)
        .x_label_formatter(&|x: &f64| format_day(origin, *x))
        .y_desc(spec.y_label.as_str())
        .draw()?;

    draw_lines(&mut chart, spec)?;

    let font = (FONT_FAMILY, 11).into_font();
    for annotation in spec.annotations.iter().filter(|a| spec.shows(a.date)) {
        let color = series_color(annotation.color);
        let at = (days_between(origin, annotation.date), annotation.value);
        let (rotation, text_pos) = match annotation.direction {
            Direction::Up => (FontTransform::Rotate270, (-6, -ARROW_LENGTH - 2)),
            Direction::Down => (FontTransform::Rotate90, (6, ARROW_LENGTH + 2)),
        };
        chart.draw_series(std::iter::once(
            EmptyElement::at(at)
                + Text::new(
                    annotation.label.clone(),
                    text_pos,
                    font.clone().transform(rotation).color(&color),
                ),
        ))?;
    }

    let note = (FONT_FAMILY, 12).into_font().color(&BLACK);
    for (i, line) in spec.as_of.lines().enumerate() {
        plot_area.draw(&Text::new(line, (80, 20 + 14 * i as i32), note.clone()))?;
    }

    draw_legend(&legend_area, spec)
}

/// Draws the series, reference lines and annotation arrows. Plotters does not
/// clip to the chart ranges, so only points on visible dates are drawn.
fn draw_lines(chart: &mut Plot<'_, '_>, spec: &ChartSpec) -> Result<()> {
    let origin = spec.x_range.0;

    for series in &spec.series {
        for segment in series.segments(origin, spec.visible_dates()) {
            draw_path(chart, segment, series_pen(series))?;
        }
    }

    for (i, line) in spec.reference_lines.iter().enumerate() {
        draw_path(chart, vec![line.start, line.end], reference_pen(i))?;
    }

    for annotation in spec.annotations.iter().filter(|a| spec.shows(a.date)) {
        let color = series_color(annotation.color);
        let at = (days_between(origin, annotation.date), annotation.value);
        let (tail, head) = match annotation.direction {
            Direction::Up => (-ARROW_LENGTH, -ARROW_HEAD),
            Direction::Down => (ARROW_LENGTH, ARROW_HEAD),
        };
        chart.draw_series(std::iter::once(
            EmptyElement::at(at)
                + PathElement::new(vec![(0, tail), (0, 0)], color.stroke_width(1))
                + Polygon::new(vec![(0, 0), (-3, head), (3, head)], color.filled()),
        ))?;
    }
    Ok(())
}

fn draw_path(chart: &mut Plot<'_, '_>, points: Vec<(f64, f64)>, pen: Pen) -> Result<()> {
    match pen.dashes {
        None => chart.draw_series(LineSeries::new(points, pen.style))?,
        Some((dash, gap)) => chart.draw_series(DashedLineSeries::new(points, dash, gap, pen.style))?,
    };
    Ok(())
}

fn draw_legend(area: &Area<'_>, spec: &ChartSpec) -> Result<()> {
    let title = (FONT_FAMILY, 13).into_font().color(&BLACK);
    let entry = (FONT_FAMILY, 11).into_font().color(&BLACK);

    let mut entries: Vec<(String, Pen)> = spec
        .series
        .iter()
        .filter_map(|s| s.label.clone().map(|label| (label, series_pen(s))))
        .collect();
    if let Some(label) = &spec.overlay_label {
        entries.push((label.clone(), overlay_legend_pen()));
    }
    entries.extend(
        spec.reference_lines
            .iter()
            .enumerate()
            .map(|(i, line)| (line.label(), reference_pen(i))),
    );

    let mut y = 30;
    area.draw(&Text::new(spec.legend_title.as_str(), (10, y), title))?;
    for (label, pen) in entries {
        y += 18;
        let sample = vec![(10, y + 6), (30, y + 6)];
        match pen.dashes {
            None => area.draw(&PathElement::new(sample, pen.style))?,
            Some((dash, gap)) => area.draw(&DashedPathElement::new(sample, dash, gap, pen.style))?,
        }
        area.draw(&Text::new(label, (36, y), entry.clone()))?;
    }
    Ok(())
}

fn format_day(origin: NaiveDate, x: f64) -> String {
    (origin + Duration::days(x.round() as i64))
        .format("%b %d")
        .to_string()
}

/// A row of an exported rate series.
#[derive(Debug, Serialize)]
struct RateRecord<'a> {
    entity: &'a str,
    code: &'a str,
    date: NaiveDate,
    value: Option<f64>,
}

/// Writes the primary series of `spec` to `<dir>/<file_stem>.csv`.
pub fn export_rates(spec: &ChartSpec, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.csv", spec.file_stem));
    let mut writer = csv::Writer::from_path(&path)?;

    for series in spec.series.iter().filter(|s| s.kind == SeriesKind::Primary) {
        for (date, value) in &series.points {
            writer.serialize(RateRecord {
                entity: &series.entity,
                code: &series.code,
                date: *date,
                value: *value,
            })?;
        }
    }
    writer.flush()?;

    debug!(path = %path.display(), "Rates exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::reference::solve;
    use crate::constants::FONT_PATHS;
    use crate::plots::Annotation;
    use std::fs;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
    }

    fn spec() -> ChartSpec {
        let series = |kind, label: Option<&str>, values: [Option<f64>; 3]| Series {
            entity: "Italy".to_string(),
            code: "ITA".to_string(),
            label: label.map(str::to_string),
            color: 0,
            kind,
            points: (1..=3).map(date).zip(values).collect(),
        };
        ChartSpec {
            file_stem: "CountriesConfirmed1".to_string(),
            legend_title: "Confirmed cases".to_string(),
            y_label: "Rate per million people".to_string(),
            as_of: "Johns Hopkins CSSE COVID-19 data\nto 2020-03-03".to_string(),
            x_range: (date(1), date(3)),
            axis_start: NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
            y_range: (0.5, 200.0),
            series: vec![
                series(SeriesKind::Primary, Some("ITA: 6k/60M"), [Some(1.0), None, Some(100.0)]),
                series(SeriesKind::Overlay, None, [Some(0.6), Some(0.7), Some(0.8)]),
            ],
            overlay_label: Some("Deaths".to_string()),
            annotations: vec![Annotation {
                label: "lockdown".to_string(),
                date: date(3),
                value: 100.0,
                direction: Direction::Down,
                color: 0,
            }],
            reference_lines: vec![solve(0.4, (0.0, 2.0), (0.5, 200.0)).unwrap()],
        }
    }

    #[test]
    fn test_figure_pixels() {
        assert_eq!(figure_pixels(), (816, 432));
    }

    #[test]
    fn test_format_day() {
        assert_eq!(format_day(date(1), 0.0), "Mar 01");
        assert_eq!(format_day(date(1), -1.0), "Feb 29");
        assert_eq!(format_day(date(1), 30.4), "Mar 31");
    }

    #[test]
    fn test_export_rates_primary_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_rates(&spec(), dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "CountriesConfirmed1.csv");
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "entity,code,date,value");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "Italy,ITA,2020-03-01,1.0");
        assert_eq!(lines[2], "Italy,ITA,2020-03-02,");
    }

    #[test]
    fn test_overlay_and_reference_lines_are_dashed() {
        let spec = spec();
        assert_eq!(series_pen(&spec.series[0]).dashes, None);
        assert_eq!(series_pen(&spec.series[1]).dashes, Some(OVERLAY_DOTS));
        assert_eq!(overlay_legend_pen().dashes, Some(OVERLAY_DOTS));

        let first = reference_pen(0).dashes;
        let second = reference_pen(1).dashes;
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn test_lines_stay_inside_plot_area() {
        let mut spec = spec();
        spec.x_range = (date(10), date(20));
        spec.axis_start = date(10);
        spec.y_range = (1.0, 1000.0);
        let line = |kind, scale: f64| Series {
            entity: "Ontario".to_string(),
            code: "ON".to_string(),
            label: None,
            color: 0,
            kind,
            points: (1..=20)
                .map(|d| {
                    let value = if d < 10 { 0.01 } else { (d - 9) as f64 * 50.0 * scale };
                    (date(d), Some(value))
                })
                .collect(),
        };
        spec.series = vec![line(SeriesKind::Primary, 1.0), line(SeriesKind::Overlay, 0.5)];
        spec.annotations = vec![Annotation {
            label: "before the axis".to_string(),
            date: date(5),
            value: 0.01,
            direction: Direction::Up,
            color: 0,
        }];
        spec.reference_lines = vec![
            solve(0.1, (0.0, 10.0), spec.y_range).unwrap(),
            solve(0.4, (0.0, 10.0), spec.y_range).unwrap(),
        ];

        let (width, height, margin) = (400u32, 300u32, 40u32);
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            let mut chart = ChartBuilder::on(&root)
                .margin(margin)
                .build_cartesian_2d(0.0..10.0, (1.0..1000.0).log_scale())
                .unwrap();
            draw_lines(&mut chart, &spec).unwrap();
            root.present().unwrap();
        }

        // strokes may spill a few pixels over the edge
        let inside = |x: u32, y: u32| {
            (margin - 3..width - margin + 3).contains(&x) && (margin - 3..height - margin + 3).contains(&y)
        };
        let stray = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| !inside(x, y))
            .filter(|&(x, y)| {
                let i = ((y * width + x) * 3) as usize;
                buffer[i..i + 3] != [255, 255, 255]
            })
            .count();
        assert_eq!(stray, 0);

        let drawn = (0..width * height)
            .filter(|p| buffer[(*p * 3) as usize..(*p * 3 + 3) as usize] != [255, 255, 255])
            .count();
        assert!(drawn > 0);
    }

    #[test]
    fn test_load_font_without_candidates() {
        let result = load_font(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_font_rejects_non_font() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), b"not a font").unwrap();
        let result = load_font(&[file.path().to_str().unwrap().to_string()]);
        assert!(result.is_err());
    }

    #[test]
    #[ignore = "needs a system TrueType font from FONT_PATHS"]
    fn test_render_png() {
        let fonts: Vec<String> = FONT_PATHS.iter().map(|p| p.to_string()).collect();
        load_font(&fonts).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = render_png(&spec(), dir.path()).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
