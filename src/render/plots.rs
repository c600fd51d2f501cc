//! Charts drawn with plotters onto PNG bitmaps.

use chrono::{Datelike, Duration, NaiveDate};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

use super::{RenderError, plot_error};
use crate::date_gen::day_index;
use crate::fit::{evaluate, linear_fit};
use crate::histogram::Histogram;
use crate::trends::TrendSeries;

type DrawResult = Result<(), Box<dyn Error>>;

/// The "tab10" qualitative colour cycle.
const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const GREY: RGBColor = RGBColor(128, 128, 128);

/// Size of a 4.1 x 4.9 inch figure at 300 dpi.
pub const DATE_PLOT_SIZE: (u32, u32) = (1230, 1470);
/// Size of a 9.6 x 7.2 inch figure at 300 dpi.
pub const FIGURE_SIZE: (u32, u32) = (2880, 2160);

const EQUIVALENT_MAX: f64 = 170.0;
const HISTOGRAM_MAX: f64 = 85.0;

fn path_str(path: &Path) -> Result<&str, RenderError> {
    path.to_str()
        .ok_or_else(|| RenderError::Plot(format!("{} is not valid UTF-8", path.display())))
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { 0.01 * (hi - lo) } else { 0.5 };
    (lo - pad, hi + pad)
}

/// The equivalent-area time series with `date` highlighted, above that day's histogram.
pub fn date_plot(
    path: &Path,
    series: &TrendSeries,
    date: NaiveDate,
    histogram: &Histogram,
) -> Result<(), RenderError> {
    draw_date_plot(path_str(path)?, series, date, histogram).map_err(plot_error)
}

/// Offsets from `first` of 1 July in each year up to `last`, inside the series.
fn july_ticks(first: NaiveDate, last: NaiveDate) -> Vec<i32> {
    let n_days = day_index(first, last) + 1;
    (first.year()..=last.year())
        .filter_map(|year| NaiveDate::from_ymd_opt(year, 7, 1))
        .map(|july| day_index(first, july))
        .filter(|x| (0..n_days).contains(x))
        .collect()
}

fn draw_date_plot(
    path: &str,
    series: &TrendSeries,
    date: NaiveDate,
    histogram: &Histogram,
) -> DrawResult {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return Err("the trend series is empty".into());
    };

    let root = BitMapBackend::new(path, DATE_PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    let n_days = day_index(first, last) + 1;
    // Years are labelled mid-year
    let ticks = july_ticks(first, last);
    let n_ticks = ticks.len().max(1);
    let mut top = ChartBuilder::on(&panels[0])
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d((0..n_days).with_key_points(ticks), 0.0..EQUIVALENT_MAX)?;

    let date_label = |x: &i32| (first + Duration::days(*x as i64)).format("%Y").to_string();
    top.configure_mesh()
        .x_labels(n_ticks)
        .x_label_formatter(&date_label)
        .y_desc("100%-Concentration Equivalent Sea Ice Area [10³ km²]")
        .label_style(("sans-serif", 26))
        .axis_desc_style(("sans-serif", 26))
        .draw()?;

    // Every other calendar year is shaded
    top.draw_series((first.year()..=last.year()).step_by(2).filter_map(|year| {
        let jan = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let dec = NaiveDate::from_ymd_opt(year, 12, 31)?;
        let x0 = day_index(first, jan).max(0);
        let x1 = day_index(first, dec).min(n_days);
        Some(Rectangle::new(
            [(x0, 0.0), (x1, EQUIVALENT_MAX)],
            GREY.mix(0.25).filled(),
        ))
    }))?;

    top.draw_series(series.rows().iter().map(|row| {
        let x = day_index(first, row.date);
        let y = (0.001 * row.equivalent).min(EQUIVALENT_MAX);
        Rectangle::new([(x, 0.0), (x + 1, y)], TAB10[0].filled())
    }))?;

    if let Some(row) = series.rows().iter().find(|r| r.date == date) {
        let x = day_index(first, date);
        let y = (0.001 * row.equivalent).min(EQUIVALENT_MAX);
        top.draw_series(std::iter::once(Rectangle::new(
            [(x - 5, 0.0), (x + 5, y)],
            TAB10[1].filled(),
        )))?;
    }

    let mut bottom = ChartBuilder::on(&panels[1])
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(0.0..100.0, 0.0..HISTOGRAM_MAX)?;

    bottom
        .configure_mesh()
        .x_desc("Concentration [%]")
        .y_desc("Sea Ice Area [10³ km²]")
        .label_style(("sans-serif", 26))
        .axis_desc_style(("sans-serif", 26))
        .draw()?;

    bottom.draw_series(histogram.areas().iter().enumerate().map(|(conc, &area)| {
        let x = conc as f64;
        let y = (0.001 * area).min(HISTOGRAM_MAX);
        Rectangle::new([(x - 0.5, 0.0), (x + 0.5, y)], TAB10[0].filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Winter totals with their least-squares trend line.
pub fn winter_totals_plot(path: &Path, totals: &BTreeMap<i32, f64>) -> Result<(), RenderError> {
    draw_winter_totals(path_str(path)?, totals).map_err(plot_error)
}

fn draw_winter_totals(path: &str, totals: &BTreeMap<i32, f64>) -> DrawResult {
    if totals.is_empty() {
        return Err("no winters to plot".into());
    }

    let x: Vec<f64> = totals.keys().map(|&year| year as f64).collect();
    let y: Vec<f64> = totals.values().copied().collect();

    let (x_lo, x_hi) = value_range(x.iter().copied());
    let (_, y_hi) = value_range(y.iter().copied());

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .x_label_area_size(100)
        .y_label_area_size(180)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Total 100%-Concentration Equivalent Sea Ice [km².day]")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .label_style(("sans-serif", 34))
        .axis_desc_style(("sans-serif", 34))
        .draw()?;

    chart.draw_series(LineSeries::new(
        x.iter().copied().zip(y.iter().copied()),
        TAB10[0].stroke_width(3),
    ))?;
    chart.draw_series(
        x.iter()
            .zip(&y)
            .map(|(&xi, &yi)| Circle::new((xi, yi), 8, TAB10[0].filled())),
    )?;

    if x.len() > 1 {
        let (m, c) = linear_fit(&x, &y)?;
        chart.draw_series(LineSeries::new(
            x.iter().map(|&xi| (xi, m * xi + c)),
            TAB10[1].stroke_width(3),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// One subdivision level in the area-vs-latitude-index comparison.
pub struct AreaFit<'a> {
    pub label: String,
    /// Row-major `(rows, cols)` pixel areas [km²].
    pub areas: &'a [f32],
    /// Quadratic in the latitude index.
    pub coef: &'a [f64],
}

/// Upper bound on scattered points per level.
const MAX_POINTS: usize = 100_000;

pub fn area_fit_plot(
    path: &Path,
    fits: &[AreaFit<'_>],
    rows: usize,
    cols: usize,
) -> Result<(), RenderError> {
    draw_area_fits(path_str(path)?, fits, rows, cols).map_err(plot_error)
}

fn draw_area_fits(path: &str, fits: &[AreaFit<'_>], rows: usize, cols: usize) -> DrawResult {
    let (y_lo, y_hi) = value_range(fits.iter().flat_map(|f| f.areas.iter().map(|&a| a as f64)));
    let x_hi = rows.saturating_sub(1).max(1) as f64;

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .x_label_area_size(100)
        .y_label_area_size(160)
        .build_cartesian_2d(0.0..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Latitude Index [#]")
        .y_desc("Area [km²]")
        .label_style(("sans-serif", 34))
        .axis_desc_style(("sans-serif", 34))
        .draw()?;

    let stride = (rows * cols / MAX_POINTS).max(1);
    for (i, fit) in fits.iter().enumerate() {
        let color = TAB10[(2 * i) % TAB10.len()];
        let fit_color = TAB10[(2 * i + 1) % TAB10.len()];

        chart
            .draw_series(
                fit.areas
                    .iter()
                    .enumerate()
                    .step_by(stride)
                    .map(|(k, &a)| {
                        Circle::new(((k / cols.max(1)) as f64, a as f64), 2, color.filled())
                    }),
            )?
            .label(fit.label.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 8, color.filled()));

        chart
            .draw_series(LineSeries::new(
                (0..rows).map(|r| (r as f64, evaluate(fit.coef, r as f64))),
                fit_color.stroke_width(3),
            ))?
            .label(format!("{} (fit)", fit.label))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x - 15, y), (x + 15, y)], fit_color.stroke_width(3))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", 30))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Grid spacing along one axis, as a series and as a histogram around its nominal value.
pub struct SpacingPanel<'a> {
    /// "Latitude" or "Longitude".
    pub axis: &'a str,
    /// "Height" or "Width".
    pub extent: &'a str,
    /// Difference of each step from the nominal spacing [%].
    pub percent: &'a [f64],
    /// Bin centres [°].
    pub centres: &'a [f64],
    pub counts: &'a [u32],
    pub bin_width: f64,
    pub nominal: f64,
}

const PERCENT_LIMIT: f64 = 0.12;

pub fn spacing_plot(
    path: &Path,
    lat: &SpacingPanel<'_>,
    lon: &SpacingPanel<'_>,
) -> Result<(), RenderError> {
    draw_spacing(path_str(path)?, lat, lon).map_err(plot_error)
}

fn draw_spacing(path: &str, lat: &SpacingPanel<'_>, lon: &SpacingPanel<'_>) -> DrawResult {
    let root = BitMapBackend::new(path, (2 * FIGURE_SIZE.0, 2 * FIGURE_SIZE.1)).into_drawing_area();
    root.fill(&WHITE)?;
    let cells = root.split_evenly((2, 2));

    for (row, panel) in [lat, lon].into_iter().enumerate() {
        let x_hi = panel.percent.len().saturating_sub(1).max(1) as f64;
        let mut series = ChartBuilder::on(&cells[2 * row])
            .margin(40)
            .x_label_area_size(100)
            .y_label_area_size(160)
            .build_cartesian_2d(0.0..x_hi, -PERCENT_LIMIT..PERCENT_LIMIT)?;

        series
            .configure_mesh()
            .x_desc(format!("{} Index [#]", panel.axis))
            .y_desc("Difference From Stated Value [%]")
            .label_style(("sans-serif", 34))
            .axis_desc_style(("sans-serif", 34))
            .draw()?;

        series.draw_series(LineSeries::new(
            panel.percent.iter().enumerate().map(|(i, &p)| {
                (i as f64, p.clamp(-PERCENT_LIMIT, PERCENT_LIMIT))
            }),
            TAB10[0].stroke_width(2),
        ))?;

        let half = 0.5 * panel.bin_width;
        let x_lo = panel.centres.first().copied().unwrap_or(panel.nominal) - panel.bin_width;
        let x_hi = panel.centres.last().copied().unwrap_or(panel.nominal) + panel.bin_width;
        let max_count = panel.counts.iter().copied().max().unwrap_or(0) as f64;

        let mut histogram = ChartBuilder::on(&cells[2 * row + 1])
            .margin(40)
            .x_label_area_size(100)
            .y_label_area_size(160)
            .build_cartesian_2d(x_lo..x_hi, 0.0..(1.05 * max_count).max(1.0))?;

        histogram
            .configure_mesh()
            .x_desc(format!("{} {} [°]", panel.axis, panel.extent))
            .y_desc("Histogram [#]")
            .x_label_formatter(&|v| format!("{:.6}", v))
            .label_style(("sans-serif", 34))
            .axis_desc_style(("sans-serif", 34))
            .draw()?;

        histogram.draw_series(panel.centres.iter().zip(panel.counts).map(|(&x, &n)| {
            Rectangle::new([(x - half, 0.0), (x + half, n as f64)], TAB10[0].filled())
        }))?;
        histogram.draw_series(LineSeries::new(
            [(panel.nominal, 0.0), (panel.nominal, max_count)],
            TAB10[1].stroke_width(3),
        ))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_value_range_pads() {
        let (lo, hi) = value_range([1.0, 3.0].into_iter());
        assert!((lo - 0.98).abs() < 1.0e-12);
        assert!((hi - 3.02).abs() < 1.0e-12);

        assert_eq!(value_range([2.0, f64::NAN].into_iter()), (1.5, 2.5));
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn test_july_ticks() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(july_ticks(date(2020, 7, 1), date(2021, 6, 30)), vec![0]);
        assert_eq!(july_ticks(date(2020, 6, 30), date(2021, 7, 1)), vec![1, 366]);
        assert!(july_ticks(date(2021, 1, 1), date(2021, 6, 30)).is_empty());
    }

    #[test]
    fn test_date_plot_needs_series() {
        let dir = tempdir().unwrap();
        let result = date_plot(
            &dir.path().join("empty.png"),
            &TrendSeries::default(),
            NaiveDate::from_ymd_opt(2021, 2, 15).unwrap(),
            &Histogram::default(),
        );

        assert!(matches!(result, Err(RenderError::Plot(_))));
        assert!(!dir.path().join("empty.png").exists());
    }

    #[test]
    fn test_winter_totals_plot_needs_winters() {
        let dir = tempdir().unwrap();
        let result = winter_totals_plot(&dir.path().join("tots.png"), &BTreeMap::new());

        assert!(matches!(result, Err(RenderError::Plot(_))));
    }
}
