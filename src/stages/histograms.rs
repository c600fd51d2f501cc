//! Per-chart area histograms, their summary, the daily trend series and the winter totals.

use std::collections::BTreeMap;
use tracing::info;

use super::{charts_in_range, load_chart};
use crate::cache::{ensure_dir, read_values};
use crate::config::Config;
use crate::date_gen::DateGenerator;
use crate::error::{Error, Result};
use crate::fit::{lat_to_area, read_coefficients};
use crate::format::thousands;
use crate::histogram::{Histogram, list_histograms, summarise};
use crate::render::plots::winter_totals_plot;
use crate::trends::TrendSeries;

/// Writes a histogram for every chart with sea ice that does not have one yet.
pub fn make_histograms(config: &Config) -> Result<()> {
    let histograms_dir = config.histograms_dir();
    ensure_dir(&histograms_dir)?;

    let lat: Vec<f32> = read_values(&config.output_path("lat.bin"))?;
    let coef = read_coefficients(&config.output_path("areaCoef.json"), 3)?;
    let row_areas = lat_to_area(&coef, &lat);

    for (path, stamp) in charts_in_range(config) {
        let out = histograms_dir.join(format!("{}.csv", stamp.stem()));
        if out.exists() {
            continue;
        }

        info!("Making \"{}\" ...", out.display());
        let Some(chart) = load_chart(&path) else {
            continue;
        };
        if !chart.has_sea_ice() {
            info!(" > Skipping, no sea ice.");
            continue;
        }
        if chart.nlat() != lat.len() {
            return Err(Error::Data(format!(
                "\"{}\" has {} latitudes but the cached grid has {}",
                path.display(),
                chart.nlat(),
                lat.len()
            )));
        }

        Histogram::from_chart(&chart.conc, chart.nlon(), &row_areas).write_csv(&out)?;
    }

    Ok(())
}

/// Writes `trends.csv` over the configured dates and returns the winter totals.
pub fn save_trends(config: &Config) -> Result<BTreeMap<i32, f64>> {
    let dates = DateGenerator::new(config.clone()).generate_date_series();
    let series = TrendSeries::build(dates, &config.histograms_dir())?;
    series.write_csv(&config.output_path("trends.csv"))?;
    Ok(series.winter_totals())
}

pub fn run(config: &Config) -> Result<()> {
    make_histograms(config)?;

    info!("Summarising ...");
    let summary = summarise(&list_histograms(&config.histograms_dir())?)?;
    println!(
        "The highest single non-zero occurrence is {} km².",
        thousands(summary.max_bucket, 1)
    );
    println!(
        "The highest 100%-concentration equivalent occurrence is {} km².",
        thousands(summary.max_equivalent, 1)
    );

    info!("Saving trends ...");
    let totals = save_trends(config)?;
    for (year, total) in &totals {
        println!("{} = {} km².day", year, thousands(*total, 1));
    }

    let tots = config.output_path("tots.png");
    info!("Making \"{}\" ...", tots.display());
    winter_totals_plot(&tots, &totals)?;

    Ok(())
}


#[cfg(test)]
mod chart_tests {
    use super::*;
    use crate::fit::write_coefficients;
    use crate::geodesy::AreaParams;
    use crate::readers::IceChart;
    use crate::readers::nc::tests::write_chart;
    use crate::readers::types::{LAND, OUT_OF_SCOPE, WATER};
    use crate::stages::check_data;
    use chrono::NaiveDate;
    use std::path::Path;
    use tempfile::tempdir;

    const LAT: [f32; 4] = [60.0, 60.009, 60.018, 60.027];
    const LON: [f32; 3] = [20.0, 20.018, 20.036];

    #[rustfmt::skip]
    const ICE: [i16; 12] = [
        LAND,         WATER, 40,
        OUT_OF_SCOPE, 100,   100,
        WATER,        WATER, WATER,
        LAND,         40,    WATER,
    ];

    fn chart(lat: &[f32], conc: &[i16]) -> IceChart {
        IceChart {
            lat: lat.to_vec(),
            lon: LON.to_vec(),
            conc: conc.to_vec(),
        }
    }

    fn mask() -> Vec<i16> {
        ICE.iter().map(|&c| if c > 0 { WATER } else { c }).collect()
    }

    fn config(data: &Path, output: &Path) -> Config {
        Config::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 3).unwrap(),
        )
        .with_data_dir(data.to_path_buf())
        .with_output_dir(output.to_path_buf())
    }

    #[test]
    fn test_charts_to_trends() {
        let data = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_chart(&data.path().join("ice_conc_baltic_202101011200.nc"), &chart(&LAT, &mask()));
        write_chart(&data.path().join("ice_conc_baltic_202101021200.nc"), &chart(&LAT, &ICE));
        let config = config(data.path(), output.path());

        check_data::run(&config, &AreaParams::default()).unwrap();

        assert_eq!(read_values::<f32>(&config.output_path("lat.bin")).unwrap(), LAT.to_vec());
        assert_eq!(read_values::<i16>(&config.output_path("conc.bin")).unwrap(), mask());
        assert_eq!(read_values::<f32>(&config.output_path("areas.bin")).unwrap().len(), 6);
        assert!(config.output_path("conc.png").exists());
        assert_eq!(read_coefficients(&config.output_path("areaCoef.json"), 3).unwrap().len(), 3);

        make_histograms(&config).unwrap();

        let histograms = list_histograms(&config.histograms_dir()).unwrap();
        assert_eq!(histograms.len(), 1);
        assert!(histograms[0].ends_with("2021-01-02_12-00.csv"));

        let histogram = Histogram::read_csv(&histograms[0]).unwrap();
        let areas = histogram.areas();
        assert!(areas[40] > 0.0);
        assert!(areas[100] > 0.0);
        assert!(areas[0] > 0.0);
        assert!(areas[1..40].iter().all(|&a| a == 0.0));

        let totals = save_trends(&config).unwrap();

        let series = TrendSeries::read_csv(&config.output_path("trends.csv")).unwrap();
        let observed: Vec<bool> = series.rows().iter().map(|r| r.observed).collect();
        assert_eq!(observed, vec![false, true, false]);

        let row = &series.rows()[1];
        assert!((row.total - histogram.total_ice_area()).abs() < 1.0e-9 * row.total);
        assert!(0.0 < row.equivalent && row.equivalent < row.total);
        assert_eq!(totals.len(), 1);
        assert!((totals[&2021] - row.equivalent).abs() < 1.0e-9 * row.equivalent);
    }

    #[test]
    fn test_existing_histogram_is_kept() {
        let data = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_chart(&data.path().join("ice_conc_baltic_202101021200.nc"), &chart(&LAT, &ICE));
        let config = config(data.path(), output.path());

        check_data::run(&config, &AreaParams::default()).unwrap();
        make_histograms(&config).unwrap();

        let out = config.histograms_dir().join("2021-01-02_12-00.csv");
        let mut areas = [0.0; crate::histogram::BUCKETS];
        areas[7] = 1.5;
        Histogram::from_areas(areas).write_csv(&out).unwrap();

        make_histograms(&config).unwrap();

        assert_eq!(Histogram::read_csv(&out).unwrap().areas()[7], 1.5);
    }

    #[test]
    fn test_chart_on_another_grid() {
        let data = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_chart(
            &data.path().join("ice_conc_baltic_202101021200.nc"),
            &chart(&LAT[..3], &ICE[..9]),
        );
        let config = config(data.path(), output.path());

        crate::cache::write_values(&config.output_path("lat.bin"), &LAT).unwrap();
        write_coefficients(&config.output_path("areaCoef.json"), &[1.0, 0.0, 0.0]).unwrap();

        assert!(matches!(make_histograms(&config), Err(Error::Data(_))));
        assert!(list_histograms(&config.histograms_dir()).unwrap().is_empty());
    }
}
