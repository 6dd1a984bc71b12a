//! Queued, resumable downloads of the 1979-2024 monthly archives.
//!
//! One request per year, driven through the CSV ledger so an interrupted run
//! can pick up with `--resume`.

use std::path::PathBuf;

use anyhow::Result;

use crate::cds::request::{all_hours, all_months, midnight, ALL_PRESSURE_LEVELS};
use crate::cds::{ledger, CdsClient, CdsConfig, Request};

const YEAR_BEGIN: i32 = 1979;
const YEAR_END: i32 = 2025;

const PRESSURE_DATASET: &str = "reanalysis-era5-pressure-levels-monthly-means";
const PRESSURE_LEDGER: &str = "era5_download_status.csv";
const PRESSURE_VARIABLES: [&str; 7] = [
    "geopotential",
    "relative_humidity",
    "specific_humidity",
    "temperature",
    "u_component_of_wind",
    "v_component_of_wind",
    "vertical_velocity",
];

const HOURLY_DATASET: &str = "reanalysis-era5-single-levels-monthly-means";
const HOURLY_LEDGER: &str = "era5_download_status_hourly.csv";
const HOURLY_VARIABLES: [&str; 10] = [
    "mean_evaporation_rate",
    "mean_sub_surface_runoff_rate",
    "mean_surface_downward_long_wave_radiation_flux",
    "mean_surface_downward_short_wave_radiation_flux",
    "mean_surface_latent_heat_flux",
    "mean_surface_net_long_wave_radiation_flux",
    "mean_surface_net_short_wave_radiation_flux",
    "mean_surface_runoff_rate",
    "mean_surface_sensible_heat_flux",
    "total_column_water",
];

/// Monthly pressure-level means, one file per year.
pub async fn era5_pressure_monthly(
    key: Option<String>,
    resume: bool,
    dir: Option<PathBuf>,
) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);
    let output_dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let ledger_path = PathBuf::from(PRESSURE_LEDGER);

    ledger::drive(
        &client,
        PRESSURE_DATASET,
        &ledger_path,
        &output_dir,
        resume,
        YEAR_BEGIN..YEAR_END,
        pressure_request,
    )
    .await?;

    Ok(output_dir.display().to_string())
}

fn pressure_request(year: i32) -> Request {
    Request::new("monthly_averaged_reanalysis")
        .variables(&PRESSURE_VARIABLES)
        .pressure_levels(&ALL_PRESSURE_LEVELS)
        .year(year)
        .months(&all_months())
        .times(&midnight())
        .grid(1.0)
}

/// Monthly single-level means by hour of day, one file per year.
pub async fn era5_hourly_monthly(
    key: Option<String>,
    resume: bool,
    dir: Option<PathBuf>,
) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);
    let output_dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let ledger_path = PathBuf::from(HOURLY_LEDGER);

    ledger::drive(
        &client,
        HOURLY_DATASET,
        &ledger_path,
        &output_dir,
        resume,
        YEAR_BEGIN..YEAR_END,
        hourly_request,
    )
    .await?;

    Ok(output_dir.display().to_string())
}

fn hourly_request(year: i32) -> Request {
    Request::new("monthly_averaged_reanalysis_by_hour_of_day")
        .variables(&HOURLY_VARIABLES)
        .year(year)
        .months(&all_months())
        .times(&all_hours())
        .data_format("netcdf_legacy")
        .grid(1.0)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_request_full_pressure_axis_at_one_degree() {
        let request = pressure_request(1979);

        assert_eq!(request.product_type, vec!["monthly_averaged_reanalysis"]);
        assert_eq!(request.variable.len(), 7);
        assert_eq!(request.pressure_level.len(), 37);
        assert_eq!(request.year, vec!["1979"]);
        assert_eq!(request.time, vec!["00:00"]);
        assert_eq!(request.grid, Some([1.0, 1.0]));
        assert_eq!(request.data_format, "netcdf");
    }

    #[test]
    fn should_request_hourly_means_in_legacy_format() {
        let request = hourly_request(2024);

        assert_eq!(
            request.product_type,
            vec!["monthly_averaged_reanalysis_by_hour_of_day"]
        );
        assert_eq!(request.variable.len(), 10);
        assert!(request.pressure_level.is_empty());
        assert_eq!(request.time.len(), 24);
        assert_eq!(request.data_format, "netcdf_legacy");
    }
}
