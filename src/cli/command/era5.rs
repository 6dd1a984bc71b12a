//! Single-shot ERA5 retrievals.

use std::path::{Path, PathBuf};

use anyhow::Result;
use futures::future::try_join_all;

use crate::cds::request::{all_days, all_hours, all_months, midnight, year_range, ALL_PRESSURE_LEVELS};
use crate::cds::{CdsClient, CdsConfig, Request};
use crate::cli::create_spinner;

const SINGLE_LEVELS_MONTHLY: &str = "reanalysis-era5-single-levels-monthly-means";
const PRESSURE_LEVELS: &str = "reanalysis-era5-pressure-levels";

const FLUX_VARIABLES: [&str; 9] = [
    "mean_surface_downward_long_wave_radiation_flux",
    "mean_surface_downward_short_wave_radiation_flux",
    "mean_surface_latent_heat_flux",
    "mean_surface_net_long_wave_radiation_flux",
    "mean_surface_net_short_wave_radiation_flux",
    "mean_surface_sensible_heat_flux",
    "mean_sub_surface_runoff_rate",
    "mean_surface_runoff_rate",
    "total_column_water",
];

const FLUX_2008_VARIABLES: [&str; 9] = [
    "mean_evaporation_rate",
    "mean_surface_downward_long_wave_radiation_flux",
    "mean_surface_downward_short_wave_radiation_flux",
    "mean_surface_latent_heat_flux",
    "mean_surface_net_long_wave_radiation_flux",
    "mean_surface_net_short_wave_radiation_flux",
    "mean_surface_sensible_heat_flux",
    "mean_sub_surface_runoff_rate",
    "mean_surface_runoff_rate",
];

const CALIBRATION_VARIABLES: [&str; 4] = [
    "surface_latent_heat_flux",
    "surface_sensible_heat_flux",
    "evaporation",
    "forecast_albedo",
];

const CLOUD_VARIABLES: [&str; 4] = [
    "fraction_of_cloud_cover",
    "specific_cloud_ice_water_content",
    "specific_cloud_liquid_water_content",
    "specific_humidity",
];

/// A request small enough to go through the queue in one piece: the whole
/// 1979-2024 monthly flux record in a single file.
pub async fn era5_single_monthly(key: Option<String>, target: Option<PathBuf>) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);
    let target = target
        .unwrap_or_else(|| PathBuf::from("era5_surface_fluxes_monthly_197901-202412.nc"));

    let request = Request::new("monthly_averaged_reanalysis")
        .variables(&FLUX_VARIABLES)
        .years(&year_range(1979, 2025))
        .months(&all_months())
        .times(&midnight())
        .grid(1.0);

    let bar = create_spinner("Downloading monthly surface fluxes...".to_string());
    client
        .retrieve(SINGLE_LEVELS_MONTHLY, &request, &target)
        .await?;
    bar.finish_with_message("Monthly surface fluxes downloaded");

    Ok(target.display().to_string())
}

/// 2008 monthly surface fluxes, both monthly product types in one file.
pub async fn era5_fluxes_2008(key: Option<String>) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);
    let target = Path::new("era5_surface_fluxes_monthly_200801-200812.nc");

    let request = Request::new("monthly_averaged_reanalysis")
        .product_types(&[
            "monthly_averaged_reanalysis",
            "monthly_averaged_reanalysis_by_hour_of_day",
        ])
        .variables(&FLUX_2008_VARIABLES)
        .year(2008)
        .months(&all_months())
        .times(&all_hours())
        .data_format("netcdf_legacy")
        .grid(1.0);

    let bar = create_spinner("Downloading 2008 surface fluxes...".to_string());
    client
        .retrieve(SINGLE_LEVELS_MONTHLY, &request, target)
        .await?;
    bar.finish_with_message("2008 surface fluxes downloaded");

    Ok(target.display().to_string())
}

/// 2013 monthly-averaged calibration variables, one request per month block
/// so no single request is too large for the queue.
pub async fn era5_calibration(key: Option<String>) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);

    let blocks: [&[&str]; 3] = [
        &["01", "02", "03", "04"],
        &["05", "06", "07", "08"],
        &["09", "10", "11", "12"],
    ];

    let downloads = blocks.iter().map(|months| {
        let client = &client;
        async move {
            let months: Vec<String> = months.iter().map(|m| m.to_string()).collect();
            let target = PathBuf::from(format!("era5_calibration_data2013_{}.nc", months[0]));
            let request = Request::new("monthly_averaged_reanalysis")
                .variables(&CALIBRATION_VARIABLES)
                .year(2013)
                .months(&months)
                .times(&midnight());

            client
                .retrieve(SINGLE_LEVELS_MONTHLY, &request, &target)
                .await
        }
    });

    try_join_all(downloads).await?;

    Ok("era5_calibration_data2013_*.nc".to_string())
}

/// Hourly pressure-level cloud variables for 2010, one request per
/// (variable, month) pair.
pub async fn era5_cloud(key: Option<String>) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);

    let mut pairs = Vec::new();
    for variable in CLOUD_VARIABLES {
        for month in all_months() {
            pairs.push((variable, month));
        }
    }

    super::forcing::dispatch_bounded(pairs, |(variable, month)| {
        let client = &client;
        async move {
            let target = PathBuf::from(format!("era5_cloud_hourly_{}_2010{}.nc", variable, month));
            println!("{}", target.display());

            let request = Request::new("reanalysis")
                .variables(&[variable])
                .pressure_levels(&ALL_PRESSURE_LEVELS)
                .year(2010)
                .months(&[month.clone()])
                .days(&all_days())
                .times(&all_hours())
                .grid(2.0);

            client.retrieve(PRESSURE_LEVELS, &request, &target).await?;
            Ok(())
        }
    })
    .await?;

    Ok("era5_cloud_hourly_*.nc".to_string())
}

/// Low and high vegetation cover snapshot at 0.25 and 1.0 degrees.
pub async fn era5_lai_covers(key: Option<String>) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);

    let resolutions: [(f64, &str); 2] = [(0.25, "0.25"), (1.0, "1.0")];
    for (resolution, label) in resolutions {
        let target = PathBuf::from(format!("era5_lai_covers_{}x{}_raw.nc", label, label));
        let request = Request::new("reanalysis")
            .variables(&["low_vegetation_cover", "high_vegetation_cover"])
            .year(2008)
            .months(&["01".to_string()])
            .days(&["01".to_string()])
            .times(&midnight())
            .grid(resolution);

        let bar = create_spinner(format!("Downloading vegetation covers at {}...", label));
        client
            .retrieve("reanalysis-era5-single-levels", &request, &target)
            .await?;
        bar.finish_with_message(format!("Vegetation covers at {} downloaded", label));
    }

    Ok("era5_lai_covers_*_raw.nc".to_string())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_request_both_monthly_product_types_for_2008() {
        let request = Request::new("monthly_averaged_reanalysis")
            .product_types(&[
                "monthly_averaged_reanalysis",
                "monthly_averaged_reanalysis_by_hour_of_day",
            ])
            .variables(&FLUX_2008_VARIABLES)
            .year(2008);

        assert_eq!(request.product_type.len(), 2);
        assert_eq!(request.variable.len(), 9);
        assert_eq!(request.year, vec!["2008"]);
    }

    #[test]
    fn should_pair_every_cloud_variable_with_every_month() {
        let mut pairs = Vec::new();
        for variable in CLOUD_VARIABLES {
            for month in all_months() {
                pairs.push((variable, month));
            }
        }

        assert_eq!(pairs.len(), 48);
        assert_eq!(pairs[0], ("fraction_of_cloud_cover", "01".to_string()));
        assert_eq!(pairs[47], ("specific_humidity", "12".to_string()));
    }
}
