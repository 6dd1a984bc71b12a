//! Hourly ERA5 land forcing data, one request per (year, month).
//!
//! The CDS rejects a whole year of hourly single-level data as too large, and
//! small requests are prioritised in its queue anyway, so the span is split
//! into monthly requests dispatched with a bounded number in flight.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Result;
use futures::StreamExt;

use crate::cds::request::{all_days, all_hours, all_months};
use crate::cds::{CdsClient, CdsConfig, CdsError, Request};
use crate::download::extract_forcing_zip;

const FORCING_DATASET: &str = "reanalysis-era5-single-levels";

/// Concurrent requests kept open against the CDS queue.
pub(crate) const MAX_IN_FLIGHT_REQUESTS: usize = 12;

/// One year of hourly forcing data is approximately 8.4 GB.
const GB_PER_YEAR: f64 = 8.4;

const INST_VARIABLES: [&str; 7] = [
    "10m_u_component_of_wind",
    "10m_v_component_of_wind",
    "2m_dewpoint_temperature",
    "2m_temperature",
    "surface_pressure",
    "leaf_area_index_high_vegetation",
    "leaf_area_index_low_vegetation",
];

const RATE_VARIABLES: [&str; 5] = [
    "mean_snowfall_rate",
    "mean_surface_direct_short_wave_radiation_flux",
    "mean_surface_downward_long_wave_radiation_flux",
    "mean_surface_downward_short_wave_radiation_flux",
    "mean_total_precipitation_rate",
];

/// Runs the download futures with at most [`MAX_IN_FLIGHT_REQUESTS`] open at
/// once, logging failures and carrying on with the rest.
pub(crate) async fn dispatch_bounded<T, F, Fut>(items: Vec<T>, make_future: F) -> Result<()>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), CdsError>>,
{
    let mut failures = 0usize;
    let mut stream = futures::stream::iter(items.into_iter().map(make_future))
        .buffer_unordered(MAX_IN_FLIGHT_REQUESTS);

    while let Some(result) = stream.next().await {
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        eprintln!("{} downloads failed; re-run to retry them", failures);
    }

    Ok(())
}

/// Downloads forcing data for the years `year_begin..year_end`.
pub async fn era5_forcing(
    key: Option<String>,
    year_begin: i32,
    year_end: i32,
    split: bool,
) -> Result<String> {
    let client = CdsClient::new(CdsConfig::resolve(key)?);

    let existing = existing_forcing_files(Path::new("."), year_begin, year_end)?;
    let remaining = remaining_targets(&existing, year_begin, year_end);
    let required_gb = remaining.len() as f64 * (GB_PER_YEAR / 12.0);
    println!(
        "{} files to download, requiring approximately {:.1} GB of disk space",
        remaining.len(),
        required_gb
    );

    let mut jobs = Vec::new();
    for year in year_begin..year_end {
        for month in all_months() {
            jobs.push((year, month));
        }
    }

    dispatch_bounded(jobs, |(year, month)| {
        let client = &client;
        async move { download_month(client, year, &month, split).await }
    })
    .await?;

    Ok("era_5_*".to_string())
}

async fn download_month(
    client: &CdsClient,
    year: i32,
    month: &str,
    split: bool,
) -> Result<(), CdsError> {
    let dirpath = PathBuf::from(format!("era_5_{}", year));
    fs::create_dir_all(&dirpath)?;

    let filepath = dirpath.join(format!("era5_forcing_data_{}_{}.nc", year, month));
    if filepath.is_file() {
        println!("{} already exists; will not request data", filepath.display());
        return Ok(());
    }

    if !split {
        let request = forcing_request(year, month, &all_variables());
        return client.retrieve(FORCING_DATASET, &request, &filepath).await;
    }

    let filepath_inst = dirpath.join(format!("era5_forcing_data_{}_{}_inst.nc", year, month));
    let filepath_rate = dirpath.join(format!("era5_forcing_data_{}_{}_rate.nc", year, month));

    if !filepath_inst.is_file() {
        let request = forcing_request(year, month, &INST_VARIABLES);
        client
            .retrieve(FORCING_DATASET, &request, &filepath_inst)
            .await?;
    } else {
        println!(
            "{} already exists; will not request data",
            filepath_inst.display()
        );
    }

    if !filepath_rate.is_file() {
        let request = forcing_request(year, month, &RATE_VARIABLES);
        client
            .retrieve(FORCING_DATASET, &request, &filepath_rate)
            .await?;
    } else {
        println!(
            "{} already exists; will not request data",
            filepath_rate.display()
        );
    }

    Ok(())
}

fn all_variables() -> Vec<&'static str> {
    INST_VARIABLES.iter().chain(RATE_VARIABLES.iter()).copied().collect()
}

fn forcing_request(year: i32, month: &str, variables: &[&str]) -> Request {
    Request::new("reanalysis")
        .variables(variables)
        .year(year)
        .months(&[month.to_string()])
        .days(&all_days())
        .times(&all_hours())
        .grid(1.0)
}

/// Lists the already-downloaded forcing files under the year directories.
fn existing_forcing_files(base: &Path, year_begin: i32, year_end: i32) -> Result<Vec<PathBuf>> {
    let mut existing = Vec::new();
    for year in year_begin..year_end {
        let dirpath = base.join(format!("era_5_{}", year));
        if !dirpath.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&dirpath)? {
            let path = entry?.path();
            if path.is_file() {
                // Strip the base so targets and existing files compare equal
                existing.push(path.strip_prefix(base).unwrap_or(&path).to_path_buf());
            }
        }
    }

    Ok(existing)
}

/// The (year, month) target files not yet covered by an existing download.
///
/// A target is covered by the final `.nc` file, or by the pair of `_inst.nc`
/// and `_rate.nc` halves from a split download.
pub fn remaining_targets(existing: &[PathBuf], year_begin: i32, year_end: i32) -> Vec<PathBuf> {
    let mut remaining = Vec::new();
    for year in year_begin..year_end {
        for month in all_months() {
            let dir = format!("era_5_{}", year);
            let stem = format!("era5_forcing_data_{}_{}", year, month);

            let target = PathBuf::from(&dir).join(format!("{}.nc", stem));
            let inst = PathBuf::from(&dir).join(format!("{}_inst.nc", stem));
            let rate = PathBuf::from(&dir).join(format!("{}_rate.nc", stem));

            let covered = existing.contains(&target)
                || (existing.contains(&inst) && existing.contains(&rate));
            if !covered {
                remaining.push(target);
            }
        }
    }

    remaining
}

/// Walks the `era_5_*` year directories and unpacks every forcing archive.
pub fn era5_forcing_unzip(dir: &Path) -> Result<String> {
    let mut extracted = 0usize;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_year_dir = path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("era_5"));
        if !is_year_dir {
            continue;
        }

        for file in fs::read_dir(&path)? {
            let file = file?.path();
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with("era5_forcing_data") && name.ends_with(".zip") {
                extracted += extract_forcing_zip(&file)?.len();
            }
        }
    }

    println!("Extracted {} files", extracted);

    Ok(dir.display().to_string())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_list_all_targets_when_nothing_exists() {
        let remaining = remaining_targets(&[], 2008, 2010);
        assert_eq!(remaining.len(), 24);
        assert_eq!(
            remaining[0],
            PathBuf::from("era_5_2008/era5_forcing_data_2008_01.nc")
        );
        assert_eq!(
            remaining[23],
            PathBuf::from("era_5_2009/era5_forcing_data_2009_12.nc")
        );
    }

    #[test]
    fn should_skip_targets_with_final_file() {
        let existing = vec![PathBuf::from("era_5_2008/era5_forcing_data_2008_03.nc")];
        let remaining = remaining_targets(&existing, 2008, 2009);

        assert_eq!(remaining.len(), 11);
        assert!(!remaining.contains(&existing[0]));
    }

    #[test]
    fn should_skip_targets_with_both_split_halves() {
        let existing = vec![
            PathBuf::from("era_5_2008/era5_forcing_data_2008_03_inst.nc"),
            PathBuf::from("era_5_2008/era5_forcing_data_2008_03_rate.nc"),
        ];
        let remaining = remaining_targets(&existing, 2008, 2009);

        assert_eq!(remaining.len(), 11);
    }

    #[test]
    fn should_keep_targets_with_only_one_split_half() {
        let existing = vec![PathBuf::from(
            "era_5_2008/era5_forcing_data_2008_03_inst.nc",
        )];
        let remaining = remaining_targets(&existing, 2008, 2009);

        assert_eq!(remaining.len(), 12);
    }

    #[test]
    fn should_combine_inst_and_rate_variables() {
        let variables = all_variables();
        assert_eq!(variables.len(), 12);
        assert!(variables.contains(&"2m_temperature"));
        assert!(variables.contains(&"mean_total_precipitation_rate"));
    }

    #[test]
    fn should_request_one_month_of_hourly_data() {
        let request = forcing_request(2008, "02", &INST_VARIABLES);

        assert_eq!(request.year, vec!["2008"]);
        assert_eq!(request.month, vec!["02"]);
        assert_eq!(request.day.len(), 31);
        assert_eq!(request.time.len(), 24);
        assert_eq!(request.grid, Some([1.0, 1.0]));
    }
}
