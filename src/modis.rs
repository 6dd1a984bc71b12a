//! MODIS LAI monthly climatology.
//!
//! Combines yearly `Yuan_et_al_YYYY_1x1.nc` files, each carrying twelve
//! months of leaf area index, into a single climatology by averaging each
//! month across years.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::Utc;
use ndarray::Array3;

use crate::clm::{get_1d, get_3d};

/// 2000-01-01 00:00:00 UTC in seconds since 1970-01-01.
const EPOCH_2000: i32 = 946_684_800;
const SECONDS_PER_DAY: i32 = 86_400;

/// The climatology's time axis: twelve stamps at uniform 30-day spacing,
/// matching the encoding of the yearly files.
pub fn time_axis() -> [i32; 12] {
    let mut axis = [0i32; 12];
    for (i, stamp) in axis.iter_mut().enumerate() {
        *stamp = EPOCH_2000 + i as i32 * 30 * SECONDS_PER_DAY;
    }

    axis
}

/// Pulls the year out of a `Yuan_et_al_YYYY_1x1.nc` file name.
pub fn parse_year(file_name: &str) -> Option<i32> {
    let rest = file_name.strip_prefix("Yuan_et_al_")?;
    let (year, suffix) = rest.split_once('_')?;
    if suffix != "1x1.nc" {
        return None;
    }

    year.parse().ok()
}

/// Finds the yearly files in `input_dir`, sorted by year.
pub fn find_yearly_files(input_dir: &Path) -> Result<Vec<(i32, PathBuf)>> {
    let mut files = Vec::new();
    for entry in input_dir.read_dir()? {
        let path = entry?.path();
        if let Some(year) = path.file_name().and_then(|n| n.to_str()).and_then(parse_year) {
            files.push((year, path));
        }
    }
    files.sort_by_key(|(year, _)| *year);

    if files.is_empty() {
        return Err(anyhow!(
            "No files matching Yuan_et_al_*_1x1.nc found in {}",
            input_dir.display()
        ));
    }

    Ok(files)
}

/// Elementwise mean of the yearly (month, lat, lon) stacks.
pub fn average_years(stacks: &[Array3<f32>]) -> Array3<f32> {
    let mut sum = Array3::<f32>::zeros(stacks[0].dim());
    for stack in stacks {
        sum += stack;
    }

    sum / stacks.len() as f32
}

/// Computes the climatology and writes it to `output`.
pub fn climatology(input_dir: &Path, output: &Path) -> Result<String> {
    let files = find_yearly_files(input_dir)?;
    println!("Found {} yearly files", files.len());

    let mut stacks = Vec::new();
    let mut grid = None;
    for (year, path) in &files {
        let file = netcdf::open(path)?;
        let lai = get_3d::<f32>(&file, "lai", path)?;
        if grid.is_none() {
            grid = Some((
                get_1d::<f64>(&file, "lat", path)?,
                get_1d::<f64>(&file, "lon", path)?,
            ));
        }
        stacks.push(lai);
        println!("  Loaded data for {}", year);
    }
    let (lat, lon) = grid.expect("at least one yearly file");

    let mean = average_years(&stacks);
    let (year_min, year_max) = (files[0].0, files[files.len() - 1].0);

    let mut out = netcdf::create(output)?;
    out.add_dimension("time", 12)?;
    out.add_dimension("lat", lat.len())?;
    out.add_dimension("lon", lon.len())?;

    let mut time_var = out.add_variable::<i32>("time", &["time"])?;
    time_var.put_attribute("units", "seconds since 1970-01-01")?;
    time_var.put_attribute("standard_name", "time")?;
    time_var.put_attribute("calendar", "proleptic_gregorian")?;
    time_var.put_values(&time_axis(), ..)?;

    let mut lat_var = out.add_variable::<f64>("lat", &["lat"])?;
    lat_var.put_attribute("units", "degrees_north")?;
    lat_var.put_values(&lat, ..)?;

    let mut lon_var = out.add_variable::<f64>("lon", &["lon"])?;
    lon_var.put_attribute("units", "degrees_east")?;
    lon_var.put_values(&lon, ..)?;

    let mut lai_var = out.add_variable::<f32>("lai", &["time", "lat", "lon"])?;
    lai_var.put_attribute("long_name", "leaf area index")?;
    lai_var.put_attribute("units", "m^2 m^-2")?;
    lai_var.put_values(mean.as_slice().expect("contiguous"), (.., .., ..))?;

    out.add_attribute("title", "MODIS LAI Monthly Climatology")?;
    out.add_attribute(
        "source",
        format!("Averaged from Yuan et al. data ({}-{})", year_min, year_max),
    )?;
    let creation_time = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    out.add_attribute(
        "history",
        format!("{} created by clima-fetch modis-climatology", creation_time),
    )?;

    println!(
        "Years averaged: {}-{} ({} years)",
        year_min,
        year_max,
        files.len()
    );

    Ok(output.display().to_string())
}

// -- Tests -------------------------------------------------------------------
