//! Dataset preparation commands: CLM regridding, MODIS climatology, and
//! FLUXNET metadata.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::{clm, fluxnet as fluxnet_mod, modis};

const SURFACE_DATASET: &str = "surfdata_0.9x1.25_16pfts__CMIP6_simyr2000_c170616.nc";
const SURFACE_DATASET_DETAILED: &str = "surfdata_0.125x0.125_16pfts_simyr2000_c151014.nc";

pub fn dominant_pft(detailed: bool, input: Option<PathBuf>, output: &Path) -> Result<String> {
    let input = input.unwrap_or_else(|| {
        PathBuf::from(if detailed {
            SURFACE_DATASET_DETAILED
        } else {
            SURFACE_DATASET
        })
    });

    clm::dominant_pft(&input, output)?;

    Ok(output.display().to_string())
}

pub fn rooting_depth(pft_map: &Path, params: &Path, output: &Path) -> Result<String> {
    clm::rooting_depth(pft_map, params, output)?;

    Ok(output.display().to_string())
}

pub fn mechanism(surface: &Path, output: &Path) -> Result<String> {
    clm::mechanism(surface, output)?;

    Ok(output.display().to_string())
}

pub fn soil_albedo(surface: &Path, output: &Path) -> Result<String> {
    clm::soil_albedo(surface, output)?;

    Ok(output.display().to_string())
}

pub fn pft_params(
    pft_map: &Path,
    params: &Path,
    physiology: &Path,
    output: &Path,
) -> Result<String> {
    clm::pft_params(pft_map, params, physiology, output)?;

    Ok(output.display().to_string())
}

pub fn modis_climatology(input_dir: &Path, output: &Path) -> Result<String> {
    modis::climatology(input_dir, output)
}

pub fn fluxnet(input: &Path, output: &Path) -> Result<String> {
    fluxnet_mod::process_metadata(input, output)
}
