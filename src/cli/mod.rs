//! Command line interface.

pub mod command;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queued download of ERA5 monthly pressure-level means, 1979-2024
    Era5PressureMonthly {
        /// CDS API key (falls back to CDSAPI_KEY or ~/.cdsapirc)
        #[arg(short, long)]
        key: Option<String>,
        /// Resume from the status CSV of an interrupted run
        #[arg(short, long)]
        resume: bool,
        /// Download target directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Queued download of ERA5 monthly single-level means by hour of day, 1979-2024
    Era5HourlyMonthly {
        #[arg(short, long)]
        key: Option<String>,
        #[arg(short, long)]
        resume: bool,
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Single-request download of ERA5 monthly surface fluxes, 1979-2024
    Era5SingleMonthly {
        #[arg(short, long)]
        key: Option<String>,
        /// Download target file
        #[arg(short, long)]
        target: Option<PathBuf>,
    },
    /// ERA5 monthly surface fluxes for 2008, both monthly product types
    Era5Fluxes2008 {
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Hourly ERA5 land forcing data for a span of years, one request per month
    Era5Forcing {
        #[arg(short, long)]
        key: Option<String>,
        /// First year to download
        year_begin: i32,
        /// One past the last year to download
        year_end: i32,
        /// Download rate and instantaneous variables as separate requests
        #[arg(long)]
        split: bool,
    },
    /// Unpack downloaded forcing archives, renaming members to _rate/_inst
    Era5ForcingUnzip {
        /// Directory holding the era_5_* year directories
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// ERA5 monthly-averaged calibration variables for 2013
    Era5Calibration {
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Hourly ERA5 pressure-level cloud variables for 2010
    Era5Cloud {
        #[arg(short, long)]
        key: Option<String>,
    },
    /// ERA5 low/high vegetation cover snapshot at 0.25 and 1.0 degrees
    Era5LaiCovers {
        #[arg(short, long)]
        key: Option<String>,
    },
    /// CloudSat/CALIPSO seasonal radar-lidar climatology from Zenodo
    Cloudsat {},
    /// Dominant plant functional type per gridcell from a CLM surface dataset
    DominantPft {
        /// Use the high resolution input surface dataset
        #[arg(short = 'D', long)]
        detailed: bool,
        /// Override the input surface dataset path
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long, default_value = "dominant_PFT_map.nc")]
        output: PathBuf,
    },
    /// Rooting depth map from the dominant PFT and CLM rootprof_beta
    RootingDepth {
        #[arg(long, default_value = "dominant_PFT_map.nc")]
        pft_map: PathBuf,
        #[arg(long, default_value = "clm5_params.c171117.nc")]
        params: PathBuf,
        #[arg(short, long, default_value = "root_map.nc")]
        output: PathBuf,
    },
    /// C3/C4 photosynthesis mechanism maps from a CLM surface dataset
    Mechanism {
        #[arg(long, default_value = "surfdata_0.9x1.25_16pfts__CMIP6_simyr2000_c170616.nc")]
        surface: PathBuf,
        #[arg(short, long, default_value = "mechanism_map.nc")]
        output: PathBuf,
    },
    /// Soil albedo maps from the CLM soil colour classes
    SoilAlbedo {
        #[arg(long, default_value = "surfdata_0.9x1.25_16pfts__CMIP6_simyr2000_c170616.nc")]
        surface: PathBuf,
        #[arg(short, long, default_value = "soil_properties_map.nc")]
        output: PathBuf,
    },
    /// PFT physiology parameter maps via the dominant PFT index
    PftParams {
        #[arg(long, default_value = "dominant_PFT_map.nc")]
        pft_map: PathBuf,
        #[arg(long, default_value = "clm5_params.c171117.nc")]
        params: PathBuf,
        #[arg(long, default_value = "pft-physiology.c110225.nc")]
        physiology: PathBuf,
        #[arg(short, long, default_value = "vegetation_properties_map.nc")]
        output: PathBuf,
    },
    /// Monthly LAI climatology averaged from yearly MODIS files
    ModisClimatology {
        /// Directory containing Yuan_et_al_YYYY_1x1.nc files
        #[arg(long)]
        input_dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Condense FLUXNET2015 site metadata to one row per site
    Fluxnet { input: PathBuf, output: PathBuf },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}
