pub mod cloudsat;
pub mod era5;
pub mod forcing;
pub mod prepare;
pub mod queued;

pub use cloudsat::cloudsat;
pub use era5::{era5_calibration, era5_cloud, era5_fluxes_2008, era5_lai_covers, era5_single_monthly};
pub use forcing::{era5_forcing, era5_forcing_unzip};
pub use prepare::{
    dominant_pft, fluxnet, mechanism, modis_climatology, pft_params, rooting_depth, soil_albedo,
};
pub use queued::{era5_hourly_monthly, era5_pressure_monthly};
