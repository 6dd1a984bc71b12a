use anyhow::{Error, Result};
use clap::Parser;

use clima_fetch::cli::{command, Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Era5PressureMonthly { key, resume, dir } => {
            command::era5_pressure_monthly(key, resume, dir).await
        }
        Commands::Era5HourlyMonthly { key, resume, dir } => {
            command::era5_hourly_monthly(key, resume, dir).await
        }
        Commands::Era5SingleMonthly { key, target } => {
            command::era5_single_monthly(key, target).await
        }
        Commands::Era5Fluxes2008 { key } => command::era5_fluxes_2008(key).await,
        Commands::Era5Forcing {
            key,
            year_begin,
            year_end,
            split,
        } => command::era5_forcing(key, year_begin, year_end, split).await,
        Commands::Era5ForcingUnzip { dir } => command::era5_forcing_unzip(&dir),
        Commands::Era5Calibration { key } => command::era5_calibration(key).await,
        Commands::Era5Cloud { key } => command::era5_cloud(key).await,
        Commands::Era5LaiCovers { key } => command::era5_lai_covers(key).await,
        Commands::Cloudsat {} => command::cloudsat().await,
        Commands::DominantPft {
            detailed,
            input,
            output,
        } => command::dominant_pft(detailed, input, &output),
        Commands::RootingDepth {
            pft_map,
            params,
            output,
        } => command::rooting_depth(&pft_map, &params, &output),
        Commands::Mechanism { surface, output } => command::mechanism(&surface, &output),
        Commands::SoilAlbedo { surface, output } => command::soil_albedo(&surface, &output),
        Commands::PftParams {
            pft_map,
            params,
            physiology,
            output,
        } => command::pft_params(&pft_map, &params, &physiology, &output),
        Commands::ModisClimatology { input_dir, output } => {
            command::modis_climatology(&input_dir, &output)
        }
        Commands::Fluxnet { input, output } => command::fluxnet(&input, &output),
    };

    match outcome {
        Ok(filename) => println!("File saved to `{}`", filename),
        Err(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}
