//! CloudSat/CALIPSO seasonal radar-lidar climatology from Zenodo.

use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use crate::cli::create_spinner;
use crate::download::{download_file_with_progress, extract_zip};

const ARCHIVES: [(&str, &str); 2] = [
    (
        "https://zenodo.org/records/12768877/files/radarlidar_seasonal_10x10.zip?download=1",
        "radarlidar_seasonal_10x10.zip",
    ),
    (
        "https://zenodo.org/records/12768877/files/radarlidar_seasonal_2.5x2.5.zip?download=1",
        "radarlidar_seasonal_2.5x2.5.zip",
    ),
];

const TARGET_DIR: &str = "radarlidar_seasonal_data";

/// Downloads both seasonal archives and extracts them into
/// `radarlidar_seasonal_data/`. The archives themselves only live in a
/// temporary directory.
pub async fn cloudsat() -> Result<String> {
    let tmp_dir = TempDir::new()?;
    let target = Path::new(TARGET_DIR);

    for (url, file_name) in ARCHIVES {
        let zip_path = tmp_dir.path().join(file_name);

        let bar = create_spinner(format!("Downloading {}...", file_name));
        download_file_with_progress(url, &zip_path, bar.clone()).await?;
        bar.finish_with_message(format!("{} downloaded", file_name));

        let bar = create_spinner(format!("Unpacking {}...", file_name));
        extract_zip(&zip_path, target)?;
        bar.finish_with_message(format!("{} unpacked", file_name));
    }

    Ok(target.display().to_string())
}
