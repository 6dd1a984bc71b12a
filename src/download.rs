//! Downloads and extracts dataset archives.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Error, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use zip::ZipArchive;

/// Downloads the file at the specified URL and streams it to the specified
/// path, with a progress bar once the content length is known.
pub async fn download_file_with_progress(
    url: &str,
    file_path: &Path,
    progress_bar: ProgressBar,
) -> Result<(), Error> {
    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(anyhow!("Failed to download file: {}", response.status()));
    }

    // Convert the spinner to a proper progress bar if the size is known
    let total_size = response.content_length().unwrap_or(0);
    if total_size > 0 {
        progress_bar.set_length(total_size);
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}",
            )
            .unwrap()
            .progress_chars("=> "),
        );
    }

    let mut file = File::create(file_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress_bar.set_position(downloaded);
    }

    Ok(())
}

/// Extracts a ZIP archive into the specified directory, creating it if needed.
pub fn extract_zip(zip_path: &Path, target_dir: &Path) -> Result<(), Error> {
    if !target_dir.is_dir() {
        fs::create_dir_all(target_dir)?;
    }

    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    archive.extract(target_dir)?;

    Ok(())
}

/// Extracts an ERA5 forcing archive, renaming its members.
///
/// The CDS splits a mixed-variable request into an accumulated/mean file and
/// an instantaneous file inside the ZIP. Members containing `avg` become
/// `{stem}_rate.nc` and members containing `instant` become `{stem}_inst.nc`,
/// both next to the archive. Anything else in the archive is an error.
pub fn extract_forcing_zip(zip_path: &Path) -> Result<Vec<PathBuf>, Error> {
    let stem = zip_path
        .to_str()
        .and_then(|s| s.strip_suffix(".zip"))
        .ok_or_else(|| anyhow!("Not a zip file: {}", zip_path.display()))?;

    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        let dest = PathBuf::from(forcing_member_name(member.name(), stem)?);

        let mut out = File::create(&dest)?;
        io::copy(&mut member, &mut out)?;
        extracted.push(dest);
    }

    Ok(extracted)
}

fn forcing_member_name(member: &str, stem: &str) -> Result<String> {
    if member.contains("avg") {
        Ok(format!("{}_rate.nc", stem))
    } else if member.contains("instant") {
        Ok(format!("{}_inst.nc", stem))
    } else {
        Err(anyhow!("Unexpected member `{}` in forcing archive", member))
    }
}

// -- Tests -------------------------------------------------------------------
