//! FLUXNET2015 site metadata condensation.
//!
//! The distributed metadata file is long-format: one `(site, key, value)` row
//! per datum, with sensor heights and depths on the row *after* the variable
//! name they describe. This collapses it to one row per site with the fields
//! a land-surface model setup needs.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use regex::Regex;

#[derive(Debug, Default, Clone)]
pub struct Site {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub utc_offset: Option<f64>,
    pub canopy_height_values: Vec<f64>,
    pub atmospheric_sensor_heights: Vec<f64>,
    pub swc_depths: Vec<f64>,
    pub ts_depths: Vec<f64>,
}

impl Site {
    pub fn canopy_height(&self) -> Option<f64> {
        if self.canopy_height_values.is_empty() {
            return None;
        }

        Some(self.canopy_height_values.iter().sum::<f64>() / self.canopy_height_values.len() as f64)
    }
}

/// A `(site_id, key, value)` triple from the long-format file.
#[derive(Debug, Clone)]
pub struct Row {
    pub site_id: String,
    pub key: String,
    pub value: String,
}

/// Collapses the long-format rows to per-site metadata.
///
/// Sensor heights and depths are taken from the value of the row following
/// their variable-name row; unparseable numbers are skipped.
pub fn condense(rows: &[Row]) -> BTreeMap<String, Site> {
    let swc_pattern = Regex::new(r"^SWC_F_MDS_\d+$").expect("valid pattern");
    let ts_pattern = Regex::new(r"^TS_F_MDS_\d+$").expect("valid pattern");

    let mut sites: BTreeMap<String, Site> = BTreeMap::new();

    for (i, row) in rows.iter().enumerate() {
        let parsed = row.value.parse::<f64>().ok();

        // Sites only come into existence through a recognised row, so a
        // header line never produces a phantom site.
        match row.key.as_str() {
            "LOCATION_LAT" => sites.entry(row.site_id.clone()).or_default().latitude = parsed,
            "LOCATION_LONG" => sites.entry(row.site_id.clone()).or_default().longitude = parsed,
            "UTC_OFFSET" => sites.entry(row.site_id.clone()).or_default().utc_offset = parsed,
            "HEIGHTC" => {
                if let Some(height) = parsed {
                    sites
                        .entry(row.site_id.clone())
                        .or_default()
                        .canopy_height_values
                        .push(height);
                }
            }
            _ => {}
        }

        let follow_on = rows.get(i + 1).and_then(|next| next.value.parse::<f64>().ok());
        if let Some(value) = follow_on {
            if row.value == "CO2_F_MDS" {
                let site = sites.entry(row.site_id.clone()).or_default();
                push_unique(&mut site.atmospheric_sensor_heights, value);
            } else if swc_pattern.is_match(&row.value) {
                let site = sites.entry(row.site_id.clone()).or_default();
                push_unique(&mut site.swc_depths, value);
            } else if ts_pattern.is_match(&row.value) {
                let site = sites.entry(row.site_id.clone()).or_default();
                push_unique(&mut site.ts_depths, value);
            }
        }
    }

    for site in sites.values_mut() {
        sort(&mut site.atmospheric_sensor_heights);
        sort(&mut site.swc_depths);
        sort(&mut site.ts_depths);
    }

    sites
}

fn push_unique(values: &mut Vec<f64>, value: f64) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn sort(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).expect("depths are finite"));
}

/// Joins a sorted set with `;`, emitting `NaN` when the set is empty.
pub fn join_depths(values: &[f64]) -> String {
    if values.is_empty() {
        return "NaN".to_string();
    }

    join(values)
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_value(*v))
        .collect::<Vec<_>>()
        .join(";")
}

fn optional(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_default()
}

// Whole floats keep their trailing `.0`, e.g. a UTC offset of 1 is "1.0".
fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

/// Reads the metadata CSV, condenses it, and writes the per-site CSV.
pub fn process_metadata(input: &Path, output: &Path) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(input)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 5 {
            continue;
        }
        rows.push(Row {
            site_id: record[0].to_string(),
            key: record[3].to_string(),
            value: record[4].to_string(),
        });
    }

    let sites = condense(&rows);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([
        "site_id",
        "latitude",
        "longitude",
        "utc_offset",
        "canopy_height",
        "atmospheric_sensor_heights",
        "swc_depths",
        "ts_depths",
    ])?;
    for (site_id, site) in &sites {
        writer.write_record([
            site_id.as_str(),
            &optional(site.latitude),
            &optional(site.longitude),
            &optional(site.utc_offset),
            &optional(site.canopy_height()),
            &join(&site.atmospheric_sensor_heights),
            &join_depths(&site.swc_depths),
            &join_depths(&site.ts_depths),
        ])?;
    }
    writer.flush()?;

    Ok(output.display().to_string())
}

// -- Tests -------------------------------------------------------------------
