//! CDS credential resolution.
//!
//! Mirrors the vendor SDK's lookup: an explicit key wins, then the
//! `CDSAPI_KEY`/`CDSAPI_URL` environment variables, then `~/.cdsapirc`.

use std::fs;
use std::path::Path;

use super::CdsError;

pub const DEFAULT_URL: &str = "https://cds.climate.copernicus.eu/api";

#[derive(Debug, Clone, PartialEq)]
pub struct CdsConfig {
    pub url: String,
    pub key: String,
}

impl CdsConfig {
    pub fn resolve(key_flag: Option<String>) -> Result<Self, CdsError> {
        let url = std::env::var("CDSAPI_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        if let Some(key) = key_flag {
            return Ok(CdsConfig { url, key });
        }
        if let Ok(key) = std::env::var("CDSAPI_KEY") {
            return Ok(CdsConfig { url, key });
        }
        if let Some(rc_path) = dirs::home_dir().map(|home| home.join(".cdsapirc")) {
            if let Some(config) = Self::from_rc_file(&rc_path) {
                return Ok(config);
            }
        }

        Err(CdsError::MissingKey)
    }

    /// Parses the two-line `url:`/`key:` rc file the vendor SDK writes.
    pub fn from_rc_file(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;

        let mut url = None;
        let mut key = None;
        for line in contents.lines() {
            if let Some((field, value)) = line.split_once(':') {
                match field.trim() {
                    "url" => url = Some(value.trim().to_string()),
                    "key" => key = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }

        Some(CdsConfig {
            url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            key: key?,
        })
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn should_parse_rc_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url: https://cds.climate.copernicus.eu/api").unwrap();
        writeln!(file, "key: 00000000-aaaa-bbbb-cccc-dddddddddddd").unwrap();

        let config = CdsConfig::from_rc_file(file.path()).unwrap();
        assert_eq!(config.url, "https://cds.climate.copernicus.eu/api");
        assert_eq!(config.key, "00000000-aaaa-bbbb-cccc-dddddddddddd");
    }

    #[test]
    fn should_default_url_when_rc_has_only_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key: my-key").unwrap();

        let config = CdsConfig::from_rc_file(file.path()).unwrap();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.key, "my-key");
    }

    #[test]
    fn should_reject_rc_without_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url: https://example.org/api").unwrap();

        assert!(CdsConfig::from_rc_file(file.path()).is_none());
    }

    #[test]
    fn should_prefer_explicit_key() {
        let config = CdsConfig::resolve(Some("explicit".to_string())).unwrap();
        assert_eq!(config.key, "explicit");
    }
}
