//! CDS retrieval request bodies.
//!
//! The API wants every selector as a list of strings, even single years, so
//! the builder keeps everything stringly and the pipelines supply the exact
//! lists their datasets need.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub product_type: Vec<String>,
    pub variable: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pressure_level: Vec<String>,
    pub year: Vec<String>,
    pub month: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub day: Vec<String>,
    pub time: Vec<String>,
    pub data_format: String,
    pub download_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<[f64; 2]>,
}

impl Request {
    pub fn new(product_type: &str) -> Self {
        Request {
            product_type: vec![product_type.to_string()],
            variable: Vec::new(),
            pressure_level: Vec::new(),
            year: Vec::new(),
            month: Vec::new(),
            day: Vec::new(),
            time: Vec::new(),
            data_format: "netcdf".to_string(),
            download_format: "unarchived".to_string(),
            grid: None,
        }
    }

    pub fn product_types(mut self, product_types: &[&str]) -> Self {
        self.product_type = to_strings(product_types);
        self
    }

    pub fn variables(mut self, variables: &[&str]) -> Self {
        self.variable = to_strings(variables);
        self
    }

    pub fn pressure_levels(mut self, levels: &[&str]) -> Self {
        self.pressure_level = to_strings(levels);
        self
    }

    pub fn years(mut self, years: &[String]) -> Self {
        self.year = years.to_vec();
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = vec![year.to_string()];
        self
    }

    pub fn months(mut self, months: &[String]) -> Self {
        self.month = months.to_vec();
        self
    }

    pub fn days(mut self, days: &[String]) -> Self {
        self.day = days.to_vec();
        self
    }

    pub fn times(mut self, times: &[String]) -> Self {
        self.time = times.to_vec();
        self
    }

    pub fn data_format(mut self, format: &str) -> Self {
        self.data_format = format.to_string();
        self
    }

    pub fn grid(mut self, resolution: f64) -> Self {
        self.grid = Some([resolution, resolution]);
        self
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// "1979", "1980", ... up to but excluding `end`.
pub fn year_range(begin: i32, end: i32) -> Vec<String> {
    (begin..end).map(|y| y.to_string()).collect()
}

/// "01" through "12".
pub fn all_months() -> Vec<String> {
    (1..=12).map(|m| format!("{:02}", m)).collect()
}

/// "01" through "31"; the API ignores days a month does not have.
pub fn all_days() -> Vec<String> {
    (1..=31).map(|d| format!("{:02}", d)).collect()
}

/// "00:00" through "23:00".
pub fn all_hours() -> Vec<String> {
    (0..24).map(|h| format!("{:02}:00", h)).collect()
}

/// Midnight only, for the monthly-mean products.
pub fn midnight() -> Vec<String> {
    vec!["00:00".to_string()]
}

/// The full 37-level ERA5 pressure axis, in hPa.
pub const ALL_PRESSURE_LEVELS: [&str; 37] = [
    "1", "2", "3", "5", "7", "10", "20", "30", "50", "70", "100", "125", "150", "175", "200",
    "225", "250", "300", "350", "400", "450", "500", "550", "600", "650", "700", "750", "775",
    "800", "825", "850", "875", "900", "925", "950", "975", "1000",
];

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_serialise_full_request() {
        let request = Request::new("reanalysis")
            .variables(&["temperature"])
            .pressure_levels(&ALL_PRESSURE_LEVELS)
            .year(2010)
            .months(&all_months())
            .days(&all_days())
            .times(&all_hours())
            .grid(2.0);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["product_type"][0], "reanalysis");
        assert_eq!(json["variable"][0], "temperature");
        assert_eq!(json["pressure_level"].as_array().unwrap().len(), 37);
        assert_eq!(json["year"][0], "2010");
        assert_eq!(json["month"].as_array().unwrap().len(), 12);
        assert_eq!(json["day"].as_array().unwrap().len(), 31);
        assert_eq!(json["time"].as_array().unwrap().len(), 24);
        assert_eq!(json["data_format"], "netcdf");
        assert_eq!(json["download_format"], "unarchived");
        assert_eq!(json["grid"][0], 2.0);
    }

    #[test]
    fn should_omit_empty_selectors() {
        let request = Request::new("monthly_averaged_reanalysis")
            .variables(&["geopotential"])
            .year(1979)
            .months(&all_months())
            .times(&midnight());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("pressure_level").is_none());
        assert!(json.get("day").is_none());
        assert!(json.get("grid").is_none());
    }

    #[test]
    fn should_zero_pad_months_and_days() {
        assert_eq!(all_months()[0], "01");
        assert_eq!(all_months()[11], "12");
        assert_eq!(all_days()[0], "01");
        assert_eq!(all_days()[30], "31");
        assert_eq!(all_hours()[0], "00:00");
        assert_eq!(all_hours()[23], "23:00");
    }

    #[test]
    fn should_expand_year_range_exclusive() {
        let years = year_range(1979, 2025);
        assert_eq!(years.len(), 46);
        assert_eq!(years.first().unwrap(), "1979");
        assert_eq!(years.last().unwrap(), "2024");
    }
}
