//! Climatology averaging over synthetic yearly MODIS LAI files.

use std::path::Path;

use clima_fetch::modis;

fn write_yearly_file(path: &Path, lai_value: f32) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", 12).unwrap();
    file.add_dimension("lat", 2).unwrap();
    file.add_dimension("lon", 2).unwrap();

    let mut time = file.add_variable::<i32>("time", &["time"]).unwrap();
    let stamps: Vec<i32> = (0..12).map(|i| 946_684_800 + i * 30 * 86_400).collect();
    time.put_values(&stamps, ..).unwrap();

    let mut lat = file.add_variable::<f64>("lat", &["lat"]).unwrap();
    lat.put_values(&[-45.0, 45.0], ..).unwrap();
    let mut lon = file.add_variable::<f64>("lon", &["lon"]).unwrap();
    lon.put_values(&[-90.0, 90.0], ..).unwrap();

    let mut lai = file
        .add_variable::<f32>("lai", &["time", "lat", "lon"])
        .unwrap();
    let mut values = vec![lai_value; 12 * 2 * 2];
    // make January distinguishable from the annual mean
    values[0] = lai_value + 1.0;
    lai.put_values(&values, (.., .., ..)).unwrap();
}

#[test]
fn climatology_averages_each_month_across_years() {
    let dir = tempfile::tempdir().unwrap();
    write_yearly_file(&dir.path().join("Yuan_et_al_2001_1x1.nc"), 1.0);
    write_yearly_file(&dir.path().join("Yuan_et_al_2002_1x1.nc"), 3.0);

    let output = dir.path().join("climatology.nc");
    modis::climatology(dir.path(), &output).unwrap();

    let file = netcdf::open(&output).unwrap();
    let lai: Vec<f32> = file.variable("lai").unwrap().get_values(..).unwrap();
    assert_eq!(lai.len(), 48);
    assert_eq!(lai[0], 3.0); // January: mean of 2.0 and 4.0
    assert_eq!(lai[4], 2.0); // February onwards: mean of 1.0 and 3.0

    let time: Vec<i32> = file.variable("time").unwrap().get_values(..).unwrap();
    assert_eq!(time.len(), 12);
    assert_eq!(time[0], 946_684_800);
    assert_eq!(time[1] - time[0], 30 * 86_400);

    let lat: Vec<f64> = file.variable("lat").unwrap().get_values(..).unwrap();
    assert_eq!(lat, vec![-45.0, 45.0]);
}

#[test]
fn climatology_rejects_empty_input_directory() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("climatology.nc");

    let result = modis::climatology(dir.path(), &output);
    assert!(result.is_err());
}

#[test]
fn climatology_ignores_unrelated_files() {
    let dir = tempfile::tempdir().unwrap();
    write_yearly_file(&dir.path().join("Yuan_et_al_2001_1x1.nc"), 2.0);
    std::fs::write(dir.path().join("notes.txt"), "not a dataset").unwrap();

    let output = dir.path().join("climatology.nc");
    modis::climatology(dir.path(), &output).unwrap();

    let file = netcdf::open(&output).unwrap();
    let lai: Vec<f32> = file.variable("lai").unwrap().get_values(..).unwrap();
    assert_eq!(lai[4], 2.0);
}
