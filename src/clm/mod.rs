//! Regridding of CLM parameter tables onto the surface-dataset grid.
//!
//! CLM surface datasets carry curvilinear 2-D `LATIXY`/`LONGXY` coordinates;
//! every map produced here collapses them to 1-D `lat`/`lon` axes by
//! row/column averaging and writes one value per gridcell, looked up from a
//! per-PFT or per-soil-colour table.

pub mod albedo;
pub mod dominant;
pub mod params;

use std::path::Path;

use ndarray::{Array1, Array2, Array3, Axis};
use thiserror::Error;

pub use albedo::{soil_albedo, SOIL_ALBEDOS};
pub use dominant::{dominant_pft, mechanism};
pub use params::{pft_params, rooting_depth};

#[derive(Debug, Error)]
pub enum ClmError {
    #[error("netcdf error: {0}")]
    Netcdf(#[from] netcdf::Error),
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("variable `{0}` not found in `{1}`")]
    MissingVariable(String, String),
    #[error("expected `{variable}` to have {expected} dimensions, found {found}")]
    BadRank {
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error("soil colour {0} outside the 1..=20 table range")]
    BadSoilColor(i32),
}

/// The 1-D grid written to every output map.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub lat: Array1<f64>,
    pub lon: Array1<f64>,
}

impl Grid {
    /// Reads `LATIXY`/`LONGXY` and averages them down to 1-D axes.
    pub fn from_surface_dataset(file: &netcdf::File, path: &Path) -> Result<Self, ClmError> {
        let latixy = get_2d::<f64>(file, "LATIXY", path)?;
        let longxy = get_2d::<f64>(file, "LONGXY", path)?;

        Ok(Grid {
            lat: latixy.mean_axis(Axis(1)).expect("LATIXY has columns"),
            lon: longxy.mean_axis(Axis(0)).expect("LONGXY has rows"),
        })
    }

    /// Reads the 1-D `lat`/`lon` axes of a map produced by this crate.
    pub fn from_map(file: &netcdf::File, path: &Path) -> Result<Self, ClmError> {
        Ok(Grid {
            lat: Array1::from_vec(get_1d::<f64>(file, "lat", path)?),
            lon: Array1::from_vec(get_1d::<f64>(file, "lon", path)?),
        })
    }
}

fn missing(name: &str, path: &Path) -> ClmError {
    ClmError::MissingVariable(name.to_string(), path.display().to_string())
}

fn variable_shape(
    var: &netcdf::Variable,
    name: &str,
    expected: usize,
) -> Result<Vec<usize>, ClmError> {
    let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    if dims.len() != expected {
        return Err(ClmError::BadRank {
            variable: name.to_string(),
            expected,
            found: dims.len(),
        });
    }
    Ok(dims)
}

pub(crate) fn get_1d<T: netcdf::NcTypeDescriptor + Copy>(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<T>, ClmError> {
    let var = file.variable(name).ok_or_else(|| missing(name, path))?;
    variable_shape(&var, name, 1)?;
    Ok(var.get_values(..)?)
}

pub(crate) fn get_2d<T: netcdf::NcTypeDescriptor + Copy>(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Array2<T>, ClmError> {
    let var = file.variable(name).ok_or_else(|| missing(name, path))?;
    let dims = variable_shape(&var, name, 2)?;
    let values: Vec<T> = var.get_values(..)?;

    Ok(Array2::from_shape_vec((dims[0], dims[1]), values)?)
}

pub(crate) fn get_3d<T: netcdf::NcTypeDescriptor + Copy>(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Array3<T>, ClmError> {
    let var = file.variable(name).ok_or_else(|| missing(name, path))?;
    let dims = variable_shape(&var, name, 3)?;
    let values: Vec<T> = var.get_values(..)?;

    Ok(Array3::from_shape_vec((dims[0], dims[1], dims[2]), values)?)
}

/// Creates an output map file with `lat`/`lon` dimensions and coordinates.
pub(crate) fn create_map_file(path: &Path, grid: &Grid) -> Result<netcdf::FileMut, ClmError> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("lat", grid.lat.len())?;
    file.add_dimension("lon", grid.lon.len())?;

    let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
    lat_var.put_attribute("units", "degrees_north")?;
    lat_var.put_values(grid.lat.as_slice().expect("contiguous"), ..)?;

    let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
    lon_var.put_attribute("units", "degrees_east")?;
    lon_var.put_values(grid.lon.as_slice().expect("contiguous"), ..)?;

    Ok(file)
}

/// Adds a f32 gridcell map variable with its attributes and data.
pub(crate) fn put_map_variable(
    file: &mut netcdf::FileMut,
    name: &str,
    long_name: &str,
    units: &str,
    data: &Array2<f32>,
) -> Result<(), ClmError> {
    let mut var = file.add_variable::<f32>(name, &["lat", "lon"])?;
    var.put_attribute("long_name", long_name)?;
    var.put_attribute("units", units)?;
    var.put_attribute("_FillValue", f32::NAN)?;
    var.put_values(data.as_slice().expect("contiguous"), (.., ..))?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn should_average_curvilinear_grid_to_axes() {
        let latixy = array![[10.0, 10.0, 10.0], [20.0, 20.0, 20.0]];
        let longxy = array![[0.0, 90.0, 180.0], [0.0, 90.0, 180.0]];

        let lat = latixy.mean_axis(Axis(1)).unwrap();
        let lon = longxy.mean_axis(Axis(0)).unwrap();

        assert_eq!(lat, array![10.0, 20.0]);
        assert_eq!(lon, array![0.0, 90.0, 180.0]);
    }
}
