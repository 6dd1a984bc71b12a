//! Soil-colour albedo lookup.

use std::path::Path;

use ndarray::Array2;

use super::{create_map_file, get_2d, put_map_variable, ClmError, Grid};

/// Dry and saturated soil albedos per soil colour class, CLM5.0 Tech Note
/// Table 3.3. Columns: dry vis, dry nir, saturated vis, saturated nir.
pub const SOIL_ALBEDOS: [[f32; 4]; 20] = [
    [0.36, 0.61, 0.25, 0.50], // color = 1
    [0.34, 0.57, 0.23, 0.46], // color = 2
    [0.32, 0.53, 0.21, 0.42], // color = 3
    [0.31, 0.51, 0.20, 0.40], // color = 4
    [0.30, 0.49, 0.19, 0.38], // color = 5
    [0.29, 0.48, 0.18, 0.36], // color = 6
    [0.28, 0.45, 0.17, 0.34], // color = 7
    [0.27, 0.43, 0.16, 0.32], // color = 8
    [0.26, 0.41, 0.15, 0.30], // color = 9
    [0.25, 0.39, 0.14, 0.28], // color = 10
    [0.24, 0.37, 0.13, 0.26], // color = 11
    [0.23, 0.35, 0.12, 0.24], // color = 12
    [0.22, 0.33, 0.11, 0.22], // color = 13
    [0.20, 0.31, 0.10, 0.20], // color = 14
    [0.18, 0.29, 0.09, 0.18], // color = 15
    [0.16, 0.27, 0.08, 0.16], // color = 16
    [0.14, 0.25, 0.07, 0.14], // color = 17
    [0.12, 0.23, 0.06, 0.12], // color = 18
    [0.10, 0.21, 0.05, 0.10], // color = 19
    [0.08, 0.16, 0.04, 0.08], // color = 20
];

/// Albedo band within the table.
#[derive(Debug, Clone, Copy)]
pub enum Band {
    DryVis = 0,
    DryNir = 1,
    WetVis = 2,
    WetNir = 3,
}

/// Looks an albedo up by 1-based soil colour class.
pub fn albedo_for_color(color: i32, band: Band) -> Result<f32, ClmError> {
    if !(1..=20).contains(&color) {
        return Err(ClmError::BadSoilColor(color));
    }

    Ok(SOIL_ALBEDOS[(color - 1) as usize][band as usize])
}

/// Writes the four soil albedo maps from a surface dataset's `SOIL_COLOR`.
pub fn soil_albedo(surface: &Path, output: &Path) -> Result<(), ClmError> {
    let file = netcdf::open(surface)?;
    let grid = Grid::from_surface_dataset(&file, surface)?;
    let soil_colors = get_2d::<i32>(&file, "SOIL_COLOR", surface)?;

    let mut maps = [(); 4].map(|_| Array2::<f32>::zeros(soil_colors.dim()));
    for ((i, j), &color) in soil_colors.indexed_iter() {
        maps[0][[i, j]] = albedo_for_color(color, Band::DryVis)?;
        maps[1][[i, j]] = albedo_for_color(color, Band::DryNir)?;
        maps[2][[i, j]] = albedo_for_color(color, Band::WetVis)?;
        maps[3][[i, j]] = albedo_for_color(color, Band::WetNir)?;
    }

    let mut out = create_map_file(output, &grid)?;
    put_map_variable(&mut out, "PAR_albedo_dry", "PAR albedo dry", "[0 to 1]", &maps[0])?;
    put_map_variable(&mut out, "NIR_albedo_dry", "NIR albedo dry", "[0 to 1]", &maps[1])?;
    put_map_variable(&mut out, "PAR_albedo_wet", "PAR albedo saturated", "[0 to 1]", &maps[2])?;
    put_map_variable(&mut out, "NIR_albedo_wet", "NIR albedo saturated", "[0 to 1]", &maps[3])?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------
