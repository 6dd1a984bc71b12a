//! Per-PFT parameter maps: rooting depth and physiology.

use std::path::Path;

use ndarray::Array2;

use super::{create_map_file, get_1d, get_2d, put_map_variable, ClmError, Grid};

/// Converts a CLM `rootprof_beta` value to a rooting depth parameter in
/// metres: `-1 / (100 ln beta)`.
pub fn rooting_depth_from_beta(beta: f64) -> f32 {
    (-1.0 / (100.0 * beta.ln())) as f32
}

/// Maps a per-PFT parameter vector onto the grid through the dominant PFT.
///
/// Cells with a negative PFT index (ocean/ice mask) stay at the NaN fill.
pub fn map_by_pft(dominant: &Array2<i32>, values: &[f64], f: impl Fn(f64) -> f32) -> Array2<f32> {
    let mut map = Array2::<f32>::from_elem(dominant.dim(), f32::NAN);
    for ((i, j), &pft) in dominant.indexed_iter() {
        if pft >= 0 {
            map[[i, j]] = f(values[pft as usize]);
        }
    }

    map
}

/// Writes the rooting depth map from the dominant PFT and `rootprof_beta`.
pub fn rooting_depth(pft_map: &Path, params: &Path, output: &Path) -> Result<(), ClmError> {
    let map_file = netcdf::open(pft_map)?;
    let grid = Grid::from_map(&map_file, pft_map)?;
    let dominant = get_2d::<i32>(&map_file, "dominant_PFT", pft_map)?;

    // rootprof_beta is (variant, pft); the zeroth variant matches the CLM
    // documentation.
    let params_file = netcdf::open(params)?;
    let beta = get_2d::<f64>(&params_file, "rootprof_beta", params)?;
    let beta_row: Vec<f64> = beta.row(0).to_vec();

    let depth = map_by_pft(&dominant, &beta_row, rooting_depth_from_beta);

    let mut out = create_map_file(output, &grid)?;
    put_map_variable(&mut out, "rooting_depth", "Rooting Depth Parameter", "m", &depth)?;

    Ok(())
}

/// The nine physiology parameters mapped by `pft_params`: variable name,
/// long name, units, and whether it comes from the parameter file (true) or
/// the pft-physiology file (false).
const PHYSIOLOGY_VARIABLES: [(&str, &str, &str, bool); 9] = [
    (
        "medlynslope",
        "Medlyn slope of conductance-photosynthesis relationship",
        "kPa^0.5",
        true,
    ),
    (
        "medlynintercept",
        "Medlyn intercept of conductance-photosynthesis relationship",
        "umol m^-2 s^-1",
        true,
    ),
    ("rholnir", "Leaf reflectance: near-IR", "fraction", false),
    ("rholvis", "Leaf reflectance: visible", "fraction", false),
    ("taulnir", "Leaf transmittance: near-IR", "fraction", false),
    ("taulvis", "Leaf transmittance: visible", "fraction", false),
    ("tausnir", "Stem transmittance: near-IR", "fraction", false),
    ("tausvis", "Stem transmittance: visible", "fraction", false),
    (
        "vcmx25",
        "Maximum rate of carboxylation at 25 degrees Celsius",
        "umol CO2/m**2/s",
        false,
    ),
];

/// Writes the vegetation physiology maps via the dominant PFT index.
pub fn pft_params(
    pft_map: &Path,
    params: &Path,
    physiology: &Path,
    output: &Path,
) -> Result<(), ClmError> {
    let map_file = netcdf::open(pft_map)?;
    let grid = Grid::from_map(&map_file, pft_map)?;
    let dominant = get_2d::<i32>(&map_file, "dominant_PFT", pft_map)?;

    let params_file = netcdf::open(params)?;
    let physiology_file = netcdf::open(physiology)?;

    let mut out = create_map_file(output, &grid)?;
    for (name, long_name, units, from_params) in PHYSIOLOGY_VARIABLES {
        let values = if from_params {
            get_1d::<f64>(&params_file, name, params)?
        } else {
            get_1d::<f64>(&physiology_file, name, physiology)?
        };

        let map = map_by_pft(&dominant, &values, |v| v as f32);
        put_map_variable(&mut out, name, long_name, units, &map)?;
    }

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use ndarray::array;

    use super::*;

    #[test]
    fn should_convert_beta_to_rooting_depth() {
        // beta = 0.99 gives -1/(100 ln 0.99) ~ 0.995 m
        let depth = rooting_depth_from_beta(0.99);
        assert!((depth - 0.99499).abs() < 1e-4);

        // Shallower-rooted PFTs have smaller beta and smaller depth
        assert!(rooting_depth_from_beta(0.95) < rooting_depth_from_beta(0.99));
    }

    #[test]
    fn should_map_values_through_dominant_pft() {
        let dominant = array![[0, 2], [1, 1]];
        let values = vec![10.0, 20.0, 30.0];

        let map = map_by_pft(&dominant, &values, |v| v as f32);
        assert_eq!(map, array![[10.0, 30.0], [20.0, 20.0]]);
    }

    #[test]
    fn should_leave_masked_cells_at_fill() {
        let dominant = array![[-1, 0]];
        let values = vec![5.0];

        let map = map_by_pft(&dominant, &values, |v| v as f32);
        assert!(map[[0, 0]].is_nan());
        assert_eq!(map[[0, 1]], 5.0);
    }
}
