//! Dominant PFT and photosynthesis mechanism maps.

use std::path::Path;

use ndarray::{Array2, Array3, Axis};

use super::{create_map_file, get_3d, ClmError, Grid};

/// The C4 grass PFT index in the 16-PFT surface datasets.
pub const C4_GRASS_PFT: usize = 14;

/// Writes the dominant PFT per gridcell from `PCT_NAT_PFT`.
pub fn dominant_pft(input: &Path, output: &Path) -> Result<(), ClmError> {
    let file = netcdf::open(input)?;
    let grid = Grid::from_surface_dataset(&file, input)?;
    let pct_nat_pft = get_3d::<f32>(&file, "PCT_NAT_PFT", input)?;
    println!("Dimensions of PCT_NAT_PFT: {:?}", pct_nat_pft.shape());

    let dominant = dominant_index(&pct_nat_pft);

    let mut out = create_map_file(output, &grid)?;
    let mut var = out.add_variable::<i32>("dominant_PFT", &["lat", "lon"])?;
    var.put_attribute("long_name", "dominant plant functional type")?;
    var.put_attribute("units", "index")?;
    var.put_values(dominant.as_slice().expect("contiguous"), (.., ..))?;

    out.add_attribute("title", "Dominant Plant Functional Type per Gridcell")?;
    out.add_attribute(
        "source",
        format!("Generated from PCT_NAT_PFT in {}", input.display()),
    )?;
    out.add_attribute("Conventions", "CF-1.8")?;

    Ok(())
}

/// Writes the C3 dominance and proportion maps from `PCT_NAT_PFT`.
pub fn mechanism(surface: &Path, output: &Path) -> Result<(), ClmError> {
    let file = netcdf::open(surface)?;
    let grid = Grid::from_surface_dataset(&file, surface)?;
    let pct_nat_pft = get_3d::<f32>(&file, "PCT_NAT_PFT", surface)?;

    let dominant = dominant_index(&pct_nat_pft);
    let c3_dominant = dominant.mapv(|pft| if pft as usize != C4_GRASS_PFT { 1.0f32 } else { 0.0 });
    let c3_proportion = pct_nat_pft
        .index_axis(Axis(0), C4_GRASS_PFT)
        .mapv(|pct_c4| 1.0 - pct_c4 / 100.0);

    let mut out = create_map_file(output, &grid)?;
    super::put_map_variable(
        &mut out,
        "c3_dominant",
        "c3 dominant",
        "0. = c4, 1. = c3",
        &c3_dominant,
    )?;
    super::put_map_variable(
        &mut out,
        "c3_proportion",
        "Proportion of plants that are c3",
        "proportion c3",
        &c3_proportion,
    )?;

    Ok(())
}

/// Index of the largest PFT percentage per gridcell.
///
/// `pct` is (pft, lat, lon); ties go to the lowest index, matching an argmax
/// over the leading axis.
pub fn dominant_index(pct: &Array3<f32>) -> Array2<i32> {
    let (_, nlat, nlon) = pct.dim();
    let mut dominant = Array2::<i32>::zeros((nlat, nlon));

    for i in 0..nlat {
        for j in 0..nlon {
            let column = pct.slice(ndarray::s![.., i, j]);
            let mut best = 0usize;
            for (k, &value) in column.iter().enumerate() {
                if value > column[best] {
                    best = k;
                }
            }
            dominant[[i, j]] = best as i32;
        }
    }

    dominant
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use ndarray::{array, Array3};

    use super::*;

    fn pct_fixture() -> Array3<f32> {
        // 3 PFTs on a 1x2 grid: cell (0,0) dominated by PFT 2,
        // cell (0,1) tied between PFTs 0 and 1.
        let mut pct = Array3::<f32>::zeros((3, 1, 2));
        pct[[0, 0, 0]] = 10.0;
        pct[[1, 0, 0]] = 30.0;
        pct[[2, 0, 0]] = 60.0;
        pct[[0, 0, 1]] = 50.0;
        pct[[1, 0, 1]] = 50.0;
        pct
    }

    #[test]
    fn should_pick_largest_percentage() {
        let dominant = dominant_index(&pct_fixture());
        assert_eq!(dominant[[0, 0]], 2);
    }

    #[test]
    fn should_break_ties_towards_lowest_index() {
        let dominant = dominant_index(&pct_fixture());
        assert_eq!(dominant[[0, 1]], 0);
    }

    #[test]
    fn should_classify_c3_dominance() {
        // C4 grass wins one cell, a C3 PFT the other
        let mut pct = Array3::<f32>::zeros((16, 1, 2));
        pct[[C4_GRASS_PFT, 0, 0]] = 80.0;
        pct[[1, 0, 0]] = 20.0;
        pct[[3, 0, 1]] = 90.0;
        pct[[C4_GRASS_PFT, 0, 1]] = 10.0;

        let dominant = dominant_index(&pct);
        let c3_dominant =
            dominant.mapv(|pft| if pft as usize != C4_GRASS_PFT { 1.0f32 } else { 0.0 });
        assert_eq!(c3_dominant, array![[0.0, 1.0]]);

        let c3_proportion = pct
            .index_axis(Axis(0), C4_GRASS_PFT)
            .mapv(|pct_c4| 1.0 - pct_c4 / 100.0);
        assert!((c3_proportion[[0, 0]] - 0.2).abs() < 1e-6);
        assert!((c3_proportion[[0, 1]] - 0.9).abs() < 1e-6);
    }
}
