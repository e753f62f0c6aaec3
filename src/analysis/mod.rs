//! Query layer over a parsed [`Procar`]: weighted band structures and
//! effective-mass extraction.
//!
//! Query-time failures are local to the call; the underlying dataset stays
//! valid for further queries.

pub mod geometry;

use std::f64::consts::PI;
use std::io::Write;

use nalgebra::{Matrix3, Vector3};
use ndarray::{Array2, Axis};
use tracing::debug;

use crate::error::{ProcarError, Result};
use crate::procar::{CalculationMode, Procar};
use crate::units::ANGSTROM_TO_BOHR;

pub use geometry::{
    least_squares_effective_mass, points_are_collinear, triangle_area, two_point_effective_mass,
    COLLINEARITY_TOLERANCE,
};

/// One (x, energy, weight) sample of a weighted band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    /// Position along the k-point path.
    pub x: f64,
    /// Eigenvalue in eV, shifted by the reference energy.
    pub energy: f64,
    /// Summed projection weight.
    pub weight: f64,
}

/// A single band's trace along the k-point path.
#[derive(Debug, Clone)]
pub struct WeightedBand {
    /// 1-based band index.
    pub band: usize,
    pub points: Vec<BandPoint>,
}

/// Selections for [`Procar::weighted_band_structure`].
///
/// Every field defaults to the vasp convention: all spin channels, the
/// total-over-ions row, the total-over-orbitals column, no energy shift and
/// index-based k-point spacing. The orbital default has not been validated
/// against calculations with f-orbitals; pass an explicit selection there.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandWeightOptions<'a> {
    /// 1-based spin channels; all channels when `None`.
    pub spins: Option<&'a [usize]>,
    /// 0-based site rows (`number_of_ions` is the total row); total row when `None`.
    pub ions: Option<&'a [usize]>,
    /// 0-based projection columns; the trailing total column when `None`.
    pub orbitals: Option<&'a [usize]>,
    /// Reference energy subtracted from every eigenvalue.
    pub e_fermi: f64,
    /// Reciprocal lattice for geometric k-point spacing; sequential index
    /// spacing when `None`.
    pub reciprocal_lattice: Option<&'a Matrix3<f64>>,
}

impl Procar {
    /// Sum the projection array over the selected orbitals, then ions, then
    /// spins, pairing each band's weights with its energies and k-path
    /// positions.
    pub fn weighted_band_structure(
        &self,
        options: &BandWeightOptions<'_>,
    ) -> Result<Vec<WeightedBand>> {
        let spin_channels = self.mode.spin_channels();
        // An empty selection means "use the default", like `None`.
        let spins: Vec<usize> = match options.spins.filter(|list| !list.is_empty()) {
            Some(list) => list
                .iter()
                .map(|&spin| {
                    if spin == 0 || spin > spin_channels {
                        Err(ProcarError::InvalidSelection {
                            axis: "spin",
                            index: spin,
                            len: spin_channels,
                        })
                    } else {
                        Ok(spin - 1)
                    }
                })
                .collect::<Result<_>>()?,
            None => (0..spin_channels).collect(),
        };
        let ions = selection(
            options.ions.filter(|list| !list.is_empty()),
            self.number_of_ions,
            self.number_of_ions + 1,
            "ion site",
        )?;
        let orbitals = selection(
            options.orbitals.filter(|list| !list.is_empty()),
            self.number_of_projections.saturating_sub(1),
            self.number_of_projections,
            "orbital",
        )?;

        let orbital_sum = self.data.select(Axis(4), &orbitals).sum_axis(Axis(4));
        let ion_sum = orbital_sum.select(Axis(3), &ions).sum_axis(Axis(3));
        let weights = ion_sum.select(Axis(2), &spins).sum_axis(Axis(2));

        // Spin-polarised energies differ per channel; the first selected
        // channel supplies the eigenvalues, matching the projection sum's
        // leading spin.
        let energy_block = if self.mode == CalculationMode::SpinPolarised {
            spins[0]
        } else {
            0
        };
        let energies = self.band_energy_block(energy_block)?;
        let x_axis = self.x_axis(options.reciprocal_lattice);

        let mut traces = Vec::with_capacity(self.number_of_bands);
        for band in 0..self.number_of_bands {
            let points = (0..self.number_of_k_points)
                .map(|k| BandPoint {
                    x: x_axis[k],
                    energy: energies[[k, band]] - options.e_fermi,
                    weight: weights[[k, band]],
                })
                .collect();
            traces.push(WeightedBand {
                band: band + 1,
                points,
            });
        }
        Ok(traces)
    }

    /// Positions of the k-points along the path: cumulative Cartesian
    /// distance when a reciprocal lattice is supplied, plain sequential
    /// index otherwise (uncalibrated spacing).
    pub fn x_axis(&self, reciprocal_lattice: Option<&Matrix3<f64>>) -> Vec<f64> {
        let count = self.number_of_k_points;
        let lattice = match reciprocal_lattice {
            None => return (0..count).map(|i| i as f64).collect(),
            Some(lattice) => lattice,
        };
        let cartesian: Vec<Vector3<f64>> = (0..count)
            .map(|i| lattice.transpose() * self.fractional_k_point(i))
            .collect();
        let mut x_axis = Vec::with_capacity(count);
        let mut total = 0.0;
        x_axis.push(0.0);
        for i in 1..count {
            total += (cartesian[i] - cartesian[i - 1]).norm();
            x_axis.push(total);
        }
        x_axis
    }

    /// Effective mass, in electron masses, of `band` along the path picked
    /// out by `k_point_indices`.
    ///
    /// All indices are 1-based; `spin` selects the spin block (at most
    /// [`CalculationMode::k_point_blocks`]). With exactly two k-points the
    /// closed-form two-point formula is used; with more, a quadratic
    /// least-squares fit after checking that the points are collinear in
    /// Cartesian reciprocal space. Failures here never invalidate the
    /// parsed dataset.
    pub fn effective_mass(
        &self,
        k_point_indices: &[usize],
        band: usize,
        spin: usize,
        reciprocal_lattice: &Matrix3<f64>,
    ) -> Result<f64> {
        if k_point_indices.len() < 2 {
            return Err(ProcarError::InsufficientKPoints(k_point_indices.len()));
        }
        let blocks = self.mode.k_point_blocks();
        if spin == 0 || spin > blocks {
            return Err(ProcarError::InvalidSelection {
                axis: "spin block",
                index: spin,
                len: blocks,
            });
        }
        if band == 0 || band > self.number_of_bands {
            return Err(ProcarError::InvalidSelection {
                axis: "band",
                index: band,
                len: self.number_of_bands,
            });
        }
        let energies = self.band_energy_block(spin - 1)?;
        let scaled_lattice = reciprocal_lattice * 2.0 * PI * ANGSTROM_TO_BOHR;

        let mut cartesian = Vec::with_capacity(k_point_indices.len());
        let mut eigenvalues = Vec::with_capacity(k_point_indices.len());
        for &index in k_point_indices {
            if index == 0 || index > self.number_of_k_points {
                return Err(ProcarError::InvalidSelection {
                    axis: "k-point",
                    index,
                    len: self.number_of_k_points,
                });
            }
            cartesian.push(scaled_lattice.transpose() * self.fractional_k_point(index - 1));
            eigenvalues.push(energies[[index - 1, band - 1]]);
        }
        for ((&index, k), &eigenvalue) in k_point_indices.iter().zip(&cartesian).zip(&eigenvalues) {
            debug!(
                k_point = index,
                kx = k.x,
                ky = k.y,
                kz = k.z,
                eigenvalue,
                "effective-mass sample"
            );
        }

        if let [a, b] = cartesian[..] {
            Ok(two_point_effective_mass(
                &[a, b],
                [eigenvalues[0], eigenvalues[1]],
            ))
        } else {
            least_squares_effective_mass(&cartesian, &eigenvalues)
        }
    }

    /// Eigenvalues of one spin block as a `(k-points, bands)` matrix.
    fn band_energy_block(&self, block: usize) -> Result<Array2<f64>> {
        let blocks = self.mode.k_point_blocks();
        let rows = self.number_of_k_points * self.number_of_bands;
        if block >= blocks || self.bands.nrows() != blocks * rows {
            return Err(ProcarError::ShapeMismatch {
                expected: blocks * rows,
                actual: self.bands.nrows(),
            });
        }
        let values: Vec<f64> = self
            .bands
            .column(1)
            .iter()
            .skip(block * rows)
            .take(rows)
            .copied()
            .collect();
        Ok(
            Array2::from_shape_vec((self.number_of_k_points, self.number_of_bands), values)
                .expect("row count validated above"),
        )
    }

    fn fractional_k_point(&self, index: usize) -> Vector3<f64> {
        Vector3::new(
            self.k_points[[index, 0]],
            self.k_points[[index, 1]],
            self.k_points[[index, 2]],
        )
    }
}

/// Write a weighted band structure as whitespace-separated text, one block
/// per band, with weights multiplied by `scaling`.
pub fn write_band_structure<W: Write>(
    writer: &mut W,
    bands: &[WeightedBand],
    scaling: f64,
) -> Result<()> {
    for band in bands {
        writeln!(writer, "# band: {}", band.band)?;
        for point in &band.points {
            writeln!(
                writer,
                "{} {} {}",
                point.x,
                point.energy,
                point.weight * scaling
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn selection(
    requested: Option<&[usize]>,
    default_index: usize,
    len: usize,
    axis: &'static str,
) -> Result<Vec<usize>> {
    let indices: Vec<usize> = match requested {
        Some(list) => list.to_vec(),
        None => vec![default_index],
    };
    for &index in &indices {
        if index >= len {
            return Err(ProcarError::InvalidSelection { axis, index, len });
        }
    }
    Ok(indices)
}
