//! The PROCAR data model: parsing, assembly and merging.

pub(crate) mod assemble;
pub(crate) mod extract;

use std::fmt;
use std::fs;
use std::path::Path;

use ndarray::{concatenate, Array2, Array5, Axis};
use tracing::{info, warn};

use crate::config::NegativeOccupancies;
use crate::error::{ProcarError, Result};

/// Spin treatment of the calculation, inferred from record counts.
///
/// The PROCAR header does not declare the spin treatment; the number of
/// projection records relative to `bands x k-points` is the only reliable
/// discriminator. The mode is resolved exactly once during parsing and is
/// never re-inferred downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationMode {
    NonSpinPolarised,
    SpinPolarised,
    NonCollinear,
}

impl CalculationMode {
    /// Number of spin components stored per band: 1, 2 or 4.
    pub fn spin_channels(self) -> usize {
        match self {
            Self::NonSpinPolarised => 1,
            Self::SpinPolarised => 2,
            Self::NonCollinear => 4,
        }
    }

    /// How many times the k-point blocks repeat in the file.
    pub fn k_point_blocks(self) -> usize {
        match self {
            Self::SpinPolarised => 2,
            Self::NonSpinPolarised | Self::NonCollinear => 1,
        }
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NonSpinPolarised => "non-spin-polarised",
            Self::SpinPolarised => "spin-polarised",
            Self::NonCollinear => "non-collinear",
        })
    }
}

/// One parsed PROCAR file.
///
/// `data` always has the shape
/// `(k-points, bands, spin channels, ions + 1, projections)` regardless of
/// the raw layout in the file. The last site row is the total over ions
/// and the last projection column is the total over orbitals.
#[derive(Debug, Clone)]
pub struct Procar {
    pub mode: CalculationMode,
    /// K-point count declared in the header (one spin block).
    pub number_of_k_points: usize,
    pub number_of_bands: usize,
    pub number_of_ions: usize,
    /// Orbital channels plus the trailing total column.
    pub number_of_projections: usize,
    /// Fractional reciprocal coordinates, `k_point_blocks * K` rows.
    pub k_points: Array2<f64>,
    /// `[band_index, energy]` rows in file order.
    pub bands: Array2<f64>,
    /// `[band_index, occupancy]` rows in file order, policy applied.
    pub occupancy: Array2<f64>,
    pub data: Array5<f64>,
}

impl Procar {
    /// Read a PROCAR file with the default (warn) occupancy policy.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_policy(path, NegativeOccupancies::default())
    }

    /// Read a PROCAR file with an explicit negative-occupancy policy.
    pub fn from_file_with_policy(
        path: impl AsRef<Path>,
        policy: NegativeOccupancies,
    ) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProcarError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let procar = Self::from_text(&text, policy)?;
        info!(
            path = %path.display(),
            mode = %procar.mode,
            k_points = procar.number_of_k_points,
            bands = procar.number_of_bands,
            ions = procar.number_of_ions,
            "parsed PROCAR"
        );
        Ok(procar)
    }

    /// Parse a PROCAR file already materialised in memory.
    ///
    /// Any parse-time error aborts the whole parse; no partial dataset is
    /// returned.
    pub fn from_text(text: &str, policy: NegativeOccupancies) -> Result<Self> {
        let mut lines = text.splitn(3, '\n');
        let _banner = lines.next();
        let header = lines.next().ok_or_else(|| ProcarError::MalformedHeader {
            line: String::new(),
        })?;
        let body = lines.next().unwrap_or("");

        let (number_of_k_points, number_of_bands, number_of_ions) = extract::parse_header(header)?;

        let k_points = extract::k_points(body);
        let bands = extract::band_energies(body);
        let occupancy = apply_occupancy_policy(&extract::occupancies(body), policy)?;
        let records = extract::projection_records(body);

        let mode = assemble::infer_mode(records.len(), number_of_bands, number_of_k_points)?;
        let data = assemble::assemble(
            records,
            mode,
            number_of_k_points,
            number_of_bands,
            number_of_ions,
        )?;
        assemble::validate_counts(
            mode,
            number_of_k_points,
            number_of_bands,
            k_points.nrows(),
            bands.nrows(),
            occupancy.nrows(),
        )?;
        let number_of_projections = data.shape()[4];

        Ok(Self {
            mode,
            number_of_k_points,
            number_of_bands,
            number_of_ions,
            number_of_projections,
            k_points,
            bands,
            occupancy,
            data,
        })
    }

    /// Concatenate two parsed files along the k-point axis.
    ///
    /// Both inputs are left untouched; the result owns freshly allocated
    /// arrays. The datasets must agree on everything except the k-point
    /// count. Spin-polarised files store their two spin blocks as
    /// consecutive row groups, so the ancillary tables merge block-wise
    /// rather than by plain row concatenation.
    pub fn concat(&self, other: &Procar) -> Result<Procar> {
        if self.mode != other.mode {
            return Err(ProcarError::IncompatibleMerge {
                field: "calculation mode",
                left: self.mode.to_string(),
                right: other.mode.to_string(),
            });
        }
        let check = |field: &'static str, left: usize, right: usize| -> Result<()> {
            if left == right {
                Ok(())
            } else {
                Err(ProcarError::IncompatibleMerge {
                    field,
                    left: left.to_string(),
                    right: right.to_string(),
                })
            }
        };
        check("ion count", self.number_of_ions, other.number_of_ions)?;
        check("band count", self.number_of_bands, other.number_of_bands)?;
        check(
            "projection count",
            self.number_of_projections,
            other.number_of_projections,
        )?;

        let blocks = self.mode.k_point_blocks();
        let data = concatenate(Axis(0), &[self.data.view(), other.data.view()])
            .expect("remaining axes validated above");

        Ok(Procar {
            mode: self.mode,
            number_of_k_points: self.number_of_k_points + other.number_of_k_points,
            number_of_bands: self.number_of_bands,
            number_of_ions: self.number_of_ions,
            number_of_projections: self.number_of_projections,
            k_points: concat_blockwise(&self.k_points, &other.k_points, blocks),
            bands: concat_blockwise(&self.bands, &other.bands, blocks),
            occupancy: concat_blockwise(&self.occupancy, &other.occupancy, blocks),
            data,
        })
    }
}

/// Apply a [`NegativeOccupancies`] policy to a `[band_index, occupancy]`
/// table, returning a new table and leaving the input untouched.
pub fn apply_occupancy_policy(
    occupancy: &Array2<f64>,
    policy: NegativeOccupancies,
) -> Result<Array2<f64>> {
    let any_negative = occupancy.column(1).iter().any(|&value| value < 0.0);
    match policy {
        NegativeOccupancies::Warn => {
            if any_negative {
                warn!("one or more occupancies in the PROCAR file are negative");
            }
            Ok(occupancy.clone())
        }
        NegativeOccupancies::Raise if any_negative => Err(ProcarError::NegativeOccupancy),
        NegativeOccupancies::Raise | NegativeOccupancies::Ignore => Ok(occupancy.clone()),
        NegativeOccupancies::Zero => {
            let mut clamped = occupancy.clone();
            for value in clamped.column_mut(1).iter_mut() {
                if *value < 0.0 {
                    *value = 0.0;
                }
            }
            Ok(clamped)
        }
    }
}

/// Row-concatenate two tables whose rows are grouped into `blocks`
/// consecutive sections, keeping the block structure intact.
fn concat_blockwise(left: &Array2<f64>, right: &Array2<f64>, blocks: usize) -> Array2<f64> {
    if blocks == 1 {
        return concatenate(Axis(0), &[left.view(), right.view()])
            .expect("tables have equal column counts");
    }
    let columns = left.ncols();
    let left_rows = left.nrows() / blocks;
    let right_rows = right.nrows() / blocks;
    let mut values = Vec::with_capacity((left.nrows() + right.nrows()) * columns);
    for block in 0..blocks {
        for row in 0..left_rows {
            values.extend(left.row(block * left_rows + row).iter().copied());
        }
        for row in 0..right_rows {
            values.extend(right.row(block * right_rows + row).iter().copied());
        }
    }
    Array2::from_shape_vec((left.nrows() + right.nrows(), columns), values)
        .expect("tables have equal column counts")
}
