//! Calculation-mode inference, array assembly and post-parse validation.

use ndarray::{s, Array5};

use crate::error::{ProcarError, Result};
use crate::procar::CalculationMode;

/// Infer the spin treatment from the projection record count.
///
/// The hypotheses are tried in a fixed priority order against the
/// header-declared `bands x k-points` product. A zero-sized header would
/// let an empty file satisfy the first hypothesis, so it is rejected
/// before the rules run.
pub(crate) fn infer_mode(records: usize, bands: usize, k_points: usize) -> Result<CalculationMode> {
    let base = bands * k_points;
    if base == 0 {
        return Err(ProcarError::UnrecognisedLayout {
            records,
            bands,
            k_points,
        });
    }
    if records == base {
        Ok(CalculationMode::NonSpinPolarised)
    } else if records == base * 4 {
        Ok(CalculationMode::NonCollinear)
    } else if records == base * 2 {
        Ok(CalculationMode::SpinPolarised)
    } else {
        Err(ProcarError::UnrecognisedLayout {
            records,
            bands,
            k_points,
        })
    }
}

/// Reshape the flat projection records into the uniform 5-axis layout
/// `(k-points, bands, spin, ions + 1, projections)`.
///
/// Spin-polarised files store the two spin channels as leading blocks, so
/// their spin axis has to be moved inward after the reshape; the other two
/// modes store spin sub-blocks adjacent to the ion rows and need no
/// reordering. The leading sentinel column (ion index / `tot` marker) is
/// stripped from the projection axis.
pub(crate) fn assemble(
    records: Vec<Vec<f64>>,
    mode: CalculationMode,
    k_points: usize,
    bands: usize,
    ions: usize,
) -> Result<Array5<f64>> {
    let sites = ions + 1;
    let rows = records.len();
    let spin_channels = mode.spin_channels();
    if rows != k_points * bands * spin_channels {
        return Err(ProcarError::ShapeMismatch {
            expected: k_points * bands * spin_channels,
            actual: rows,
        });
    }
    let width = records[0].len();
    if let Some(bad) = records.iter().find(|record| record.len() != width) {
        return Err(ProcarError::ShapeMismatch {
            expected: width,
            actual: bad.len(),
        });
    }
    if width == 0 || width % sites != 0 {
        return Err(ProcarError::ShapeMismatch {
            expected: sites * (width / sites),
            actual: width,
        });
    }
    let projections = width / sites;

    let flat: Vec<f64> = records.into_iter().flatten().collect();
    let data = match mode {
        CalculationMode::NonSpinPolarised => {
            Array5::from_shape_vec((k_points, bands, 1, sites, projections), flat)
                .expect("record count and width validated above")
        }
        CalculationMode::NonCollinear => {
            Array5::from_shape_vec((k_points, bands, 4, sites, projections), flat)
                .expect("record count and width validated above")
        }
        CalculationMode::SpinPolarised => {
            let raw = Array5::from_shape_vec((2, k_points, bands, sites, projections), flat)
                .expect("record count and width validated above");
            raw.permuted_axes([1, 2, 0, 3, 4])
                .as_standard_layout()
                .to_owned()
        }
    };

    Ok(data.slice(s![.., .., .., .., 1..]).to_owned())
}

/// Cross-check the parsed record counts against the header-declared ones.
///
/// Runs once, after assembly. Each mismatch reports both the declared and
/// the parsed count.
pub(crate) fn validate_counts(
    mode: CalculationMode,
    header_k_points: usize,
    header_bands: usize,
    parsed_k_points: usize,
    parsed_bands: usize,
    parsed_occupancies: usize,
) -> Result<()> {
    let blocks = mode.k_point_blocks();
    if parsed_k_points != header_k_points * blocks {
        return Err(ProcarError::CountMismatch {
            quantity: "k-point count",
            header: header_k_points,
            parsed: parsed_k_points as f64 / blocks as f64,
        });
    }
    let sections = header_k_points * blocks;
    if parsed_bands != header_bands * sections {
        return Err(ProcarError::CountMismatch {
            quantity: "band count",
            header: header_bands,
            parsed: parsed_bands as f64 / sections as f64,
        });
    }
    if parsed_occupancies != header_bands * sections {
        return Err(ProcarError::CountMismatch {
            quantity: "occupancy count",
            header: header_bands,
            parsed: parsed_occupancies as f64 / sections as f64,
        });
    }
    Ok(())
}
