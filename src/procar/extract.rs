//! Regex extraction of the four PROCAR record families.
//!
//! A single pass over the in-memory file body pulls out k-point
//! coordinates, band energies, occupancies and the per-band projection
//! tables. Extraction never fails on missing records; an empty table is
//! caught by the cardinality checks that run after assembly.

use ndarray::Array2;
use regex::Regex;

use crate::error::{ProcarError, Result};

/// All numeric substrings on a line, in order of appearance.
pub(crate) fn numbers_from_line(line: &str) -> Vec<f64> {
    let re = Regex::new(r"-?\d+[.\d]*").unwrap();
    re.find_iter(line)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Header integers from the second file line: (k-points, bands, ions).
pub(crate) fn parse_header(line: &str) -> Result<(usize, usize, usize)> {
    let numbers = numbers_from_line(line);
    if numbers.len() < 3 || numbers[..3].iter().any(|&n| n < 0.0 || n.fract() != 0.0) {
        return Err(ProcarError::MalformedHeader {
            line: line.trim().to_owned(),
        });
    }
    Ok((numbers[0] as usize, numbers[1] as usize, numbers[2] as usize))
}

/// Fractional k-point coordinates, one row per `k-point` line.
///
/// The three coordinate fields are fixed-width (11 characters each) and can
/// run together when negative, so the captured triplet is sliced
/// positionally rather than split on whitespace.
pub(crate) fn k_points(body: &str) -> Array2<f64> {
    let re = Regex::new(r"k-point\s+\d+\s*:\s+((?:[- ][01]\.\d{8}){3})").unwrap();
    let mut values = Vec::new();
    for cap in re.captures_iter(body) {
        let triplet = &cap[1];
        for field in [&triplet[0..11], &triplet[11..22], &triplet[22..33]] {
            values.push(field.trim().parse::<f64>().expect("digits matched by regex"));
        }
    }
    let rows = values.len() / 3;
    Array2::from_shape_vec((rows, 3), values).expect("three coordinates per k-point")
}

/// `[band_index, energy]` rows following each `band ... # energy` marker.
pub(crate) fn band_energies(body: &str) -> Array2<f64> {
    let re = Regex::new(r"band\s+(\d+)\s*#\s*energy\s+([-.\d]+)").unwrap();
    pair_table(body, &re)
}

/// `[band_index, occupancy]` rows following each `# occ.` marker.
pub(crate) fn occupancies(body: &str) -> Array2<f64> {
    let re = Regex::new(r"band\s+(\d+)\s*#\s*energy\s+[-.\d]+\s*#\s*occ\.\s+([-.\d]+)").unwrap();
    pair_table(body, &re)
}

/// One flattened numeric record per projection table.
///
/// Each table is a maximal run of numbers and whitespace terminated by the
/// literal `tot` row; the `tot` token is replaced by a sentinel `0` column
/// so the total row parses like the ion rows above it. Tokens that fail
/// numeric parsing are dropped, which shows up later as a record-width
/// mismatch rather than an extraction error.
pub(crate) fn projection_records(body: &str) -> Vec<Vec<f64>> {
    let re = Regex::new(r"[-.\d\se]+tot.+").unwrap();
    re.find_iter(body)
        .map(|m| {
            m.as_str()
                .replacen("tot", "0", 1)
                .split_whitespace()
                .filter_map(|token| token.parse::<f64>().ok())
                .collect()
        })
        .collect()
}

fn pair_table(body: &str, re: &Regex) -> Array2<f64> {
    let mut values = Vec::new();
    for cap in re.captures_iter(body) {
        if let (Ok(index), Ok(value)) = (cap[1].parse::<f64>(), cap[2].parse::<f64>()) {
            values.push(index);
            values.push(value);
        }
    }
    let rows = values.len() / 2;
    Array2::from_shape_vec((rows, 2), values).expect("two values per record")
}
