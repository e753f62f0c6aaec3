//! Synthetic PROCAR texts shared by the unit tests.
//!
//! The projection value written for a record is
//! `(channel * 100 + k * 10 + band) / 1000`, so a test can predict exactly
//! which record landed where after assembly. Eigenvalues follow
//! `energy(block, k, band)` the same way.

use std::fmt::Write;

pub(crate) const ORBITAL_HEADER: &str = "ion      s     py     pz    tot";

/// Per-ion projection value for a record; distinct at three decimals.
pub(crate) fn projection_value(channel: usize, k: usize, band: usize) -> f64 {
    (channel * 100 + k * 10 + band) as f64 / 1000.0
}

/// Deterministic eigenvalue for a (spin-block, k-point, band) slot.
pub(crate) fn energy(block: usize, k: usize, band: usize) -> f64 {
    -10.0 + (block * 100 + k * 10 + band) as f64 * 0.25
}

pub(crate) fn k_point_line(index: usize, coords: [f64; 3]) -> String {
    format!(
        " k-point {:>4} :   {:>11.8}{:>11.8}{:>11.8}     weight = 0.50000000\n",
        index, coords[0], coords[1], coords[2]
    )
}

pub(crate) fn band_line(band: usize, energy: f64, occupancy: f64) -> String {
    format!(
        "band {:>3} # energy {:>13.8} # occ. {:>11.8}\n",
        band, energy, occupancy
    )
}

/// One projection table: `ions` ion rows plus the terminating `tot` row.
pub(crate) fn projection_table(ions: usize, value: f64, with_header: bool) -> String {
    let mut out = String::new();
    if with_header {
        out.push_str(ORBITAL_HEADER);
        out.push('\n');
    }
    for ion in 1..=ions {
        let _ = writeln!(
            out,
            "{:>3} {:>6.3} {:>6.3} {:>6.3} {:>6.3}",
            ion, value, 0.0, 0.0, value
        );
    }
    let total = value * ions as f64;
    let _ = writeln!(
        out,
        "tot {:>6.3} {:>6.3} {:>6.3} {:>6.3}",
        total, 0.0, 0.0, total
    );
    out.push('\n');
    out
}

fn header_line(k_points: usize, bands: usize, ions: usize) -> String {
    format!(
        "# of k-points: {:>4}         # of bands: {:>4}         # of ions: {:>4}\n",
        k_points, bands, ions
    )
}

pub(crate) fn non_spin_polarised_text(k_points: &[[f64; 3]], bands: usize, ions: usize) -> String {
    let mut out = String::from("PROCAR lm decomposed\n");
    out.push_str(&header_line(k_points.len(), bands, ions));
    out.push('\n');
    for (k, coords) in k_points.iter().enumerate() {
        out.push_str(&k_point_line(k + 1, *coords));
        out.push('\n');
        for band in 1..=bands {
            out.push_str(&band_line(band, energy(0, k, band), 1.0));
            out.push('\n');
            out.push_str(&projection_table(ions, projection_value(0, k, band), true));
        }
    }
    out
}

pub(crate) fn spin_polarised_text(k_points: &[[f64; 3]], bands: usize, ions: usize) -> String {
    let mut out = String::from("PROCAR lm decomposed\n");
    out.push_str(&header_line(k_points.len(), bands, ions));
    for block in 0..2 {
        if block == 1 {
            out.push('\n');
            out.push_str(&header_line(k_points.len(), bands, ions));
        }
        out.push('\n');
        for (k, coords) in k_points.iter().enumerate() {
            out.push_str(&k_point_line(k + 1, *coords));
            out.push('\n');
            for band in 1..=bands {
                out.push_str(&band_line(band, energy(block, k, band), 1.0));
                out.push('\n');
                out.push_str(&projection_table(ions, projection_value(block, k, band), true));
            }
        }
    }
    out
}

pub(crate) fn non_collinear_text(k_points: &[[f64; 3]], bands: usize, ions: usize) -> String {
    let mut out = String::from("PROCAR lm decomposed\n");
    out.push_str(&header_line(k_points.len(), bands, ions));
    out.push('\n');
    for (k, coords) in k_points.iter().enumerate() {
        out.push_str(&k_point_line(k + 1, *coords));
        out.push('\n');
        for band in 1..=bands {
            out.push_str(&band_line(band, energy(0, k, band), 1.0));
            out.push('\n');
            for channel in 0..4 {
                out.push_str(&projection_table(
                    ions,
                    projection_value(channel, k, band),
                    channel == 0,
                ));
            }
        }
    }
    out
}
