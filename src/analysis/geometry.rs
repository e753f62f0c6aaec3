//! Geometry and fitting helpers for reciprocal-space analysis.

use nalgebra::{DMatrix, DVector, Vector3};

use crate::error::{ProcarError, Result};
use crate::units::EV_TO_HARTREE;

/// Default bound on triangle areas when testing k-point collinearity.
pub const COLLINEARITY_TOLERANCE: f64 = 1e-7;

/// Area of the triangle spanned by three Cartesian points.
pub fn triangle_area(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

/// Whether the points all fall on one straight line, within `tolerance`.
///
/// Triangles are formed from the first two points and each subsequent one;
/// fewer than three points are trivially collinear.
pub fn points_are_collinear(points: &[Vector3<f64>], tolerance: f64) -> bool {
    largest_triangle_area(points) <= tolerance
}

pub(crate) fn largest_triangle_area(points: &[Vector3<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let (a, b) = (&points[0], &points[1]);
    points[2..]
        .iter()
        .map(|c| triangle_area(a, b, c))
        .fold(0.0, f64::max)
}

/// Closed-form effective mass from eigenvalues at exactly two k-points.
///
/// K-points are Cartesian reciprocal coordinates in inverse Bohr,
/// eigenvalues in eV; the result is in electron masses.
pub fn two_point_effective_mass(cartesian_k_points: &[Vector3<f64>; 2], eigenvalues: [f64; 2]) -> f64 {
    let dk = cartesian_k_points[1] - cartesian_k_points[0];
    let delta_e = (eigenvalues[1] - eigenvalues[0]) * EV_TO_HARTREE * 2.0;
    dk.norm_squared() / delta_e
}

/// Effective mass from a least-squares parabola through three or more
/// k-points.
///
/// The quadratic fit is only physically meaningful along a single
/// reciprocal-space direction, so the points must be collinear; the fit is
/// taken against the Cartesian distance of each point from the first.
pub fn least_squares_effective_mass(
    cartesian_k_points: &[Vector3<f64>],
    eigenvalues: &[f64],
) -> Result<f64> {
    if cartesian_k_points.len() < 2 {
        return Err(ProcarError::InsufficientKPoints(cartesian_k_points.len()));
    }
    let area = largest_triangle_area(cartesian_k_points);
    if area > COLLINEARITY_TOLERANCE {
        return Err(ProcarError::NotCollinear {
            area,
            tolerance: COLLINEARITY_TOLERANCE,
        });
    }
    let origin = cartesian_k_points[0];
    let distances: Vec<f64> = cartesian_k_points
        .iter()
        .map(|k| (k - origin).norm())
        .collect();
    let curvature = polyfit_quadratic(&distances, eigenvalues)?;
    Ok(1.0 / (curvature * EV_TO_HARTREE * 2.0))
}

/// Leading coefficient of the degree-2 least-squares polynomial y(x).
fn polyfit_quadratic(x: &[f64], y: &[f64]) -> Result<f64> {
    let design = DMatrix::from_fn(x.len(), 3, |row, column| x[row].powi(2 - column as i32));
    let rhs = DVector::from_column_slice(y);
    let svd = design.svd(true, true);
    let coefficients = svd
        .solve(&rhs, 1e-12)
        .map_err(|message| ProcarError::FitFailed(message.to_string()))?;
    Ok(coefficients[0])
}
