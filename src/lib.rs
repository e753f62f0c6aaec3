//! Parsing and analysis of VASP PROCAR files.
//!
//! A PROCAR file lists, per k-point and band, the projection of the
//! wavefunction onto atomic-orbital-like basis functions for each ion.
//! [`Procar`] reads the whole file into memory, infers the calculation mode
//! (non-spin-polarised, spin-polarised or non-collinear) from the record
//! counts and assembles the projections into a single 5-axis array with the
//! uniform shape `(k-points, bands, spin, ions + 1, projections)`.
//!
//! The [`analysis`] module builds weighted band structures from that array
//! and extracts effective masses along k-point paths.

pub mod analysis;
pub mod config;
pub mod error;
pub mod procar;
pub mod units;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{BandPoint, BandWeightOptions, WeightedBand};
pub use config::NegativeOccupancies;
pub use error::{ProcarError, Result};
pub use procar::{CalculationMode, Procar};
