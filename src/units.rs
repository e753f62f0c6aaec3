//! Physical unit conversions used by the effective-mass estimator.

/// Length conversion from Angstrom to Bohr (CODATA 2018).
pub const ANGSTROM_TO_BOHR: f64 = 1.889_726_124_626_5;

/// Energy conversion from eV to Hartree (CODATA 2018).
pub const EV_TO_HARTREE: f64 = 0.036_749_322_175_655;
