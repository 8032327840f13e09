//! # Constants and type definitions for adas-parser
//!
//! This module centralizes the **physical constants**, **unit conversion factors**, and
//! **common type aliases** used by the ADAS readers and the rate integrator.
//!
//! ## Overview
//!
//! - CODATA constants (elementary charge, atomic mass unit, Boltzmann constant in eV/K)
//! - Scale factors from the CGS units of the ADAS files to SI
//! - Dimension and attribute names shared by every reader
//!
//! ADAS files store densities in `cm⁻³`, cross sections in `cm²` and rate coefficients in
//! `cm³/s`. Every reader converts to SI at parse time so that the arrays handed to
//! [`crate::rate`] and to downstream users never mix unit systems.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Elementary charge in coulomb, i.e. joules per electron-volt (SI 2019, exact)
pub const EV_TO_JOULE: f64 = 1.602176634e-19;

/// Atomic mass unit in kilograms (CODATA 2018)
pub const AMU_TO_KG: f64 = 1.66053906660e-27;

/// Boltzmann constant in eV/K (CODATA 2018)
pub const KELVIN_TO_EV: f64 = 8.617333262145e-5;

/// cm⁻³ → m⁻³
pub const PER_CM3_TO_PER_M3: f64 = 1e6;

/// cm³/s → m³/s
pub const CM3_PER_S_TO_M3_PER_S: f64 = 1e-6;

/// cm² → m²
pub const CM2_TO_M2: f64 = 1e-4;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Energy or temperature in electron-volts
pub type ElectronVolt = f64;
/// Temperature in kelvin
pub type Kelvin = f64;
/// Mass in atomic mass units
pub type Amu = f64;
/// Rate coefficient in m³/s
pub type RateCoefficient = f64;

/// Attribute key carrying the physical unit of an array or coordinate
pub const UNITS: &str = "units";

/// Convert a temperature from kelvin to electron-volts.
pub fn kelvin_to_ev(temperature: Kelvin) -> ElectronVolt {
    KELVIN_TO_EV * temperature
}
