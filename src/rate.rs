//! # Maxwell-averaged rate coefficients
//!
//! Computes `<σ v>(T)` from a cross section tabulated on an energy grid:
//!
//! ```text
//! f(E)  = 2 · sqrt(E / (π kT)³) · exp(−E / kT)      Maxwell energy distribution
//! v(E)  = sqrt(2 E / m)
//! <σv>  = ∫ σ(E) · v(E) · f(E) dE                    trapezoidal rule over the grid
//! ```
//!
//! Energies and temperatures are given in eV, masses in amu, cross sections in m², and the
//! result is in m³/s. [`maxwell_rate`] works on plain slices; [`rate_coefficient`] integrates
//! every cross section of a [`LabeledArray`] along its `energy` axis, keeping the other axes
//! and adding a leading `temperature` axis when a temperature grid is given.
use ndarray::{stack, ArrayD, ArrayView1, Axis, IxDyn};

use crate::{
    adas_errors::AdasError,
    constants::{Amu, ElectronVolt, RateCoefficient, AMU_TO_KG, EV_TO_JOULE},
    labeled_array::{Coordinate, LabeledArray},
};

/// Name of the integration axis.
pub const ENERGY: &str = "energy";
/// Name of the axis added for a temperature grid.
pub const TEMPERATURE: &str = "temperature";
pub const RATE_NAME: &str = "rate coefficient";

/// Temperature argument of the integrator, in eV.
#[derive(Debug, Clone, PartialEq)]
pub enum Temperature {
    /// One temperature: no temperature axis in the output
    Single(ElectronVolt),
    /// A grid: the output gains a leading `temperature` axis, even for a single value
    Grid(Vec<ElectronVolt>),
}

impl Temperature {
    pub fn values(&self) -> &[ElectronVolt] {
        match self {
            Temperature::Single(t) => std::slice::from_ref(t),
            Temperature::Grid(ts) => ts,
        }
    }
}

impl From<f64> for Temperature {
    fn from(t: f64) -> Self {
        Temperature::Single(t)
    }
}

impl From<Vec<f64>> for Temperature {
    fn from(ts: Vec<f64>) -> Self {
        Temperature::Grid(ts)
    }
}

impl From<&[f64]> for Temperature {
    fn from(ts: &[f64]) -> Self {
        Temperature::Grid(ts.to_vec())
    }
}

/// `v(E) · f(E)` on the energy grid, energies and kT in joules, mass in kg.
fn maxwell_weights(energy_j: &[f64], kt: f64, mass_kg: f64) -> Vec<f64> {
    let norm = (std::f64::consts::PI * kt).powi(3);
    energy_j
        .iter()
        .map(|&e| {
            let distribution = 2.0 * (e / norm).sqrt() * (-e / kt).exp();
            let velocity = (2.0 * e / mass_kg).sqrt();
            distribution * velocity
        })
        .collect()
}

/// Trapezoidal rule for `∫ y dx` with `y_i = cs_i · w_i`.
fn trapezoid(x: &[f64], cross_section: ArrayView1<f64>, weights: &[f64]) -> f64 {
    let y: Vec<f64> = cross_section
        .iter()
        .zip(weights)
        .map(|(cs, w)| cs * w)
        .collect();
    x.windows(2)
        .zip(y.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum()
}

fn to_joules(energy: &[ElectronVolt]) -> Vec<f64> {
    energy.iter().map(|e| e * EV_TO_JOULE).collect()
}

/// Rate coefficient of one cross section at one temperature.
///
/// Arguments
/// -----------------
/// * `energy`: ascending energy grid (eV)
/// * `cross_section`: cross section on that grid (m²)
/// * `temperature`: temperature (eV)
/// * `mass`: particle mass (amu)
///
/// Return
/// ----------
/// * `<σv>` in m³/s, or [`AdasError::DimensionMismatch`] if the two slices differ in length
pub fn maxwell_rate(
    energy: &[ElectronVolt],
    cross_section: &[f64],
    temperature: ElectronVolt,
    mass: Amu,
) -> Result<RateCoefficient, AdasError> {
    if cross_section.len() != energy.len() {
        return Err(AdasError::DimensionMismatch {
            dim: ENERGY.to_string(),
            expected: energy.len(),
            found: cross_section.len(),
        });
    }
    let energy_j = to_joules(energy);
    let weights = maxwell_weights(&energy_j, temperature * EV_TO_JOULE, mass * AMU_TO_KG);
    Ok(trapezoid(
        &energy_j,
        ArrayView1::from(cross_section),
        &weights,
    ))
}

/// Rate coefficients of every cross section of a labeled array.
///
/// Arguments
/// -----------------
/// * `energy`: ascending energy grid (eV), one value per position of the `energy` axis
/// * `cross_section`: array with an `energy` axis (m²); its other axes are kept
/// * `temperature`: a single temperature or a grid (eV)
/// * `mass`: particle mass (amu)
///
/// Return
/// ----------
/// * A `(temperature?, <other axes>)` array in m³/s. Coordinates not involving `energy` are
///   carried over; the temperature is attached as coordinate (axis or scalar) in eV.
/// * [`AdasError::MissingCoordinate`] without `energy` axis, [`AdasError::DimensionMismatch`]
///   if its length differs from the grid.
pub fn rate_coefficient(
    energy: &[ElectronVolt],
    cross_section: &LabeledArray,
    temperature: impl Into<Temperature>,
    mass: Amu,
) -> Result<LabeledArray, AdasError> {
    let temperature = temperature.into();
    let axis = cross_section
        .axis_of(ENERGY)
        .ok_or_else(|| AdasError::MissingCoordinate(ENERGY.to_string()))?;
    let found = cross_section.data().len_of(Axis(axis));
    if found != energy.len() {
        return Err(AdasError::DimensionMismatch {
            dim: ENERGY.to_string(),
            expected: energy.len(),
            found,
        });
    }

    let energy_j = to_joules(energy);
    let mass_kg = mass * AMU_TO_KG;
    let per_temperature: Vec<ArrayD<f64>> = temperature
        .values()
        .iter()
        .map(|&t| {
            let weights = maxwell_weights(&energy_j, t * EV_TO_JOULE, mass_kg);
            cross_section
                .data()
                .map_axis(Axis(axis), |cs| trapezoid(&energy_j, cs, &weights))
        })
        .collect();

    let mut dims: Vec<String> = cross_section
        .dims()
        .iter()
        .filter(|d| *d != ENERGY)
        .cloned()
        .collect();
    let mut coords: Vec<Coordinate> = cross_section
        .coords()
        .filter(|c| c.name() != ENERGY && !c.dims().iter().any(|d| d == ENERGY))
        .cloned()
        .collect();

    let data = match &temperature {
        Temperature::Single(t) => {
            coords.push(Coordinate::scalar(TEMPERATURE, (*t).into()).with_unit("eV"));
            per_temperature
                .into_iter()
                .next()
                .unwrap_or_else(|| ArrayD::zeros(IxDyn(&[])))
        }
        Temperature::Grid(ts) => {
            dims.insert(0, TEMPERATURE.to_string());
            coords.push(Coordinate::numeric_axis(TEMPERATURE, ts).with_unit("eV"));
            if per_temperature.is_empty() {
                let mut shape = vec![0];
                shape.extend(dims[1..].iter().filter_map(|d| cross_section.dim_len(d)));
                ArrayD::zeros(IxDyn(&shape))
            } else {
                let views: Vec<_> = per_temperature.iter().map(|a| a.view()).collect();
                stack(Axis(0), &views).map_err(|_| AdasError::DimensionMismatch {
                    dim: TEMPERATURE.to_string(),
                    expected: ts.len(),
                    found: views.len(),
                })?
            }
        }
    };

    Ok(LabeledArray::new(data, &dims, coords)?
        .with_name(RATE_NAME)
        .with_unit("m3/s"))
}

#[cfg(test)]
mod rate_test {
    use super::*;
    use crate::constants::{AMU_TO_KG, EV_TO_JOULE};
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};

    fn grid(max: f64, step: f64) -> Vec<f64> {
        (0..=((max / step) as usize)).map(|i| i as f64 * step).collect()
    }

    /// <σv> for a constant σ is σ · mean speed.
    fn constant_rate(sigma: f64, t_ev: f64, mass: f64) -> f64 {
        sigma * (8.0 * t_ev * EV_TO_JOULE / (std::f64::consts::PI * mass * AMU_TO_KG)).sqrt()
    }

    #[test]
    fn test_maxwell_rate_constant_cross_section() {
        let energy = grid(60.0, 0.005);
        let cs = vec![1e-20; energy.len()];
        let rate = maxwell_rate(&energy, &cs, 1.0, 2.0).unwrap();
        assert_relative_eq!(rate, constant_rate(1e-20, 1.0, 2.0), max_relative = 1e-3);
    }

    #[test]
    fn test_maxwell_rate_length_mismatch() {
        assert_eq!(
            maxwell_rate(&[1.0, 2.0], &[1.0], 1.0, 1.0),
            Err(AdasError::DimensionMismatch {
                dim: "energy".into(),
                expected: 2,
                found: 1
            })
        );
    }

    fn n_resolved(energy: &[f64]) -> LabeledArray {
        let cs = Array2::from_shape_fn((2, energy.len()), |(n, _)| (n + 1) as f64 * 1e-20);
        LabeledArray::new(
            cs.into_dyn(),
            &["n", "energy"],
            vec![
                Coordinate::axis("n", vec![1_i64.into(), 2_i64.into()]),
                Coordinate::numeric_axis("energy", energy).with_unit("eV/amu"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rate_coefficient_keeps_other_axes() {
        let energy = grid(60.0, 0.01);
        let rate = rate_coefficient(&energy, &n_resolved(&energy), 1.0, 1.0).unwrap();
        assert_eq!(rate.dims(), ["n".to_string()]);
        assert_eq!(rate.unit(), Some("m3/s"));
        assert_eq!(rate.coord("temperature").unwrap().scalar_value(), Some(&1.0.into()));
        assert_relative_eq!(
            rate.data()[[1].as_slice()],
            2.0 * rate.data()[[0].as_slice()],
            max_relative = 1e-12
        );

        let grid_rate =
            rate_coefficient(&energy, &n_resolved(&energy), vec![1.0, 2.0, 4.0], 1.0).unwrap();
        assert_eq!(grid_rate.dims(), ["temperature".to_string(), "n".to_string()]);
        assert_eq!(grid_rate.shape(), &[3, 2]);
        assert_eq!(grid_rate.coord("temperature").unwrap().unit(), Some("eV"));
    }

    #[test]
    fn test_single_and_singleton_grid_agree() {
        let energy = grid(30.0, 0.1);
        let cs = n_resolved(&energy);
        let single = rate_coefficient(&energy, &cs, 3.0, 2.0).unwrap();
        let singleton = rate_coefficient(&energy, &cs, vec![3.0], 2.0).unwrap();
        assert_eq!(singleton.shape(), &[1, 2]);
        assert_eq!(singleton.data().index_axis(Axis(0), 0), single.data().view());
    }

    #[test]
    fn test_energy_axis_checks() {
        let energy = grid(1.0, 0.5);
        let cs = n_resolved(&energy);
        assert!(matches!(
            rate_coefficient(&energy[..2], &cs, 1.0, 1.0),
            Err(AdasError::DimensionMismatch { expected: 2, found: 3, .. })
        ));
        let no_energy = LabeledArray::new(Array1::zeros(3).into_dyn(), &["Te"], vec![]).unwrap();
        assert_eq!(
            rate_coefficient(&energy, &no_energy, 1.0, 1.0),
            Err(AdasError::MissingCoordinate("energy".into()))
        );
    }
}
