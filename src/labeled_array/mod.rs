//! # Labeled arrays
//!
//! Dense N-dimensional arrays with named dimensions and per-dimension coordinates, the common
//! output of every ADAS reader and the input of the rate integrator.
//!
//! ## Structure
//!
//! ```text
//! LabeledArray
//! ├── dims    ["line", "TYPE", "ne", "Te"]
//! ├── data    ndarray::ArrayD<f64>        (NaN where no record supplied a cell)
//! ├── coords  name → Coordinate           (one dimension coordinate per dim, plus metadata)
//! └── attrs   "units" → "m3/s", ...
//! ```
//!
//! ## Invariants
//!
//! - `data.ndim() == dims.len()` and dimension names are unique.
//! - Every dimension has a dimension coordinate whose length equals the axis length.
//!   [`LabeledArray::new`] fills an integer `0..len` coordinate for dimensions given none.
//! - Every coordinate spans dimensions of the array, with matching lengths.
//!
//! Arrays are assembled from per-block records by [`assembler`]; several arrays sharing axes
//! form a [`LabeledDataset`].
pub mod assembler;
mod attr_value;
mod coordinate;
mod dataset;

use std::collections::BTreeMap;

use ndarray::{ArrayD, Axis, IxDyn};

use crate::{adas_errors::AdasError, constants::UNITS};

pub use attr_value::AttrValue;
pub use coordinate::{Attrs, Coordinate};
pub use dataset::LabeledDataset;

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    pub(crate) name: Option<String>,
    pub(crate) dims: Vec<String>,
    pub(crate) data: ArrayD<f64>,
    pub(crate) coords: BTreeMap<String, Coordinate>,
    pub(crate) attrs: Attrs,
}

impl LabeledArray {
    /// Build a labeled array and check its invariants.
    ///
    /// Arguments
    /// -----------------
    /// * `data`: the numeric payload
    /// * `dims`: one name per axis of `data`
    /// * `coords`: dimension and metadata coordinates; a dimension without a coordinate
    ///   receives an integer `0..len` axis
    ///
    /// Return
    /// ----------
    /// * The array, or [`AdasError::DimensionMismatch`] when a rank or a length disagrees.
    pub fn new<S: AsRef<str>>(
        data: ArrayD<f64>,
        dims: &[S],
        coords: Vec<Coordinate>,
    ) -> Result<Self, AdasError> {
        let dims: Vec<String> = dims.iter().map(|d| d.as_ref().to_string()).collect();
        if dims.len() != data.ndim() {
            return Err(AdasError::DimensionMismatch {
                dim: dims.join(","),
                expected: data.ndim(),
                found: dims.len(),
            });
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) {
                return Err(AdasError::DimensionMismatch {
                    dim: dim.clone(),
                    expected: 1,
                    found: 2,
                });
            }
        }

        let mut array = LabeledArray {
            name: None,
            dims,
            data,
            coords: BTreeMap::new(),
            attrs: Attrs::new(),
        };
        for coord in coords {
            array.insert_coord(coord)?;
        }
        for (axis, dim) in array.dims.clone().iter().enumerate() {
            if !array.coords.contains_key(dim) {
                let len = array.data.len_of(Axis(axis));
                array
                    .coords
                    .insert(dim.clone(), Coordinate::range_axis(dim, len));
            }
        }
        Ok(array)
    }

    /// An array of the given dimensions, every axis of length zero.
    pub fn empty<S: AsRef<str>>(dims: &[S]) -> Self {
        let data = ArrayD::zeros(IxDyn(&vec![0; dims.len()]));
        LabeledArray {
            name: None,
            dims: dims.iter().map(|d| d.as_ref().to_string()).collect(),
            data,
            coords: BTreeMap::new(),
            attrs: Attrs::new(),
        }
        .with_default_axes()
    }

    fn with_default_axes(mut self) -> Self {
        for (axis, dim) in self.dims.iter().enumerate() {
            let len = self.data.len_of(Axis(axis));
            self.coords
                .entry(dim.clone())
                .or_insert_with(|| Coordinate::range_axis(dim, len));
        }
        self
    }

    /// Attach a coordinate, replacing any coordinate of the same name.
    pub fn insert_coord(&mut self, coord: Coordinate) -> Result<(), AdasError> {
        for (k, dim) in coord.dims().iter().enumerate() {
            let axis = self
                .axis_of(dim)
                .ok_or_else(|| AdasError::MissingCoordinate(dim.clone()))?;
            let expected = self.data.len_of(Axis(axis));
            let found = coord.values().len_of(Axis(k));
            if expected != found {
                return Err(AdasError::DimensionMismatch {
                    dim: format!("{} of coordinate {}", dim, coord.name()),
                    expected,
                    found,
                });
            }
        }
        if self.dims.iter().any(|d| d == coord.name()) && coord.dims() != [coord.name()] {
            return Err(AdasError::DimensionMismatch {
                dim: coord.name().to_string(),
                expected: self.dim_len(coord.name()).unwrap_or(0),
                found: coord.len(),
            });
        }
        self.coords.insert(coord.name().to_string(), coord);
        Ok(())
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_unit(self, unit: &str) -> Self {
        self.with_attr(UNITS, unit)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn unit(&self) -> Option<&str> {
        self.attr(UNITS)
    }

    /// Axis index of dimension `dim`.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Length of dimension `dim`.
    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.axis_of(dim).map(|axis| self.data.len_of(Axis(axis)))
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.get(name)
    }

    pub fn coords(&self) -> impl Iterator<Item = &Coordinate> {
        self.coords.values()
    }

    /// Value of the cell addressed by one label per dimension.
    ///
    /// Arguments
    /// -----------------
    /// * `labels`: `(dim, label)` pairs; every dimension must be named exactly once
    ///
    /// Return
    /// ----------
    /// * The cell value, `None` if a dimension is missing or a label is unknown
    pub fn value_at(&self, labels: &[(&str, AttrValue)]) -> Option<f64> {
        if labels.len() != self.dims.len() {
            return None;
        }
        let mut index = vec![0; self.dims.len()];
        for (dim, label) in labels {
            let axis = self.axis_of(dim)?;
            index[axis] = self.coords.get(*dim)?.position(label)?;
        }
        self.data.get(IxDyn(&index)).copied()
    }

    /// Reorder the axes; `order` must be a permutation of the dimension names.
    pub fn transpose<S: AsRef<str>>(mut self, order: &[S]) -> Result<Self, AdasError> {
        if order.len() != self.dims.len() {
            return Err(AdasError::DimensionMismatch {
                dim: self.dims.join(","),
                expected: self.dims.len(),
                found: order.len(),
            });
        }
        let axes = order
            .iter()
            .map(|d| {
                self.axis_of(d.as_ref())
                    .ok_or_else(|| AdasError::MissingCoordinate(d.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.data = self.data.permuted_axes(IxDyn(&axes)).as_standard_layout().into_owned();
        self.dims = order.iter().map(|d| d.as_ref().to_string()).collect();
        Ok(self)
    }
}
