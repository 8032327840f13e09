use std::collections::BTreeMap;

use ndarray::{arr0, Array1, ArrayD, Ix1, IxDyn};

use crate::{adas_errors::AdasError, constants::UNITS};

use super::AttrValue;

/// Free-form attributes (units, titles, species) attached to arrays and coordinates.
pub type Attrs = BTreeMap<String, String>;

/// A named set of labels spanning zero or more dimensions of a [`super::LabeledArray`].
///
/// A coordinate named like the dimension it spans is the *dimension coordinate* of that axis
/// (`Te` along `Te`). Other coordinates carry per-record metadata: a scalar (`TYPE` constant
/// over the whole file) or values along one or several axes (`lower_term` along
/// `lower_index`). Cells may be empty when the assembler aligned records that did not all
/// carry the coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    name: String,
    dims: Vec<String>,
    values: ArrayD<Option<AttrValue>>,
    attrs: Attrs,
}

impl Coordinate {
    /// Dimension coordinate `name` along the axis of the same name.
    pub fn axis(name: &str, values: Vec<AttrValue>) -> Self {
        Coordinate {
            name: name.to_string(),
            dims: vec![name.to_string()],
            values: Array1::from_iter(values.into_iter().map(Some)).into_dyn(),
            attrs: Attrs::new(),
        }
    }

    /// Numeric dimension coordinate, e.g. a temperature grid.
    pub fn numeric_axis(name: &str, values: &[f64]) -> Self {
        Coordinate::axis(name, values.iter().copied().map(AttrValue::Float).collect())
    }

    /// Integer dimension coordinate `0..len`.
    pub fn range_axis(name: &str, len: usize) -> Self {
        Coordinate::axis(name, (0..len).map(AttrValue::from).collect())
    }

    /// Zero-dimensional coordinate holding one label for the whole array.
    pub fn scalar(name: &str, value: AttrValue) -> Self {
        Coordinate {
            name: name.to_string(),
            dims: Vec::new(),
            values: arr0(Some(value)).into_dyn(),
            attrs: Attrs::new(),
        }
    }

    /// One-dimensional coordinate `name` along axis `dim`.
    pub fn along(name: &str, dim: &str, values: Vec<Option<AttrValue>>) -> Self {
        Coordinate {
            name: name.to_string(),
            dims: vec![dim.to_string()],
            values: Array1::from_vec(values).into_dyn(),
            attrs: Attrs::new(),
        }
    }

    /// Build a coordinate from raw parts, checking that `dims` matches the value rank.
    pub fn from_parts(
        name: &str,
        dims: Vec<String>,
        values: ArrayD<Option<AttrValue>>,
        attrs: Attrs,
    ) -> Result<Self, AdasError> {
        if dims.len() != values.ndim() {
            return Err(AdasError::DimensionMismatch {
                dim: name.to_string(),
                expected: values.ndim(),
                found: dims.len(),
            });
        }
        Ok(Coordinate {
            name: name.to_string(),
            dims,
            values,
            attrs,
        })
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.attrs.insert(UNITS.to_string(), unit.to_string());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn values(&self) -> &ArrayD<Option<AttrValue>> {
        &self.values
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn unit(&self) -> Option<&str> {
        self.attrs.get(UNITS).map(String::as_str)
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Number of labels (1 for a scalar coordinate).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The label of a scalar coordinate.
    pub fn scalar_value(&self) -> Option<&AttrValue> {
        if self.is_scalar() {
            self.values.iter().next().and_then(Option::as_ref)
        } else {
            None
        }
    }

    /// Labels of a one-dimensional coordinate, in axis order.
    pub fn labels(&self) -> Option<Vec<Option<&AttrValue>>> {
        let view = self.values.view().into_dimensionality::<Ix1>().ok()?;
        Some(view.into_iter().map(Option::as_ref).collect())
    }

    /// Label `i` of a one-dimensional coordinate.
    pub fn get(&self, i: usize) -> Option<&AttrValue> {
        if self.dims.len() != 1 {
            return None;
        }
        self.values.get(IxDyn(&[i])).and_then(Option::as_ref)
    }

    /// Numeric labels of a one-dimensional coordinate; `None` if any label is missing or text.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.labels()?
            .into_iter()
            .map(|v| v.and_then(AttrValue::as_f64))
            .collect()
    }

    /// Position of `value` along a one-dimensional coordinate.
    pub fn position(&self, value: &AttrValue) -> Option<usize> {
        self.labels()?
            .into_iter()
            .position(|v| v == Some(value))
    }

    pub fn contains(&self, value: &AttrValue) -> bool {
        self.position(value).is_some()
    }
}
