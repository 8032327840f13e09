use std::collections::BTreeMap;

use super::{Attrs, Coordinate, LabeledArray};

/// Several labeled arrays sharing some of their axes (e.g. the total, n-, nl- and
/// nlm-resolved charge exchange cross sections, all defined on one energy grid).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabeledDataset {
    pub(crate) variables: BTreeMap<String, LabeledArray>,
    pub(crate) attrs: Attrs,
}

impl LabeledDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, array: LabeledArray) {
        self.variables.insert(name.to_string(), array);
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&LabeledArray> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &LabeledArray)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// First coordinate named `name` found among the variables.
    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.variables.values().find_map(|v| v.coord(name))
    }
}
