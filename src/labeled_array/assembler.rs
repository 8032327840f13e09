//! # Array assembler
//!
//! Turns the per-block records produced by a reader into one dense [`LabeledArray`].
//!
//! The assembly runs in two steps:
//!
//! 1. [`concat`] stacks the records along a synthetic axis (or joins them along an axis they
//!    already have, e.g. successive energy scans). Per-record scalar coordinates that are equal
//!    in every record stay scalar; those that vary become coordinates along the new axis.
//!    Shared axes whose labels differ between records are aligned on the sorted union of their
//!    labels, absent cells being NaN.
//! 2. [`unstack`] replaces the synthetic axis by one axis per key coordinate (`line × TYPE`,
//!    `upper_index × lower_index`, ...). A key that stayed scalar because it was constant is
//!    broadcast first, so the output always carries every declared key axis. Two records with
//!    the same joint key are rejected with [`AdasError::AmbiguousIndex`].
//!
//! [`assemble`] chains both steps, [`concat_datasets`] applies [`concat`] variable by variable.
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    iter::once,
};

use itertools::Itertools;
use log::warn;
use ndarray::{ArrayD, Axis, Dimension, IxDyn};

use crate::adas_errors::AdasError;

use super::{AttrValue, Coordinate, LabeledArray, LabeledDataset};

/// Synthetic axis the records are stacked along before being unstacked on their joint key.
pub const RECORD_AXIS: &str = "index";

/// How one shared axis of the records maps onto the output axis.
struct AxisAlignment {
    coord: Coordinate,
    /// per record: record position → output position
    maps: Vec<Vec<usize>>,
    realigned: bool,
}

fn dimension_labels(record: &LabeledArray, dim: &str) -> Result<Vec<AttrValue>, AdasError> {
    record
        .coord(dim)
        .and_then(Coordinate::labels)
        .ok_or_else(|| AdasError::MissingCoordinate(dim.to_string()))?
        .into_iter()
        .map(|label| {
            label
                .cloned()
                .ok_or_else(|| AdasError::MissingCoordinate(format!("unlabeled position on '{dim}'")))
        })
        .collect()
}

fn align_axis(records: &[LabeledArray], dim: &str) -> Result<AxisAlignment, AdasError> {
    let labels = records
        .iter()
        .map(|r| dimension_labels(r, dim))
        .collect::<Result<Vec<_>, _>>()?;
    let attrs = records[0]
        .coord(dim)
        .map(|c| c.attrs().clone())
        .unwrap_or_default();

    if labels.iter().all_equal() {
        let len = labels[0].len();
        return Ok(AxisAlignment {
            coord: Coordinate::axis(dim, labels[0].clone()).with_attrs(attrs),
            maps: vec![(0..len).collect(); records.len()],
            realigned: false,
        });
    }

    let union: Vec<AttrValue> = labels.iter().flatten().cloned().sorted().dedup().collect();
    let position: HashMap<&AttrValue, usize> =
        union.iter().enumerate().map(|(i, v)| (v, i)).collect();
    let mut maps = Vec::with_capacity(records.len());
    for (r, record_labels) in labels.iter().enumerate() {
        if let Some(repeated) = record_labels.iter().duplicates().next() {
            return Err(AdasError::AmbiguousIndex(format!(
                "record {r} repeats {dim} = {repeated}"
            )));
        }
        maps.push(record_labels.iter().map(|v| position[v]).collect());
    }
    warn!(
        "records disagree on the '{dim}' axis: {} records aligned on {} labels, absent cells set to NaN",
        records.len(),
        union.len()
    );
    Ok(AxisAlignment {
        coord: Coordinate::axis(dim, union).with_attrs(attrs),
        maps,
        realigned: true,
    })
}

/// Concatenate records along `dim`.
///
/// If the records lack `dim`, a new leading axis of length `records.len()` is created and a
/// per-record scalar coordinate named `dim`, if any, becomes its labels. Otherwise the records
/// are joined end to end along their existing `dim` axis. All records must share the same
/// dimension names in the same order.
///
/// Arguments
/// -----------------
/// * `records`: the per-block arrays, consumed
/// * `dim`: the concatenation axis
///
/// Return
/// ----------
/// * The concatenated array (an empty `[dim]` array when there is no record), or
///   [`AdasError::DimensionMismatch`] if the records do not share their dimensions,
///   [`AdasError::AmbiguousIndex`] if a record repeats a label of an axis being aligned.
pub fn concat(records: Vec<LabeledArray>, dim: &str) -> Result<LabeledArray, AdasError> {
    let Some(first) = records.first() else {
        return Ok(LabeledArray::empty(&[dim]));
    };
    let record_dims = first.dims.clone();
    if let Some(other) = records.iter().find(|r| r.dims != record_dims) {
        return Err(AdasError::DimensionMismatch {
            dim: format!("[{}] vs [{}]", record_dims.join(","), other.dims.join(",")),
            expected: record_dims.len(),
            found: other.dims.len(),
        });
    }

    let existing = record_dims.iter().position(|d| d == dim);
    let out_dims: Vec<String> = match existing {
        Some(_) => record_dims.clone(),
        None => once(dim.to_string())
            .chain(record_dims.iter().cloned())
            .collect(),
    };
    let out_axis: HashMap<&str, usize> = out_dims
        .iter()
        .enumerate()
        .map(|(i, d)| (d.as_str(), i))
        .collect();

    let mut alignments: HashMap<&str, AxisAlignment> = HashMap::new();
    for d in record_dims.iter().filter(|d| *d != dim) {
        alignments.insert(d.as_str(), align_axis(&records, d)?);
    }

    let extents: Vec<usize> = records
        .iter()
        .map(|r| existing.map_or(1, |axis| r.data.len_of(Axis(axis))))
        .collect();
    let offsets: Vec<usize> = extents
        .iter()
        .scan(0, |acc, &len| {
            let start = *acc;
            *acc += len;
            Some(start)
        })
        .collect();
    let concat_len: usize = extents.iter().sum();

    let out_shape: Vec<usize> = out_dims
        .iter()
        .map(|d| {
            if d == dim {
                concat_len
            } else {
                alignments[d.as_str()].coord.len()
            }
        })
        .collect();

    let map_index = |r: usize, d: &str, i: usize| -> usize {
        if d == dim {
            offsets[r] + i
        } else {
            alignments[d].maps[r][i]
        }
    };

    let mut data = ArrayD::from_elem(IxDyn(&out_shape), f64::NAN);
    let mut out_index = vec![0; out_dims.len()];
    for (r, record) in records.iter().enumerate() {
        for (index, &value) in record.data.indexed_iter() {
            for (k, d) in record.dims.iter().enumerate() {
                out_index[out_axis[d.as_str()]] = map_index(r, d, index[k]);
            }
            if existing.is_none() {
                out_index[0] = r;
            }
            data[IxDyn(&out_index)] = value;
        }
    }

    let mut coords: Vec<Coordinate> = alignments.values().map(|a| a.coord.clone()).collect();
    let names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.coords.keys().map(String::as_str))
        .filter(|name| !alignments.contains_key(name))
        .collect();

    for name in names {
        let present: Vec<Option<&Coordinate>> = records.iter().map(|r| r.coord(name)).collect();
        let Some(template) = present.iter().flatten().next().copied() else {
            continue;
        };
        let coord_dims = template.dims().to_vec();
        if let Some(other) = present
            .iter()
            .flatten()
            .find(|c| c.dims() != coord_dims.as_slice())
        {
            return Err(AdasError::DimensionMismatch {
                dim: format!("coordinate {name}"),
                expected: coord_dims.len(),
                found: other.dims().len(),
            });
        }

        let spans_concat = coord_dims.iter().any(|d| d == dim);
        let realigned = coord_dims
            .iter()
            .any(|d| alignments.get(d.as_str()).is_some_and(|a| a.realigned));
        let shared = present.iter().all(|c| *c == Some(template));
        if name != dim && !spans_concat && !realigned && shared {
            coords.push(template.clone());
            continue;
        }

        let out_coord_dims: Vec<String> = if spans_concat {
            coord_dims.clone()
        } else {
            once(dim.to_string())
                .chain(coord_dims.iter().cloned())
                .collect()
        };
        let coord_axis: HashMap<&str, usize> = out_coord_dims
            .iter()
            .enumerate()
            .map(|(i, d)| (d.as_str(), i))
            .collect();
        let shape: Vec<usize> = out_coord_dims
            .iter()
            .map(|d| out_shape[out_axis[d.as_str()]])
            .collect();

        let mut values: ArrayD<Option<AttrValue>> = ArrayD::from_elem(IxDyn(&shape), None);
        let mut cell = vec![0; out_coord_dims.len()];
        for (r, coord) in present.iter().enumerate() {
            let Some(coord) = coord else { continue };
            for (index, value) in coord.values().indexed_iter() {
                for (k, d) in coord_dims.iter().enumerate() {
                    cell[coord_axis[d.as_str()]] = map_index(r, d, index[k]);
                }
                if spans_concat {
                    values[IxDyn(&cell)] = value.clone();
                } else {
                    for i in 0..extents[r] {
                        cell[0] = offsets[r] + i;
                        values[IxDyn(&cell)] = value.clone();
                    }
                }
            }
        }
        coords.push(Coordinate::from_parts(
            name,
            out_coord_dims,
            values,
            template.attrs().clone(),
        )?);
    }

    let mut array = LabeledArray::new(data, &out_dims, coords)?;
    array.name = first.name.clone();
    array.attrs = first.attrs.clone();
    Ok(array)
}

/// Copy `index` into `out`, replacing position `axis` by the key positions.
fn spread(out: &mut [usize], index: &[usize], axis: usize, keys: &[usize]) {
    out[..axis].copy_from_slice(&index[..axis]);
    out[axis..axis + keys.len()].copy_from_slice(keys);
    out[axis + keys.len()..].copy_from_slice(&index[axis + 1..]);
}

/// A coordinate along the stacked axis that is a function of one key becomes an axis-aligned
/// coordinate of that key (e.g. `lower_term` along `lower_index`).
fn reduce_to_key(
    coord: &Coordinate,
    keys: &[&str],
    row_positions: &[Vec<usize>],
    levels: &[Vec<AttrValue>],
) -> Option<Coordinate> {
    let labels = coord.labels()?;
    (0..keys.len()).find_map(|k| {
        let mut reduced: Vec<Option<Option<&AttrValue>>> = vec![None; levels[k].len()];
        for (row, label) in row_positions.iter().zip(&labels) {
            let current = reduced[row[k]];
            match current {
                None => reduced[row[k]] = Some(*label),
                Some(seen) if seen == *label => {}
                Some(_) => return None,
            }
        }
        let values = reduced
            .into_iter()
            .map(|v| v.flatten().cloned())
            .collect();
        Some(Coordinate::along(coord.name(), keys[k], values).with_attrs(coord.attrs().clone()))
    })
}

/// Replace axis `dim` by one axis per key coordinate.
///
/// Each key must be a coordinate along `dim` or a scalar coordinate; a scalar key is
/// broadcast to every position of `dim` and yields an axis of length one. Key levels are
/// sorted. Combinations absent from the input are NaN.
///
/// Arguments
/// -----------------
/// * `array`: the stacked array, consumed
/// * `dim`: the axis to unstack
/// * `keys`: the coordinates forming the joint key, in output axis order
///
/// Return
/// ----------
/// * The unstacked array, [`AdasError::AmbiguousIndex`] if two positions share a joint key,
///   [`AdasError::MissingCoordinate`] if `dim` or a key is unknown or unset.
pub fn unstack(array: LabeledArray, dim: &str, keys: &[&str]) -> Result<LabeledArray, AdasError> {
    let axis = array
        .axis_of(dim)
        .ok_or_else(|| AdasError::MissingCoordinate(dim.to_string()))?;
    if keys.is_empty() {
        return Err(AdasError::MissingCoordinate(format!(
            "no key to unstack '{dim}'"
        )));
    }
    let len = array.data.len_of(Axis(axis));

    let mut columns: Vec<Vec<AttrValue>> = Vec::with_capacity(keys.len());
    for key in keys {
        let coord = array
            .coord(key)
            .ok_or_else(|| AdasError::MissingCoordinate(key.to_string()))?;
        let column = if let Some(value) = coord.scalar_value() {
            vec![value.clone(); len]
        } else if coord.dims() == [dim] {
            coord
                .labels()
                .unwrap_or_default()
                .into_iter()
                .map(|v| {
                    v.cloned().ok_or_else(|| {
                        AdasError::MissingCoordinate(format!("{key} is unset for a record"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            return Err(AdasError::DimensionMismatch {
                dim: format!("key {key}"),
                expected: 1,
                found: coord.dims().len(),
            });
        };
        columns.push(column);
    }

    let rows: Vec<Vec<AttrValue>> = (0..len)
        .map(|i| columns.iter().map(|c| c[i].clone()).collect())
        .collect();
    let mut seen = HashSet::with_capacity(len);
    for row in &rows {
        if !seen.insert(row) {
            return Err(AdasError::AmbiguousIndex(format!(
                "({}) = ({})",
                keys.join(", "),
                row.iter().join(", ")
            )));
        }
    }

    let levels: Vec<Vec<AttrValue>> = columns
        .iter()
        .map(|c| c.iter().cloned().sorted().dedup().collect())
        .collect();
    let level_position: Vec<HashMap<&AttrValue, usize>> = levels
        .iter()
        .map(|l| l.iter().enumerate().map(|(i, v)| (v, i)).collect())
        .collect();
    let row_positions: Vec<Vec<usize>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&level_position)
                .map(|(v, position)| position[v])
                .collect()
        })
        .collect();

    let out_dims: Vec<String> = array.dims[..axis]
        .iter()
        .cloned()
        .chain(keys.iter().map(|k| k.to_string()))
        .chain(array.dims[axis + 1..].iter().cloned())
        .collect();
    let shape = array.data.shape();
    let out_shape: Vec<usize> = shape[..axis]
        .iter()
        .copied()
        .chain(levels.iter().map(Vec::len))
        .chain(shape[axis + 1..].iter().copied())
        .collect();

    let mut data = ArrayD::from_elem(IxDyn(&out_shape), f64::NAN);
    let mut out_index = vec![0; out_dims.len()];
    for (index, &value) in array.data.indexed_iter() {
        let index = index.slice();
        spread(&mut out_index, index, axis, &row_positions[index[axis]]);
        data[IxDyn(&out_index)] = value;
    }

    let mut coords = Vec::with_capacity(array.coords.len() + keys.len());
    for (key, level) in keys.iter().zip(&levels) {
        let attrs = array
            .coord(key)
            .map(|c| c.attrs().clone())
            .unwrap_or_default();
        coords.push(Coordinate::axis(key, level.clone()).with_attrs(attrs));
    }
    for coord in array.coords.values() {
        let name = coord.name();
        if name == dim || keys.contains(&name) {
            continue;
        }
        let Some(p) = coord.dims().iter().position(|d| d == dim) else {
            coords.push(coord.clone());
            continue;
        };
        if coord.dims().len() == 1 {
            if let Some(reduced) = reduce_to_key(coord, keys, &row_positions, &levels) {
                coords.push(reduced);
                continue;
            }
        }

        let coord_dims = coord.dims();
        let out_coord_dims: Vec<String> = coord_dims[..p]
            .iter()
            .cloned()
            .chain(keys.iter().map(|k| k.to_string()))
            .chain(coord_dims[p + 1..].iter().cloned())
            .collect();
        let coord_shape: Vec<usize> = out_coord_dims
            .iter()
            .map(|d| {
                out_dims
                    .iter()
                    .position(|o| o == d)
                    .map_or(0, |a| out_shape[a])
            })
            .collect();
        let mut values: ArrayD<Option<AttrValue>> =
            ArrayD::from_elem(IxDyn(&coord_shape), None);
        let mut cell = vec![0; out_coord_dims.len()];
        for (index, value) in coord.values().indexed_iter() {
            let index = index.slice();
            spread(&mut cell, index, p, &row_positions[index[p]]);
            values[IxDyn(&cell)] = value.clone();
        }
        coords.push(Coordinate::from_parts(
            name,
            out_coord_dims,
            values,
            coord.attrs().clone(),
        )?);
    }

    let mut out = LabeledArray::new(data, &out_dims, coords)?;
    out.name = array.name.clone();
    out.attrs = array.attrs.clone();
    Ok(out)
}

/// Stack per-block records and index them by their joint key.
///
/// Equivalent to [`concat`] along [`RECORD_AXIS`] followed by [`unstack`] on `keys`.
/// Without records, an empty array over the key axes is returned.
pub fn assemble(records: Vec<LabeledArray>, keys: &[&str]) -> Result<LabeledArray, AdasError> {
    if records.is_empty() {
        return Ok(LabeledArray::empty(keys));
    }
    unstack(concat(records, RECORD_AXIS)?, RECORD_AXIS, keys)
}

/// Lay axis `dim` over a new list of labels.
///
/// Every current label must appear in `labels`; positions of `labels` absent from the array
/// are NaN (and empty in coordinates spanning `dim`).
///
/// Return
/// ----------
/// * The reindexed array, [`AdasError::MissingCoordinate`] if a current label is not in
///   `labels`, [`AdasError::AmbiguousIndex`] if `labels` repeats a value.
pub fn reindex(
    array: LabeledArray,
    dim: &str,
    labels: Vec<AttrValue>,
) -> Result<LabeledArray, AdasError> {
    let axis = array
        .axis_of(dim)
        .ok_or_else(|| AdasError::MissingCoordinate(dim.to_string()))?;
    if let Some(repeated) = labels.iter().duplicates().next() {
        return Err(AdasError::AmbiguousIndex(format!(
            "new {dim} index repeats {repeated}"
        )));
    }
    let target: HashMap<&AttrValue, usize> =
        labels.iter().enumerate().map(|(i, v)| (v, i)).collect();
    let map = dimension_labels(&array, dim)?
        .iter()
        .map(|label| {
            target.get(label).copied().ok_or_else(|| {
                AdasError::MissingCoordinate(format!("{dim} = {label} absent from the new index"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut shape = array.shape().to_vec();
    shape[axis] = labels.len();
    let mut data = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
    let mut out_index = vec![0; shape.len()];
    for (index, &value) in array.data.indexed_iter() {
        out_index.copy_from_slice(index.slice());
        out_index[axis] = map[out_index[axis]];
        data[IxDyn(&out_index)] = value;
    }

    let mut coords = Vec::with_capacity(array.coords.len());
    for coord in array.coords.values() {
        if coord.name() == dim {
            coords.push(Coordinate::axis(dim, labels.clone()).with_attrs(coord.attrs().clone()));
            continue;
        }
        let Some(p) = coord.dims().iter().position(|d| d == dim) else {
            coords.push(coord.clone());
            continue;
        };
        let mut coord_shape = coord.values().shape().to_vec();
        coord_shape[p] = labels.len();
        let mut values: ArrayD<Option<AttrValue>> = ArrayD::from_elem(IxDyn(&coord_shape), None);
        let mut cell = vec![0; coord_shape.len()];
        for (index, value) in coord.values().indexed_iter() {
            cell.copy_from_slice(index.slice());
            cell[p] = map[cell[p]];
            values[IxDyn(&cell)] = value.clone();
        }
        coords.push(Coordinate::from_parts(
            coord.name(),
            coord.dims().to_vec(),
            values,
            coord.attrs().clone(),
        )?);
    }

    let mut out = LabeledArray::new(data, &array.dims, coords)?;
    out.name = array.name.clone();
    out.attrs = array.attrs.clone();
    Ok(out)
}

/// NaN-filled stand-in for a variable a dataset lacks, laid on that dataset's `dim` axis.
fn placeholder_like(
    template: &LabeledArray,
    dim: &str,
    axis: &Coordinate,
) -> Result<LabeledArray, AdasError> {
    let a = template
        .axis_of(dim)
        .ok_or_else(|| AdasError::MissingCoordinate(dim.to_string()))?;
    let mut shape = template.shape().to_vec();
    shape[a] = axis.len();
    let coords: Vec<Coordinate> = template
        .coords
        .values()
        .filter(|c| !c.dims().iter().any(|d| d == dim))
        .cloned()
        .chain(once(axis.clone()))
        .collect();
    let mut array = LabeledArray::new(
        ArrayD::from_elem(IxDyn(&shape), f64::NAN),
        &template.dims,
        coords,
    )?;
    array.name = template.name.clone();
    array.attrs = template.attrs.clone();
    Ok(array)
}

/// Concatenate datasets variable by variable along their shared axis `dim`.
///
/// A variable missing from some dataset is NaN over that dataset's stretch of `dim`.
pub fn concat_datasets(
    datasets: Vec<LabeledDataset>,
    dim: &str,
) -> Result<LabeledDataset, AdasError> {
    let Some(first) = datasets.first() else {
        return Ok(LabeledDataset::new());
    };
    let attrs = first.attrs.clone();
    let names: BTreeSet<String> = datasets
        .iter()
        .flat_map(|d| d.variables.keys().cloned())
        .collect();

    let mut variables = BTreeMap::new();
    for name in names {
        let Some(template) = datasets.iter().find_map(|d| d.get(&name)) else {
            continue;
        };
        let mut parts = Vec::with_capacity(datasets.len());
        for dataset in &datasets {
            match dataset.get(&name) {
                Some(variable) => parts.push(variable.clone()),
                None => {
                    let axis = dataset.coord(dim).ok_or_else(|| {
                        AdasError::MissingCoordinate(format!("{dim} (dataset without {name})"))
                    })?;
                    parts.push(placeholder_like(template, dim, axis)?);
                }
            }
        }
        let joined = concat(parts, dim)?;
        variables.insert(name, joined);
    }
    Ok(LabeledDataset { variables, attrs })
}

#[cfg(test)]
mod assembler_test {
    use super::*;
    use ndarray::{array, Array1};

    fn record(line: &str, kind: &str, isel: i64, te: &[f64], values: &[f64]) -> LabeledArray {
        LabeledArray::new(
            Array1::from_vec(values.to_vec()).into_dyn(),
            &["Te"],
            vec![
                Coordinate::numeric_axis("Te", te).with_unit("eV"),
                Coordinate::scalar("line", line.into()),
                Coordinate::scalar("TYPE", kind.into()),
                Coordinate::scalar("ISEL", isel.into()),
            ],
        )
        .unwrap()
        .with_unit("m3/s")
    }

    #[test]
    fn test_concat_new_axis() {
        let records = vec![
            record("a", "EXCIT", 1, &[1.0, 2.0], &[1.0, 2.0]),
            record("b", "EXCIT", 2, &[1.0, 2.0], &[3.0, 4.0]),
        ];
        let stacked = concat(records, RECORD_AXIS).unwrap();
        assert_eq!(stacked.dims(), ["index".to_string(), "Te".to_string()]);
        assert_eq!(stacked.shape(), &[2, 2]);
        assert!(stacked.coord("TYPE").unwrap().is_scalar());
        assert_eq!(stacked.coord("line").unwrap().dims(), ["index".to_string()]);
        assert_eq!(stacked.coord("Te").unwrap().unit(), Some("eV"));
        assert_eq!(stacked.unit(), Some("m3/s"));
        assert_eq!(stacked.data()[[1, 0].as_slice()], 3.0);
    }

    #[test]
    fn test_concat_misaligned_grids() {
        let records = vec![
            record("a", "EXCIT", 1, &[1.0, 2.0], &[1.0, 2.0]),
            record("b", "EXCIT", 2, &[2.0, 3.0], &[5.0, 6.0]),
        ];
        let stacked = concat(records, RECORD_AXIS).unwrap();
        assert_eq!(
            stacked.coord("Te").unwrap().to_f64_vec(),
            Some(vec![1.0, 2.0, 3.0])
        );
        let data = stacked.data();
        assert_eq!(data[[0, 1].as_slice()], 2.0);
        assert!(data[[0, 2].as_slice()].is_nan());
        assert!(data[[1, 0].as_slice()].is_nan());
        assert_eq!(data[[1, 1].as_slice()], 5.0);
    }

    #[test]
    fn test_assemble_joint_key() {
        let records = vec![
            record("b", "EXCIT", 1, &[1.0], &[1.0]),
            record("a", "EXCIT", 2, &[1.0], &[2.0]),
            record("a", "RECOM", 3, &[1.0], &[3.0]),
        ];
        let pec = assemble(records, &["line", "TYPE"]).unwrap();
        assert_eq!(
            pec.dims(),
            ["line".to_string(), "TYPE".to_string(), "Te".to_string()]
        );
        assert_eq!(pec.shape(), &[2, 2, 1]);
        assert_eq!(
            pec.value_at(&[("line", "a".into()), ("TYPE", "RECOM".into()), ("Te", 1.0.into())]),
            Some(3.0)
        );
        assert!(pec
            .value_at(&[("line", "b".into()), ("TYPE", "RECOM".into()), ("Te", 1.0.into())])
            .unwrap()
            .is_nan());

        let isel = pec.coord("ISEL").unwrap();
        assert_eq!(isel.dims(), ["line".to_string(), "TYPE".to_string()]);
        assert_eq!(isel.values()[[1, 0].as_slice()], Some(AttrValue::Integer(1)));
        assert_eq!(isel.values()[[1, 1].as_slice()], None);
    }

    #[test]
    fn test_constant_key_is_broadcast() {
        let records = vec![
            record("a", "EXCIT", 1, &[1.0, 2.0], &[1.0, 2.0]),
            record("b", "EXCIT", 2, &[1.0, 2.0], &[3.0, 4.0]),
        ];
        let pec = assemble(records, &["line", "TYPE"]).unwrap();
        assert_eq!(pec.shape(), &[2, 1, 2]);
        assert_eq!(pec.dim_len("TYPE"), Some(1));
        assert_eq!(
            pec.coord("TYPE").unwrap().get(0),
            Some(&AttrValue::from("EXCIT"))
        );
        // ISEL is a function of the line label alone
        assert_eq!(pec.coord("ISEL").unwrap().dims(), ["line".to_string()]);
    }

    #[test]
    fn test_duplicate_key_is_ambiguous() {
        let records = vec![
            record("a", "EXCIT", 1, &[1.0], &[1.0]),
            record("a", "EXCIT", 2, &[1.0], &[2.0]),
        ];
        let err = assemble(records, &["line", "TYPE"]).unwrap_err();
        assert_eq!(
            err,
            AdasError::AmbiguousIndex("(line, TYPE) = (a, EXCIT)".into())
        );
    }

    #[test]
    fn test_missing_key() {
        let records = vec![record("a", "EXCIT", 1, &[1.0], &[1.0])];
        assert_eq!(
            assemble(records, &["line", "ISPB"]).unwrap_err(),
            AdasError::MissingCoordinate("ISPB".into())
        );
    }

    #[test]
    fn test_reindex() {
        let records = vec![
            record("a", "EXCIT", 1, &[1.0], &[1.0]),
            record("c", "EXCIT", 3, &[1.0], &[3.0]),
        ];
        let pec = assemble(records, &["line", "TYPE"]).unwrap();
        let full = reindex(pec, "line", vec!["a".into(), "b".into(), "c".into()]).unwrap();
        assert_eq!(full.shape(), &[3, 1, 1]);
        assert!(full.data()[[1, 0, 0].as_slice()].is_nan());
        assert_eq!(full.data()[[2, 0, 0].as_slice()], 3.0);
        let isel = full.coord("ISEL").unwrap();
        assert_eq!(isel.get(1), None);
        assert_eq!(isel.get(2), Some(&AttrValue::Integer(3)));

        assert!(matches!(
            reindex(full, "line", vec!["a".into()]),
            Err(AdasError::MissingCoordinate(_))
        ));
    }

    #[test]
    fn test_concat_existing_axis() {
        let scan = |energy: &[f64], values: &[f64]| {
            LabeledArray::new(
                Array1::from_vec(values.to_vec()).into_dyn(),
                &["energy"],
                vec![Coordinate::numeric_axis("energy", energy).with_unit("eV/amu")],
            )
            .unwrap()
        };
        let joined = concat(
            vec![scan(&[1.0, 2.0], &[10.0, 20.0]), scan(&[3.0], &[30.0])],
            "energy",
        )
        .unwrap();
        assert_eq!(joined.shape(), &[3]);
        assert_eq!(
            joined.coord("energy").unwrap().to_f64_vec(),
            Some(vec![1.0, 2.0, 3.0])
        );
        assert_eq!(joined.coord("energy").unwrap().unit(), Some("eV/amu"));
        assert_eq!(joined.data().as_slice().unwrap(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_concat_rejects_different_dims() {
        let a = LabeledArray::new(array![1.0].into_dyn(), &["Te"], vec![]).unwrap();
        let b = LabeledArray::new(array![1.0].into_dyn(), &["ne"], vec![]).unwrap();
        assert!(matches!(
            concat(vec![a, b], RECORD_AXIS),
            Err(AdasError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_concat_datasets_fills_missing_variable() {
        let energy_array = |energy: &[f64]| {
            LabeledArray::new(
                Array1::from_elem(energy.len(), 1.0).into_dyn(),
                &["energy"],
                vec![Coordinate::numeric_axis("energy", energy)],
            )
            .unwrap()
        };
        let mut first = LabeledDataset::new();
        first.insert("total", energy_array(&[1.0, 2.0]));
        first.insert("n", energy_array(&[1.0, 2.0]));
        let mut second = LabeledDataset::new();
        second.insert("total", energy_array(&[3.0]));

        let joined = concat_datasets(vec![first, second], "energy").unwrap();
        let n = joined.get("n").unwrap();
        assert_eq!(n.shape(), &[3]);
        assert_eq!(n.data()[[1].as_slice()], 1.0);
        assert!(n.data()[[2].as_slice()].is_nan());
        assert_eq!(joined.get("total").unwrap().shape(), &[3]);
    }
}
