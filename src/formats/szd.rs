//! # Ionisation rate coefficients (`szd*` datasets)
//!
//! ## Layout
//!
//! ```text
//! line 0        n_blocks  element/  name ...
//! per block     ... nTe /I.P. ...      (nTe: the 4 columns preceding "/I.P.")
//!               nTe temperatures (eV), wrapped
//!               nTe rates (cm3/s), wrapped
//! ```
//!
//! Blocks are stacked along `lower_index` (the block position), giving a `(lower_index, Te)`
//! array.
use log::debug;
use ndarray::Array1;

use crate::{
    adas_errors::AdasError,
    block_reader::LineCursor,
    constants::CM3_PER_S_TO_M3_PER_S,
    conversion::{char_column, columns, parse_count, split_tokens},
    labeled_array::{assembler::concat, Coordinate, LabeledArray},
};

pub const SZD_NAME: &str = "ionisation rate coefficient";

const IP_MARKER: &str = "/I.P.";

fn read_block(
    cursor: &mut LineCursor,
    block: usize,
    element: &str,
    name: &str,
) -> Result<LabeledArray, AdasError> {
    let header = cursor.next_line("szd block header")?;
    let marker = header
        .find(IP_MARKER)
        .ok_or_else(|| AdasError::MissingSection(format!("{IP_MARKER} in block {block}")))?;
    let marker = char_column(header, marker);
    let n_te = parse_count(columns(header, marker.saturating_sub(4)..marker))?;
    debug!("szd block {block}: {n_te} temperatures");

    let context = format!("szd block {block}");
    let te = cursor.take_values(n_te, &context)?;
    let rates = cursor.take_values(n_te, &context)?;
    cursor.finish_block(&context, n_te)?;

    let rates = Array1::from_iter(rates.into_iter().map(|r| r * CM3_PER_S_TO_M3_PER_S));
    Ok(LabeledArray::new(
        rates.into_dyn(),
        &["Te"],
        vec![
            Coordinate::numeric_axis("Te", &te).with_unit("eV"),
            Coordinate::scalar("lower_index", block.into()),
            Coordinate::scalar("element", element.into()),
            Coordinate::scalar("name", name.into()),
        ],
    )?
    .with_name(SZD_NAME)
    .with_unit("m3/s"))
}

/// Read an szd file into a `(lower_index, Te)` array of rates in m3/s.
///
/// Return
/// ----------
/// * The array, with `element` and `name` as scalar coordinates and attributes
/// * [`AdasError::MalformedHeader`] if the first line lacks block count, element or name,
///   [`AdasError::MissingSection`] if a block header has no `/I.P.` marker.
pub fn parse(lines: &[&str]) -> Result<LabeledArray, AdasError> {
    let mut cursor = LineCursor::new(lines);
    let first = cursor.next_line("szd file header")?;
    let [count, element, name]: [&str; 3] = split_tokens(first)
        .take(3)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| AdasError::MalformedHeader(first.trim().to_string()))?;
    let n_blocks = parse_count(count)?;
    let element = element.replace('/', "");
    debug!("szd file {name} ({element}): {n_blocks} blocks");

    let blocks = (0..n_blocks)
        .map(|block| read_block(&mut cursor, block, &element, name))
        .collect::<Result<Vec<_>, _>>()?;
    let szd = if blocks.is_empty() {
        LabeledArray::empty(&["lower_index", "Te"])
            .with_name(SZD_NAME)
            .with_unit("m3/s")
    } else {
        concat(blocks, "lower_index")?
    };
    Ok(szd.with_attr("element", &element).with_attr("name", name))
}
