//! # Recombination rate coefficients (`rrc*` datasets)
//!
//! ## Layout
//!
//! ```text
//! line 0                        sequence [5..7]  nuclear charge [21..]
//! PARENT TERM INDEXING ... NPRNTI= n_upper
//!   (3 lines)
//!   n_upper rows                configuration [7..30]  2S+1 [32]  L [34]  J [36..40]  energy [42..53]
//! LS RESOLVED TERM INDEXING ... NTRM= n_lower
//!   (3 lines)
//!   n_lower rows                same columns
//! for each parent 1..=n_upper:
//!   ... PRTI= i ...
//!   (1 line)
//!   ... = Te_1 Te_2 ...         (K)
//!   (1 line)
//!   rows                        destination [0..7]  rates [7..]   (cm3/s)
//! ```
//!
//! The rows of a parent section end at the first line whose destination field is not an
//! integer. The labeled output is `(upper_index, lower_index, Te)` with 0-based state indices
//! covering every declared state, term labels and energies attached along each index axis.
use std::sync::LazyLock;

use log::debug;
use ndarray::Array1;
use regex::Regex;

use crate::{
    adas_errors::AdasError,
    block_reader::LineCursor,
    constants::{kelvin_to_ev, CM3_PER_S_TO_M3_PER_S},
    conversion::{
        columns, columns_from, parse_count, parse_fortran_float, parse_fortran_list, parse_int,
        term_symbol, text_after,
    },
    labeled_array::{
        assembler::{assemble, reindex},
        AttrValue, Coordinate, LabeledArray,
    },
};

pub const RRC_NAME: &str = "recombination rate coefficient";

const PARENT_SECTION: &str = "PARENT TERM INDEXING";
const TERM_SECTION: &str = "LS RESOLVED TERM INDEXING";

static PRTI_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PRTI=\s*(\d+)").expect("PRTI tag pattern"));

/// Parent index of a `PRTI=` tagged line; `PRTI= 1` and `PRTI=1` both give 1, never 10.
fn prti_index(line: &str) -> Option<usize> {
    PRTI_TAG.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Rates of one parent (upper) state, as read.
#[derive(Debug, Clone, PartialEq)]
pub struct RrcSection {
    /// Temperature grid in kelvin
    pub temperature_k: Vec<f64>,
    /// `(destination, rates)` pairs, destinations 1-based, rates in cm3/s
    pub rates: Vec<(usize, Vec<f64>)>,
}

/// Unlabeled content of an rrc file.
#[derive(Debug, Clone, PartialEq)]
pub struct RrcTables {
    pub sequence: String,
    pub nuclear_charge: i64,
    pub upper_terms: Vec<String>,
    pub upper_energies: Vec<f64>,
    pub lower_terms: Vec<String>,
    pub lower_energies: Vec<f64>,
    /// One section per parent, in parent order
    pub sections: Vec<RrcSection>,
}

/// Read a term indexing section: its declared count and the `(term, energy)` rows.
fn read_states(
    cursor: &mut LineCursor,
    section: &str,
    count_key: &str,
) -> Result<(Vec<String>, Vec<f64>), AdasError> {
    let at = cursor
        .find(|line| line.contains(section))
        .ok_or_else(|| AdasError::MissingSection(section.to_string()))?;
    cursor.seek(at);
    let heading = cursor.next_line(section)?;
    let count = parse_count(
        text_after(heading, count_key)
            .ok_or_else(|| AdasError::MalformedHeader(format!("{count_key} in {section}")))?,
    )?;
    cursor.skip(3, section)?;
    debug!("rrc {section}: {count} states");

    let mut terms = Vec::with_capacity(count);
    let mut energies = Vec::with_capacity(count);
    for _ in 0..count {
        let row = cursor.next_line(section)?;
        let symbol = term_symbol(
            columns(row, 32..33),
            columns(row, 34..35),
            columns(row, 36..40),
        )?;
        terms.push(format!("{}({symbol})", columns(row, 7..30).trim()));
        energies.push(parse_fortran_float(columns(row, 42..53))?);
    }
    Ok((terms, energies))
}

fn read_section(
    cursor: &mut LineCursor,
    parent: usize,
    n_lower: usize,
) -> Result<RrcSection, AdasError> {
    let tag = cursor
        .find(|line| prti_index(line) == Some(parent))
        .ok_or_else(|| AdasError::MissingSection(format!("PRTI={parent}")))?;
    cursor.seek(tag);
    cursor.skip(2, "PRTI heading")?;
    let grid_line = cursor.next_line("rrc temperature grid")?;
    let grid = text_after(grid_line, "=").ok_or_else(|| {
        AdasError::MalformedHeader(format!("temperature grid of PRTI={parent}"))
    })?;
    let temperature_k = parse_fortran_list(grid)?;
    cursor.skip(1, "rrc rows heading")?;

    let mut rates = Vec::new();
    while let Some(line) = cursor.peek() {
        let Ok(destination) = parse_count(columns(line, 0..7)) else {
            break;
        };
        cursor.next_line("rrc row")?;
        if !(1..=n_lower).contains(&destination) {
            return Err(AdasError::DimensionMismatch {
                dim: format!("destination of PRTI={parent}"),
                expected: n_lower,
                found: destination,
            });
        }
        let row = parse_fortran_list(columns_from(line, 7))?;
        if row.len() != temperature_k.len() {
            return Err(AdasError::BlockLengthMismatch {
                context: format!("PRTI={parent} destination {destination}"),
                expected: temperature_k.len(),
                found: row.len(),
            });
        }
        rates.push((destination, row));
    }
    debug!(
        "rrc PRTI={parent}: {} temperatures, {} destinations",
        temperature_k.len(),
        rates.len()
    );
    Ok(RrcSection {
        temperature_k,
        rates,
    })
}

/// Unlabeled reading: state tables and parent sections with the file units.
pub fn parse_tables(lines: &[&str]) -> Result<RrcTables, AdasError> {
    let mut cursor = LineCursor::new(lines);
    let first = cursor.next_line("rrc file header")?;
    let sequence = columns(first, 5..7).trim().to_string();
    let nuclear_charge = parse_int(columns_from(first, 21))?;

    let (upper_terms, upper_energies) = read_states(&mut cursor, PARENT_SECTION, "NPRNTI=")?;
    let (lower_terms, lower_energies) = read_states(&mut cursor, TERM_SECTION, "NTRM=")?;
    let sections = (1..=upper_terms.len())
        .map(|parent| read_section(&mut cursor, parent, lower_terms.len()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RrcTables {
        sequence,
        nuclear_charge,
        upper_terms,
        upper_energies,
        lower_terms,
        lower_energies,
        sections,
    })
}

fn state_coords(index: &str, prefix: &str, terms: &[String], energies: &[f64]) -> [Coordinate; 2] {
    [
        Coordinate::along(
            &format!("{prefix}_term"),
            index,
            terms.iter().map(|t| Some(t.as_str().into())).collect(),
        ),
        Coordinate::along(
            &format!("{prefix}_energy"),
            index,
            energies.iter().map(|&e| Some(e.into())).collect(),
        ),
    ]
}

impl RrcTables {
    /// The `(upper_index, lower_index, Te)` array, rates in m3/s and temperatures in eV.
    pub fn to_labeled(&self) -> Result<LabeledArray, AdasError> {
        let mut records = Vec::new();
        for (upper, section) in self.sections.iter().enumerate() {
            let te: Vec<f64> = section
                .temperature_k
                .iter()
                .map(|&t| kelvin_to_ev(t))
                .collect();
            for (destination, row) in &section.rates {
                let values = Array1::from_iter(row.iter().map(|r| r * CM3_PER_S_TO_M3_PER_S));
                records.push(LabeledArray::new(
                    values.into_dyn(),
                    &["Te"],
                    vec![
                        Coordinate::numeric_axis("Te", &te).with_unit("eV"),
                        Coordinate::scalar("upper_index", upper.into()),
                        Coordinate::scalar("lower_index", (destination - 1).into()),
                    ],
                )?);
            }
        }

        let levels = |count: usize| (0..count).map(AttrValue::from).collect::<Vec<_>>();
        let mut rrc = assemble(records, &["upper_index", "lower_index"])?;
        if rrc.axis_of("Te").is_none() {
            rrc = LabeledArray::empty(&["upper_index", "lower_index", "Te"]);
        }
        rrc = reindex(rrc, "upper_index", levels(self.upper_terms.len()))?;
        rrc = reindex(rrc, "lower_index", levels(self.lower_terms.len()))?;

        for coord in state_coords("upper_index", "upper", &self.upper_terms, &self.upper_energies)
            .into_iter()
            .chain(state_coords(
                "lower_index",
                "lower",
                &self.lower_terms,
                &self.lower_energies,
            ))
        {
            rrc.insert_coord(coord)?;
        }
        Ok(rrc
            .with_name(RRC_NAME)
            .with_unit("m3/s")
            .with_attr("sequence", &self.sequence)
            .with_attr("nuclear_charge", &self.nuclear_charge.to_string()))
    }
}

/// Labeled reading, see [`RrcTables::to_labeled`].
pub fn parse_labeled(lines: &[&str]) -> Result<LabeledArray, AdasError> {
    parse_tables(lines)?.to_labeled()
}
