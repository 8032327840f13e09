//! # Charge exchange cross sections (ADF01, `qcx*` datasets)
//!
//! ## Layout
//!
//! ```text
//! line 0          receiver [0..10]  donor [10../]
//! per segment     n_energy /        (a line failing this decode ends the file)
//!                 nmin /
//!                 nmax /
//!                 energies /        (eV/amu)
//!                 (skipped)
//!                 totals [11..92]   (cm2)
//!                 (skipped)
//!                 rows: n [0..4]  l [4..7]  m [7..10]  values [11..]   (cm2)
//! ```
//!
//! Rows end when the `n` field no longer decodes; that line opens the next segment. Rows are
//! grouped by how many of `n`, `l`, `m` decode, giving the `cross_section_n` `(n, energy)`,
//! `cross_section_nl` `(n, l, energy)` and `cross_section_nlm` `(n, l, m, energy)` variables
//! next to `cross_section_total` `(energy)`. Segments are joined along `energy`.
use log::debug;
use ndarray::Array1;

use crate::{
    adas_errors::AdasError,
    block_reader::LineCursor,
    constants::CM2_TO_M2,
    conversion::{char_column, columns, columns_from, parse_fortran_list, parse_int},
    labeled_array::{
        assembler::{assemble, concat_datasets},
        Coordinate, LabeledArray, LabeledDataset,
    },
};

pub const TOTAL: &str = "cross_section_total";
pub const N_RESOLVED: &str = "cross_section_n";
pub const NL_RESOLVED: &str = "cross_section_nl";
pub const NLM_RESOLVED: &str = "cross_section_nlm";

const CROSS_SECTION_UNIT: &str = "m^2";

/// Text preceding the first `/` of a header line.
fn before_slash(line: &str) -> Option<&str> {
    line.find('/').map(|slash| &line[..slash])
}

fn header_int(line: &str, field: &str) -> Result<i64, AdasError> {
    let text = before_slash(line)
        .ok_or_else(|| AdasError::MalformedHeader(format!("{field}: {}", line.trim())))?;
    parse_int(text)
}

/// Declared energy count of a segment header, `None` when the line does not open a segment.
fn segment_energy_count(line: &str) -> Option<usize> {
    before_slash(line)?.trim().parse().ok()
}

/// Decode a one-line list holding exactly one value per energy.
fn energy_row(text: &str, expected: usize, context: &str) -> Result<Vec<f64>, AdasError> {
    let values = parse_fortran_list(text)?;
    if values.len() != expected {
        return Err(AdasError::BlockLengthMismatch {
            context: context.to_string(),
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}

/// Decode a row of cross sections and convert it to m2.
fn cross_sections(text: &str, expected: usize, context: &str) -> Result<Vec<f64>, AdasError> {
    Ok(energy_row(text, expected, context)?
        .into_iter()
        .map(|cs| cs * CM2_TO_M2)
        .collect())
}

struct Segment {
    nmin: i64,
    nmax: i64,
    dataset: LabeledDataset,
}

fn read_segment(cursor: &mut LineCursor, n_energy: usize) -> Result<Segment, AdasError> {
    let nmin = header_int(cursor.next_line("qcx nmin")?, "nmin")?;
    let nmax = header_int(cursor.next_line("qcx nmax")?, "nmax")?;
    let energy_line = cursor.next_line("qcx energies")?;
    let energies = energy_row(
        before_slash(energy_line).unwrap_or(energy_line),
        n_energy,
        "qcx energies",
    )?;
    debug!("qcx segment: {n_energy} energies, n in {nmin}..={nmax}");

    let energy_axis = || Coordinate::numeric_axis("energy", &energies).with_unit("eV/amu");
    let record = |values: Vec<f64>, coords: Vec<Coordinate>| {
        LabeledArray::new(Array1::from_vec(values).into_dyn(), &["energy"], coords)
            .map(|cs| cs.with_unit(CROSS_SECTION_UNIT))
    };

    cursor.skip(1, "qcx totals heading")?;
    let totals_line = cursor.next_line("qcx totals")?;
    let totals = cross_sections(columns(totals_line, 11..92), n_energy, "qcx totals")?;
    cursor.skip(1, "qcx rows heading")?;

    let (mut by_n, mut by_nl, mut by_nlm) = (Vec::new(), Vec::new(), Vec::new());
    while let Some(line) = cursor.peek() {
        let Ok(n) = parse_int(columns(line, 0..4)) else {
            break;
        };
        cursor.next_line("qcx row")?;
        let values = cross_sections(
            columns_from(line, 11),
            n_energy,
            &format!("qcx row '{}'", columns(line, 0..10).trim()),
        )?;
        let mut coords = vec![energy_axis(), Coordinate::scalar("n", n.into())];
        match (
            parse_int(columns(line, 4..7)),
            parse_int(columns(line, 7..10)),
        ) {
            (Ok(l), Ok(m)) => {
                coords.push(Coordinate::scalar("l", l.into()));
                coords.push(Coordinate::scalar("m", m.into()));
                by_nlm.push(record(values, coords)?);
            }
            (Ok(l), Err(_)) => {
                coords.push(Coordinate::scalar("l", l.into()));
                by_nl.push(record(values, coords)?);
            }
            (Err(_), _) => by_n.push(record(values, coords)?),
        }
    }
    debug!(
        "qcx segment rows: {} n, {} nl, {} nlm",
        by_n.len(),
        by_nl.len(),
        by_nlm.len()
    );

    let mut dataset = LabeledDataset::new();
    dataset.insert(TOTAL, record(totals, vec![energy_axis()])?.with_name(TOTAL));
    for (name, records, keys) in [
        (N_RESOLVED, by_n, &["n"][..]),
        (NL_RESOLVED, by_nl, &["n", "l"][..]),
        (NLM_RESOLVED, by_nlm, &["n", "l", "m"][..]),
    ] {
        if !records.is_empty() {
            dataset.insert(name, assemble(records, keys)?.with_name(name));
        }
    }
    Ok(Segment {
        nmin,
        nmax,
        dataset,
    })
}

/// Read a qcx file into a dataset of cross sections (m2) over `energy` (eV/amu).
///
/// Return
/// ----------
/// * The dataset, with `receiver`, `donor`, `nmin` and `nmax` (first segment) attributes
/// * [`AdasError::BlockLengthMismatch`] if a row does not hold one value per energy,
///   [`AdasError::AmbiguousIndex`] if a segment repeats an `(n, l, m)` row.
pub fn parse(lines: &[&str]) -> Result<LabeledDataset, AdasError> {
    let mut cursor = LineCursor::new(lines);
    let species = cursor.next_line("qcx species line")?;
    let slash = char_column(species, species.find('/').unwrap_or(species.len()));
    let receiver = columns(species, 0..10).replace(' ', "");
    let donor = columns(species, 10..slash).replace(' ', "");
    debug!("qcx file: receiver {receiver}, donor {donor}");

    let mut segments = Vec::new();
    while let Some(n_energy) = cursor.peek().and_then(segment_energy_count) {
        cursor.next_line("qcx energy count")?;
        segments.push(read_segment(&mut cursor, n_energy)?);
    }

    let mut dataset = LabeledDataset::new()
        .with_attr("receiver", &receiver)
        .with_attr("donor", &donor);
    if let Some(first) = segments.first() {
        dataset = dataset
            .with_attr("nmin", &first.nmin.to_string())
            .with_attr("nmax", &first.nmax.to_string());
    }
    let joined = concat_datasets(segments.into_iter().map(|s| s.dataset).collect(), "energy")?;
    dataset.variables = joined.variables;
    Ok(dataset)
}
