//! # Photon emission coefficients (ADF15, `pec*` datasets)
//!
//! ## Layout
//!
//! ```text
//! line 0      n_blocks [0..6]  title [6..]
//! per block   label [0..11]  ndens [11..15]  ntemp [15..19]  /key = value/key = value ...
//!             ndens densities (cm-3), wrapped
//!             ntemp temperatures (eV), wrapped
//!             ndens × ntemp coefficients (cm3/s), row-major [density, temperature], wrapped
//! ```
//!
//! The labeled output is indexed by `(line, TYPE, ne, Te)`, `TYPE` being the mandatory
//! `TYPE = EXCIT | RECOM | CHEXC` annotation. Every other annotation (`ISEL`, `FILMEM`, ...)
//! becomes a coordinate over the key axes.
use log::debug;
use ndarray::Array2;

use crate::{
    adas_errors::AdasError,
    block_reader::LineCursor,
    constants::{CM3_PER_S_TO_M3_PER_S, PER_CM3_TO_PER_M3},
    conversion::{columns, columns_from, parse_annotation, parse_count},
    labeled_array::{assembler::assemble, AttrValue, Coordinate, LabeledArray},
};

pub const PEC_NAME: &str = "photon emission coefficient";

/// Key annotation every block header must carry.
pub const TYPE_KEY: &str = "TYPE";

/// One block of a pec file, as read.
///
/// Densities and temperatures keep the file units (cm-3, eV); the coefficient grid is scaled
/// to m3/s.
#[derive(Debug, Clone, PartialEq)]
pub struct PecBlock {
    /// Verbatim header line
    pub header: String,
    /// Emission line label, e.g. `"1215.7 A"`
    pub line: String,
    /// Trailing `key = value` annotations, in header order
    pub annotations: Vec<(String, AttrValue)>,
    pub densities: Vec<f64>,
    pub temperatures: Vec<f64>,
    /// Coefficients, shape `[densities.len(), temperatures.len()]`
    pub values: Array2<f64>,
}

impl PecBlock {
    /// Value of annotation `key`, if present.
    pub fn annotation(&self, key: &str) -> Option<&AttrValue> {
        self.annotations
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// The block as a `[ne, Te]` record carrying its label and annotations as scalar coordinates.
    fn to_record(&self) -> Result<LabeledArray, AdasError> {
        let densities: Vec<f64> = self
            .densities
            .iter()
            .map(|ne| ne * PER_CM3_TO_PER_M3)
            .collect();
        let mut coords = vec![
            Coordinate::numeric_axis("ne", &densities).with_unit("m-3"),
            Coordinate::numeric_axis("Te", &self.temperatures).with_unit("eV"),
            Coordinate::scalar("line", self.line.as_str().into()),
        ];
        coords.extend(
            self.annotations
                .iter()
                .map(|(key, value)| Coordinate::scalar(key, value.clone())),
        );
        Ok(
            LabeledArray::new(self.values.clone().into_dyn(), &["ne", "Te"], coords)?
                .with_name(PEC_NAME)
                .with_unit("m3/s"),
        )
    }
}

fn read_block(cursor: &mut LineCursor) -> Result<PecBlock, AdasError> {
    let header = cursor.next_line("pec block header")?;
    let line = columns(header, 0..11).trim().to_string();
    let ndens = parse_count(columns(header, 11..15))?;
    let ntemp = parse_count(columns(header, 15..19))?;
    let annotations = columns_from(header, 19)
        .split('/')
        .skip(1)
        .filter(|item| !item.trim().is_empty())
        .map(parse_annotation)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("pec block '{line}': {ndens} densities, {ntemp} temperatures");

    let densities = cursor.take_values(ndens, &format!("densities of '{line}'"))?;
    let temperatures = cursor.take_values(ntemp, &format!("temperatures of '{line}'"))?;
    let context = format!("coefficients of '{line}'");
    let values = cursor.take_values(ndens * ntemp, &context)?;
    cursor.finish_block(&context, ndens * ntemp)?;

    let found = values.len();
    let values = Array2::from_shape_vec((ndens, ntemp), values).map_err(|_| {
        AdasError::DimensionMismatch {
            dim: context.clone(),
            expected: ndens * ntemp,
            found,
        }
    })? * CM3_PER_S_TO_M3_PER_S;

    Ok(PecBlock {
        header: header.to_string(),
        line,
        annotations,
        densities,
        temperatures,
        values,
    })
}

/// Read the title and every block of a pec file.
fn read_file(lines: &[&str]) -> Result<(String, Vec<PecBlock>), AdasError> {
    let mut cursor = LineCursor::new(lines);
    let first = cursor.next_line("pec file header")?;
    let n_blocks = parse_count(columns(first, 0..6))?;
    let title = columns_from(first, 6).trim().to_string();
    debug!("pec file '{title}': {n_blocks} blocks");

    let blocks = (0..n_blocks)
        .map(|_| read_block(&mut cursor))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((title, blocks))
}

/// Unlabeled reading: the blocks in file order.
pub fn parse_blocks(lines: &[&str]) -> Result<Vec<PecBlock>, AdasError> {
    read_file(lines).map(|(_, blocks)| blocks)
}

/// Labeled reading: one `(line, TYPE, ne, Te)` array.
///
/// Return
/// ----------
/// * The array, with the file title as `title` attribute
/// * [`AdasError::MalformedHeader`] if a block lacks the `TYPE` annotation,
///   [`AdasError::AmbiguousIndex`] if two blocks share both line label and `TYPE`.
pub fn parse_labeled(lines: &[&str]) -> Result<LabeledArray, AdasError> {
    let (title, blocks) = read_file(lines)?;
    if let Some(block) = blocks.iter().find(|b| b.annotation(TYPE_KEY).is_none()) {
        return Err(AdasError::MalformedHeader(format!(
            "no {TYPE_KEY} annotation in block '{}'",
            block.header.trim()
        )));
    }
    if blocks.is_empty() {
        return Ok(LabeledArray::empty(&["line", TYPE_KEY, "ne", "Te"])
            .with_name(PEC_NAME)
            .with_unit("m3/s")
            .with_attr("title", &title));
    }

    let records = blocks
        .iter()
        .map(PecBlock::to_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(assemble(records, &["line", TYPE_KEY])?.with_attr("title", &title))
}

#[cfg(test)]
mod pec_test {
    use super::*;
    use approx::assert_relative_eq;

    fn header(label: &str, ndens: usize, ntemp: usize, kind: &str, isel: usize) -> String {
        format!("{label:>11}{ndens:>4}{ntemp:>4} /FILMEM = 1 /TYPE = {kind} /ISEL = {isel}")
    }

    fn two_lines_file(second_kind: &str) -> Vec<String> {
        vec![
            "     2    /C 2+ PHOTON EMISSIVITY COEFFICIENTS/".to_string(),
            header("1215.7 A", 2, 3, "EXCIT", 1),
            " 1.00000D+13 2.00000D+13".to_string(),
            " 1.00000D+00 2.00000D+00 3.00000D+00".to_string(),
            " 1.0 2.0 3.0".to_string(),
            " 4.0 5.0 6.0".to_string(),
            header("1025.7 A", 2, 3, second_kind, 2),
            " 1.00000D+13 2.00000D+13 1.00000D+00".to_string(),
            " 2.00000D+00 3.00000D+00".to_string(),
            " 7.0 8.0 9.0 10.0 11.0 12.0".to_string(),
        ]
    }

    fn as_refs(lines: &[String]) -> Vec<&str> {
        lines.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_blocks() {
        let lines = two_lines_file("RECOM");
        let blocks = parse_blocks(&as_refs(&lines)).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].line, "1215.7 A");
        assert_eq!(blocks[0].densities, vec![1e13, 2e13]);
        assert_eq!(blocks[0].values.dim(), (2, 3));
        assert_relative_eq!(blocks[0].values[[1, 2]], 6e-6);
        assert_eq!(blocks[1].annotation("TYPE"), Some(&AttrValue::from("RECOM")));
        assert_eq!(blocks[1].annotation("ISEL"), Some(&AttrValue::Integer(2)));
        // the density list ends mid-line, the temperature list resumes on the same line
        assert_eq!(blocks[1].temperatures, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_labeled() {
        let lines = two_lines_file("RECOM");
        let pec = parse_labeled(&as_refs(&lines)).unwrap();
        assert_eq!(
            pec.dims(),
            ["line", "TYPE", "ne", "Te"].map(String::from).as_slice()
        );
        assert_eq!(pec.shape(), &[2, 2, 2, 3]);
        assert_eq!(pec.name(), Some(PEC_NAME));
        assert_eq!(pec.attr("title"), Some("/C 2+ PHOTON EMISSIVITY COEFFICIENTS/"));
        let cell = pec
            .value_at(&[
                ("line", "1215.7 A".into()),
                ("TYPE", "EXCIT".into()),
                ("ne", 1e19.into()),
                ("Te", 1.0.into()),
            ])
            .unwrap();
        assert_relative_eq!(cell, 1e-6);
        let missing = pec
            .value_at(&[
                ("line", "1215.7 A".into()),
                ("TYPE", "RECOM".into()),
                ("ne", 1e19.into()),
                ("Te", 1.0.into()),
            ])
            .unwrap();
        assert!(missing.is_nan());
    }

    #[test]
    fn test_constant_type_keeps_axis() {
        let lines = two_lines_file("EXCIT");
        let pec = parse_labeled(&as_refs(&lines)).unwrap();
        assert_eq!(pec.shape(), &[2, 1, 2, 3]);
        assert_eq!(pec.dim_len("line"), Some(2));
        assert_eq!(pec.coord("ISEL").unwrap().dims(), ["line".to_string()]);
    }

    #[test]
    fn test_missing_type() {
        let lines = [
            "     1",
            "   1215.7 A   1   1 /ISEL = 1",
            " 1.0",
            " 1.0",
            " 1.0",
        ];
        assert!(matches!(
            parse_labeled(&lines),
            Err(AdasError::MalformedHeader(_))
        ));
        assert_eq!(parse_blocks(&lines).unwrap().len(), 1);
    }

    #[test]
    fn test_surplus_values_rejected() {
        let lines = [
            "     1",
            "   1215.7 A   1   1 /TYPE = EXCIT",
            " 1.0 1.0 1.0 9.0",
        ];
        assert!(matches!(
            parse_blocks(&lines),
            Err(AdasError::BlockLengthMismatch { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn test_truncated_temperatures() {
        let lines = [
            "     1 title",
            "   1215.7 A   1   5 /TYPE = EXCIT",
            " 1.0",
            " 1.0 2.0 3.0",
        ];
        assert_eq!(
            parse_blocks(&lines),
            Err(AdasError::TruncatedBlock(
                "temperatures of '1215.7 A': 5 values declared, 3 found before end of input"
                    .into()
            ))
        );
    }

    #[test]
    fn test_non_ascii_label() {
        let lines = [
            "     1 title",
            "   1215.7 Å   1   2 /TYPE = EXCIT",
            " 1.0",
            " 1.0 2.0",
            " 3.0 4.0",
        ];
        let blocks = parse_blocks(&lines).unwrap();
        assert_eq!(blocks[0].line, "1215.7 Å");
        assert_eq!(blocks[0].temperatures, vec![1.0, 2.0]);
        assert_eq!(blocks[0].annotation("TYPE"), Some(&AttrValue::from("EXCIT")));
        assert_relative_eq!(blocks[0].values[[0, 1]], 4e-6);
    }

    #[test]
    fn test_zero_blocks() {
        let pec = parse_labeled(&["     0 empty"]).unwrap();
        assert_eq!(pec.shape(), &[0, 0, 0, 0]);
        assert_eq!(pec.attr("title"), Some("empty"));
    }
}
