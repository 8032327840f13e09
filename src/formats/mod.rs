//! # ADAS file formats
//!
//! Dispatch of a dataset's text content to the reader of its format.
//!
//! ## Supported formats
//!
//! | prefix | content                               | labeled output                    | raw output        |
//! |--------|---------------------------------------|-----------------------------------|-------------------|
//! | `pec`  | photon emission coefficients          | `(line, TYPE, ne, Te)` array      | [`pec::PecBlock`]s |
//! | `qcx`  | charge exchange cross sections        | dataset over `energy`             | –                 |
//! | `rrc`  | recombination rate coefficients       | `(upper_index, lower_index, Te)`  | [`rrc::RrcTables`] |
//! | `szd`  | ionisation rate coefficients          | `(lower_index, Te)` array         | –                 |
//!
//! The format is resolved once from the first three characters of the dataset name
//! ([`AdasFormat::from_dataset_name`]); every reader is a pure function of the lines.
//!
//! ## Example
//!
//! ```rust,ignore
//! use adas_parser::formats::{read_str, AdasFormat, OutputMode};
//!
//! let format = AdasFormat::from_dataset_name("pec96#h_pju#h0");
//! let pec = read_str(&format, &content, OutputMode::Labeled)?.into_array()?;
//! println!("{:?}", pec.shape());
//! ```
use std::fmt;

use crate::{
    adas_errors::AdasError,
    labeled_array::{LabeledArray, LabeledDataset},
};

pub mod pec;
pub mod qcx;
pub mod rrc;
pub mod szd;

use pec::PecBlock;
use rrc::RrcTables;

/// Shape of the reader output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Dense labeled array (or dataset)
    #[default]
    Labeled,
    /// Unlabeled nested structure, values as read; only `pec` and `rrc` provide it
    Raw,
}

/// File format of an ADAS dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdasFormat {
    Pec,
    Qcx,
    Rrc,
    Szd,
    /// Any other prefix, kept for error reporting
    Unsupported(String),
}

impl AdasFormat {
    /// Resolve the format from the dataset name prefix, e.g. `"pec93#c_pju#c0"` → `Pec`.
    pub fn from_dataset_name(name: &str) -> Self {
        let prefix: String = name.chars().take(3).collect();
        match prefix.as_str() {
            "pec" => AdasFormat::Pec,
            "qcx" => AdasFormat::Qcx,
            "rrc" => AdasFormat::Rrc,
            "szd" => AdasFormat::Szd,
            _ => AdasFormat::Unsupported(name.to_string()),
        }
    }
}

impl fmt::Display for AdasFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdasFormat::Pec => write!(f, "pec"),
            AdasFormat::Qcx => write!(f, "qcx"),
            AdasFormat::Rrc => write!(f, "rrc"),
            AdasFormat::Szd => write!(f, "szd"),
            AdasFormat::Unsupported(name) => write!(f, "unsupported ({name})"),
        }
    }
}

/// Output of one reader call.
#[derive(Debug, Clone, PartialEq)]
pub enum AdasData {
    Array(LabeledArray),
    Dataset(LabeledDataset),
    PecBlocks(Vec<PecBlock>),
    RrcTables(RrcTables),
}

impl AdasData {
    pub fn as_array(&self) -> Option<&LabeledArray> {
        match self {
            AdasData::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&LabeledDataset> {
        match self {
            AdasData::Dataset(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Unwrap a labeled array, failing with [`AdasError::UnsupportedMode`] otherwise.
    pub fn into_array(self) -> Result<LabeledArray, AdasError> {
        match self {
            AdasData::Array(array) => Ok(array),
            other => Err(AdasError::UnsupportedMode(format!(
                "expected a labeled array, got {}",
                other.kind()
            ))),
        }
    }

    /// Unwrap a labeled dataset, failing with [`AdasError::UnsupportedMode`] otherwise.
    pub fn into_dataset(self) -> Result<LabeledDataset, AdasError> {
        match self {
            AdasData::Dataset(dataset) => Ok(dataset),
            other => Err(AdasError::UnsupportedMode(format!(
                "expected a labeled dataset, got {}",
                other.kind()
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AdasData::Array(_) => "a labeled array",
            AdasData::Dataset(_) => "a labeled dataset",
            AdasData::PecBlocks(_) => "pec blocks",
            AdasData::RrcTables(_) => "rrc tables",
        }
    }
}

/// Parse the lines of one dataset.
///
/// Trailing line terminators are stripped before parsing, so lines read with or without
/// them give the same result.
///
/// Arguments
/// -----------------
/// * `format`: the resolved dataset format
/// * `lines`: the file content, one entry per line
/// * `mode`: labeled or raw output
///
/// Return
/// ----------
/// * The parsed data
/// * [`AdasError::UnsupportedFormat`] for an unknown format,
///   [`AdasError::UnsupportedMode`] for raw output of `qcx` or `szd`,
///   or the reader error.
pub fn read_lines<S: AsRef<str>>(
    format: &AdasFormat,
    lines: &[S],
    mode: OutputMode,
) -> Result<AdasData, AdasError> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|line| line.as_ref().trim_end_matches(['\r', '\n']))
        .collect();

    match (format, mode) {
        (AdasFormat::Pec, OutputMode::Labeled) => pec::parse_labeled(&lines).map(AdasData::Array),
        (AdasFormat::Pec, OutputMode::Raw) => pec::parse_blocks(&lines).map(AdasData::PecBlocks),
        (AdasFormat::Qcx, OutputMode::Labeled) => qcx::parse(&lines).map(AdasData::Dataset),
        (AdasFormat::Rrc, OutputMode::Labeled) => rrc::parse_labeled(&lines).map(AdasData::Array),
        (AdasFormat::Rrc, OutputMode::Raw) => rrc::parse_tables(&lines).map(AdasData::RrcTables),
        (AdasFormat::Szd, OutputMode::Labeled) => szd::parse(&lines).map(AdasData::Array),
        (AdasFormat::Qcx | AdasFormat::Szd, OutputMode::Raw) => Err(AdasError::UnsupportedMode(
            format!("{format} files are only read as labeled arrays"),
        )),
        (AdasFormat::Unsupported(name), _) => Err(AdasError::UnsupportedFormat(name.clone())),
    }
}

/// Parse the whole text of one dataset, see [`read_lines`].
pub fn read_str(format: &AdasFormat, content: &str, mode: OutputMode) -> Result<AdasData, AdasError> {
    read_lines(format, &content.lines().collect::<Vec<_>>(), mode)
}
