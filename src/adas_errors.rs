use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdasError {
    #[error("Malformed number: {0:?}")]
    MalformedNumber(String),

    #[error("Invalid orbital angular momentum code: {0:?}")]
    InvalidOrbitalCode(String),

    #[error("Line stream exhausted in the middle of a record: {0}")]
    TruncatedBlock(String),

    #[error("Two records claim the same joint index key: {0}")]
    AmbiguousIndex(String),

    #[error("Dimension mismatch along '{dim}': expected {expected}, found {found}")]
    DimensionMismatch {
        dim: String,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported ADAS file format: {0}")]
    UnsupportedFormat(String),

    #[error("Output mode not supported for this format: {0}")]
    UnsupportedMode(String),

    #[error("Value list of {context} holds {found} values, {expected} declared")]
    BlockLengthMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Section not found: {0}")]
    MissingSection(String),

    #[error("Coordinate not found: {0}")]
    MissingCoordinate(String),

    #[error("ADAS dataset {0} was not found")]
    DatasetNotFound(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "adas-download")]
    #[error("HTTP ureq error: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("No home directory available to place the ADAS cache")]
    CacheDirUnavailable,
}

impl PartialEq for AdasError {
    fn eq(&self, other: &Self) -> bool {
        use AdasError::*;
        match (self, other) {
            (MalformedNumber(a), MalformedNumber(b)) => a == b,
            (InvalidOrbitalCode(a), InvalidOrbitalCode(b)) => a == b,
            (TruncatedBlock(a), TruncatedBlock(b)) => a == b,
            (AmbiguousIndex(a), AmbiguousIndex(b)) => a == b,
            (
                DimensionMismatch {
                    dim: d1,
                    expected: e1,
                    found: f1,
                },
                DimensionMismatch {
                    dim: d2,
                    expected: e2,
                    found: f2,
                },
            ) => d1 == d2 && e1 == e2 && f1 == f2,
            (UnsupportedFormat(a), UnsupportedFormat(b)) => a == b,
            (UnsupportedMode(a), UnsupportedMode(b)) => a == b,
            (
                BlockLengthMismatch {
                    context: c1,
                    expected: e1,
                    found: f1,
                },
                BlockLengthMismatch {
                    context: c2,
                    expected: e2,
                    found: f2,
                },
            ) => c1 == c2 && e1 == e2 && f1 == f2,
            (MalformedHeader(a), MalformedHeader(b)) => a == b,
            (MissingSection(a), MissingSection(b)) => a == b,
            (MissingCoordinate(a), MissingCoordinate(b)) => a == b,
            (DatasetNotFound(a), DatasetNotFound(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,

            // foreign errors are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            #[cfg(feature = "adas-download")]
            (HttpError(_), HttpError(_)) => true,

            (CacheDirUnavailable, CacheDirUnavailable) => true,

            _ => false,
        }
    }
}
