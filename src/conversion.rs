//! # Scalar decoders
//!
//! Field-level decoding for the ADAS fixed-width conventions:
//!
//! - Fortran double precision numerals (`1.234D-05`) via [`parse_fortran_float`]
//! - Auto-typed annotation values (`integer → float → text`) via [`auto_decode`]
//! - Spectroscopic term labels (`3P4.0`) via [`term_symbol`]
//! - Column slicing with the clamping behaviour of fixed-width layouts via [`columns`]
//!
//! None of these functions mutate their input; they operate on borrowed slices of a line.
use std::ops::Range;

use nom::{
    bytes::complete::{tag, take_until},
    character::complete::char,
    combinator::rest,
    sequence::{preceded, separated_pair},
    IResult, Parser,
};

use crate::{adas_errors::AdasError, labeled_array::AttrValue};

/// Spectroscopic letters indexed by the orbital angular momentum quantum number.
const ORBITAL_LETTERS: &str = "SPDFGHIJKLMN";

/// Slice a fixed-width field out of a line.
///
/// Columns are 0-based character positions, half-open. The range is clamped to the line length
/// so a short line yields a shorter (possibly empty) field rather than a panic.
///
/// Arguments
/// -----------------
/// * `line`: the raw text line
/// * `range`: the column range of the field
///
/// Return
/// ----------
/// * The field text, untrimmed
pub fn columns(line: &str, range: Range<usize>) -> &str {
    let start = byte_offset(line, range.start);
    let end = byte_offset(line, range.end.max(range.start));
    &line[start..end]
}

/// Slice a line from `start` to its end, clamped like [`columns`].
pub fn columns_from(line: &str, start: usize) -> &str {
    &line[byte_offset(line, start)..]
}

/// Character column of a byte offset, for offsets returned by `str::find`.
pub fn char_column(line: &str, byte_offset: usize) -> usize {
    line.get(..byte_offset)
        .map_or_else(|| line.chars().count(), |head| head.chars().count())
}

/// Byte offset of character column `column`, the line length past its end.
fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(offset, _)| offset)
}

/// Split a text on whitespace, discarding empty tokens.
pub fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Decode a numeral that may use the Fortran `D` exponent marker.
///
/// Arguments
/// -----------------
/// * `token`: a numeric token such as `"1.00D+01"`, `"2.5E-3"` or `" 42 "`
///
/// Return
/// ----------
/// * The decoded value, or [`AdasError::MalformedNumber`] if neither the `E` nor the `D`
///   convention parses.
pub fn parse_fortran_float(token: &str) -> Result<f64, AdasError> {
    let trimmed = token.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return Ok(value);
    }
    trimmed
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| AdasError::MalformedNumber(trimmed.to_string()))
}

/// Decode a whitespace separated list of Fortran numerals.
pub fn parse_fortran_list(text: &str) -> Result<Vec<f64>, AdasError> {
    split_tokens(text).map(parse_fortran_float).collect()
}

/// Decode a fixed-width integer field, surrounding blanks allowed.
pub fn parse_int(field: &str) -> Result<i64, AdasError> {
    let trimmed = field.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| AdasError::MalformedNumber(trimmed.to_string()))
}

/// Decode a fixed-width count field (non negative integer).
pub fn parse_count(field: &str) -> Result<usize, AdasError> {
    let trimmed = field.trim();
    trimmed
        .parse::<usize>()
        .map_err(|_| AdasError::MalformedNumber(trimmed.to_string()))
}

/// Decode a header annotation value, trying integer, then float, then text.
///
/// Never fails: a token that is neither an integer nor a float is returned as trimmed text.
pub fn auto_decode(token: &str) -> AttrValue {
    let trimmed = token.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        AttrValue::Integer(i)
    } else if let Ok(x) = trimmed.parse::<f64>() {
        AttrValue::Float(x)
    } else {
        AttrValue::Text(trimmed.to_string())
    }
}

/// Compose a spectroscopic term label from its three fixed-width fields.
///
/// Arguments
/// -----------------
/// * `spin`: the spin multiplicity field (`2S+1`), copied trimmed
/// * `orbital`: the orbital angular momentum code `L`, mapped to `S P D F G H I J K L M N`
/// * `total_j`: the total angular momentum field, copied trimmed
///
/// Return
/// ----------
/// * The label, e.g. `term_symbol("3", "1", " 4.0")` → `"3P4.0"`
/// * [`AdasError::MalformedNumber`] if `orbital` is not an integer,
///   [`AdasError::InvalidOrbitalCode`] if it is outside the letter sequence.
pub fn term_symbol(spin: &str, orbital: &str, total_j: &str) -> Result<String, AdasError> {
    let code = parse_int(orbital)?;
    let letter = usize::try_from(code)
        .ok()
        .and_then(|l| ORBITAL_LETTERS.chars().nth(l))
        .ok_or_else(|| AdasError::InvalidOrbitalCode(orbital.trim().to_string()))?;
    Ok(format!("{}{}{}", spin.trim(), letter, total_j.trim()))
}

fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_until("="), char('='), rest).parse(input)
}

/// Decode one `key = value` annotation of a block header.
///
/// The key is trimmed, the value goes through [`auto_decode`].
pub fn parse_annotation(item: &str) -> Result<(String, AttrValue), AdasError> {
    let (_, (key, value)) =
        key_value(item).map_err(|_| AdasError::MalformedHeader(item.trim().to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AdasError::MalformedHeader(item.trim().to_string()));
    }
    Ok((key.to_string(), auto_decode(value)))
}

fn after_marker<'a>(input: &'a str, marker: &str) -> IResult<&'a str, &'a str> {
    preceded(take_until(marker), tag(marker)).parse(input)
}

/// Return the text following the first occurrence of `marker` in `line`.
pub fn text_after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    after_marker(line, marker).ok().map(|(remaining, _)| remaining)
}
