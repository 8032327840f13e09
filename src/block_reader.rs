//! # Block reader
//!
//! ADAS files store each numeric list of a block wrapped over as many lines as needed, the
//! number of values per line depending on the producing code. [`LineCursor`] walks a flat line
//! sequence and gathers such lists until the count declared in the block header is reached.
//!
//! ## Over-collection
//! -----------------
//! A list may end in the middle of a line, in which case the trailing values on that line belong
//! to the next field of the block. [`LineCursor::collect_values`] returns everything it read
//! (possibly more than requested); [`LineCursor::take_values`] returns exactly the declared count
//! and keeps the surplus pending for the next call. [`LineCursor::finish_block`] rejects a block
//! that ends with unclaimed values.
use std::collections::VecDeque;

use crate::{adas_errors::AdasError, conversion::parse_fortran_float};

/// Cursor over the lines of one ADAS file.
///
/// The cursor owns no text: it borrows the lines for the duration of one parse call.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    lines: &'a [&'a str],
    position: usize,
    pending: VecDeque<f64>,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [&'a str]) -> Self {
        LineCursor {
            lines,
            position: 0,
            pending: VecDeque::new(),
        }
    }

    /// Index of the next line to be consumed.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.lines.len()
    }

    /// Number of lines left to consume.
    pub fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.position)
    }

    /// Look at the next line without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.peek_at(0)
    }

    /// Look `offset` lines ahead of the cursor without consuming anything.
    pub fn peek_at(&self, offset: usize) -> Option<&'a str> {
        self.lines.get(self.position + offset).copied()
    }

    /// Consume the next line.
    ///
    /// Arguments
    /// -----------------
    /// * `context`: what the caller expected to read, used in the error message
    ///
    /// Return
    /// ----------
    /// * The line, or [`AdasError::TruncatedBlock`] if the stream is exhausted.
    pub fn next_line(&mut self, context: &str) -> Result<&'a str, AdasError> {
        let line = self.peek().ok_or_else(|| {
            AdasError::TruncatedBlock(format!("{context} (line {})", self.position + 1))
        })?;
        self.position += 1;
        Ok(line)
    }

    /// Skip `count` lines, failing if fewer remain.
    pub fn skip(&mut self, count: usize, context: &str) -> Result<(), AdasError> {
        if self.remaining() < count {
            return Err(AdasError::TruncatedBlock(format!(
                "{context}: {count} lines to skip, {} left",
                self.remaining()
            )));
        }
        self.position += count;
        Ok(())
    }

    /// Move the cursor to an absolute line index (clamped to the end of the stream).
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.lines.len());
    }

    /// Find the first line at or after the cursor matching `predicate`, without consuming.
    ///
    /// Return
    /// ----------
    /// * The absolute index of the matching line, if any
    pub fn find<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(&str) -> bool,
    {
        self.lines[self.position.min(self.lines.len())..]
            .iter()
            .position(|line| predicate(line))
            .map(|offset| self.position + offset)
    }

    /// Gather at least `count` values, line by line.
    ///
    /// Values left pending by a previous [`LineCursor::take_values`] are used first. Each
    /// further line is split on whitespace and every token is decoded with
    /// [`parse_fortran_float`]. The whole accumulator is returned, which may exceed `count`
    /// when the list ends mid-line.
    ///
    /// Arguments
    /// -----------------
    /// * `count`: the declared number of values; `0` consumes nothing
    /// * `context`: a short description of the list for error messages
    ///
    /// Return
    /// ----------
    /// * The accumulator, or [`AdasError::TruncatedBlock`] if the stream ends first,
    ///   [`AdasError::MalformedNumber`] if a token does not decode.
    pub fn collect_values(&mut self, count: usize, context: &str) -> Result<Vec<f64>, AdasError> {
        let mut values: Vec<f64> = self.pending.drain(..).collect();
        while values.len() < count {
            let Some(line) = self.peek() else {
                return Err(AdasError::TruncatedBlock(format!(
                    "{context}: {count} values declared, {} found before end of input",
                    values.len()
                )));
            };
            self.position += 1;
            for token in line.split_whitespace() {
                values.push(parse_fortran_float(token)?);
            }
        }
        Ok(values)
    }

    /// Gather exactly `count` values, keeping any surplus for the next read.
    pub fn take_values(&mut self, count: usize, context: &str) -> Result<Vec<f64>, AdasError> {
        let mut values = self.collect_values(count, context)?;
        self.pending.extend(values.drain(count..));
        Ok(values)
    }

    /// Close the current block: no value may remain unclaimed.
    pub fn finish_block(&mut self, context: &str, declared: usize) -> Result<(), AdasError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let surplus = self.pending.len();
        self.pending.clear();
        Err(AdasError::BlockLengthMismatch {
            context: context.to_string(),
            expected: declared,
            found: declared + surplus,
        })
    }
}
