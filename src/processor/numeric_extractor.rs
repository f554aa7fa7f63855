//! Text-to-number extraction for price and discount cells.
//!
//! Cells arrive as free text ("3,900", "20% off", "Rs. 499", "N/A"). The
//! extractor never fails: anything it cannot read becomes `None`.
//!
//! Rule for the numeric run:
//! - a run is a maximal sequence of ASCII digits and `.`
//! - runs without any digit are skipped (the `.` in "Rs." is not a number)
//! - the first remaining run is cut before its second `.` and parsed
//!   ("1.2.3" reads as 1.2, "12." as 12.0, ".5" as 0.5)
//! - a non-finite parse result is treated as missing

use anyhow::Result;
use polars::prelude::*;

#[inline]
fn is_run_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.'
}

/// Returns the first numeric run in `text` that contains at least one digit.
pub fn first_numeric_run(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if !is_run_byte(bytes[i]) {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && is_run_byte(bytes[i]) {
            i += 1;
        }

        // Run bytes are ASCII, so both ends sit on char boundaries.
        let run = &text[start..i];
        if run.bytes().any(|b| b.is_ascii_digit()) {
            return Some(run);
        }
    }

    None
}

fn parse_run(run: &str) -> Option<f64> {
    let end = run
        .match_indices('.')
        .nth(1)
        .map(|(idx, _)| idx)
        .unwrap_or(run.len());

    run[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// First numeric run of `text`, parsed as `f64`.
pub fn extract_first_number(text: &str) -> Option<f64> {
    first_numeric_run(text).and_then(parse_run)
}

/// Like [`extract_first_number`] but drops thousands separators first.
pub fn extract_price(text: &str) -> Option<f64> {
    extract_first_number(&text.replace(',', ""))
}

/// Whole-cell parse: the trimmed text must be a finite number.
pub fn parse_strict_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads `col_name` and maps every present text cell through `extract`.
/// Numeric columns are taken as `f64` directly, with non-finite values
/// treated as missing. Missing cells stay missing.
pub fn extract_column<F>(df: &DataFrame, col_name: &str, extract: F) -> Result<Vec<Option<f64>>>
where
    F: Fn(&str) -> Option<f64>,
{
    let column = df.column(col_name)?;

    if column.dtype().is_numeric() {
        let values = column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        return Ok(values);
    }

    let column = column.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|cell| cell.and_then(&extract))
        .collect();

    Ok(values)
}
