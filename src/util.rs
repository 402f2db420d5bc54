// Parsing and small numeric helpers.
//
// Everything that touches raw CSV text lives here so the loader and the
// engine can work with typed values only.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Date layouts accepted in the `Date` column, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A non-blank cell that does not hold the expected kind of value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unparseable;

/// Trim a cell and turn blank cells into `None`.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse a numeric cell, tolerating thousands separators and a trailing `%`.
///
/// `Ok(None)` means the cell is blank; `Err` means it has content that is
/// not a number.
pub fn parse_f64_cell(s: Option<&str>) -> Result<Option<f64>, Unparseable> {
    let Some(s) = non_blank(s) else {
        return Ok(None);
    };
    // Percentages arrive either as `87` or `87%`; both mean the same value.
    let s = s.trim_end_matches('%').replace(',', "");
    match s.trim().parse::<f64>() {
        // Rust parses `NaN` and `inf` happily; treat them as missing.
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(Unparseable),
    }
}

/// Parse a count cell. Integral floats such as `120.0` are accepted since
/// spreadsheet exports often write counts that way.
pub fn parse_count_cell(s: Option<&str>) -> Result<Option<u64>, Unparseable> {
    let Some(s) = non_blank(s) else {
        return Ok(None);
    };
    let s = s.replace(',', "");
    if let Ok(n) = s.parse::<u64>() {
        return Ok(Some(n));
    }
    // Fall back to a float parse. `NaN`/`inf` are how pandas exports write a
    // missing count, so they load as absent just like in `parse_f64_cell`.
    match s.parse::<f64>() {
        Ok(v) if !v.is_finite() => Ok(None),
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(Some(v as u64)),
        _ => Err(Unparseable),
    }
}

/// Parse a date cell using the first layout that fits. Date-time values keep
/// only their calendar date.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = non_blank(s)?;
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(v: &[f64]) -> Option<f64> {
    // No readings means no mean; callers drop the group instead of emitting
    // a zero or NaN.
    if v.is_empty() {
        return None;
    }
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

/// Quantile with linear interpolation between closest ranks. `sorted` must be
/// ascending and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    // Fractional rank into the sorted slice; interpolate between the two
    // neighbours it falls between.
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Fixed-decimal formatting with `en` thousands separators, e.g.
/// `1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // num-format only groups integers, so split off the fraction first.
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
