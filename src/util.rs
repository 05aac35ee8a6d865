// Utility helpers for parsing and number formatting.
//
// CSV exports of the booking data are not always clean, so every raw field
// goes through one of the forgiving parsers below before the rest of the
// code sees it.
use chrono::Month;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64`.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Some exports write integer columns as `2.0`.
    s.parse::<i32>()
        .ok()
        .or_else(|| match s.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 => Some(v as i32),
            _ => None,
        })
}

/// The cancellation column is a 0/1 integer in the source data, but
/// `true`/`false` shows up in re-exported files too.
pub fn parse_flag_safe(s: Option<&str>) -> Option<bool> {
    match s?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Month names as written by the booking system ("July", "december", "Sep").
pub fn parse_month_safe(s: Option<&str>) -> Option<Month> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<Month>().ok()
}

/// Fill an `Option<String>` column with a placeholder and trim it.
pub fn text_or(s: Option<String>, fallback: &str) -> String {
    match s {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

/// Arithmetic mean. An empty slice has no mean, so the caller gets `None`
/// instead of a NaN.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus locale-aware thousands separators
    // (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
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

/// Horizontal text bar scaled against `max`, used in place of chart marks.
pub fn text_bar(value: f64, max: f64, width: usize) -> String {
    if !(max > 0.0) || !(value > 0.0) {
        return String::new();
    }
    let len = ((value / max) * width as f64).round() as usize;
    "█".repeat(len.clamp(1, width))
}
