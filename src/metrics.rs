use crate::types::BookingRecord;
use crate::util::{format_int, format_number, mean};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total_revenue: f64,
    /// `None` when there are no rows to average over.
    pub avg_nights: Option<f64>,
    pub avg_daily_rate: Option<f64>,
}

pub fn summarize(rows: &[&BookingRecord]) -> Summary {
    let nights: Vec<f64> = rows.iter().map(|r| r.total_nights as f64).collect();
    let rates: Vec<f64> = rows.iter().map(|r| r.adr).collect();
    Summary {
        count: rows.len(),
        total_revenue: rows.iter().map(|r| r.total_revenue).sum(),
        avg_nights: mean(&nights),
        avg_daily_rate: mean(&rates),
    }
}

/// `€ 1,234.50` below a million, then `€ 2.50M`, then `€ 3.00B`.
pub fn format_revenue(v: f64) -> String {
    if v >= 1e9 {
        format!("€ {:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("€ {:.2}M", v / 1e6)
    } else {
        format!("€ {}", format_number(v, 2))
    }
}

pub fn format_avg_nights(v: Option<f64>) -> String {
    match v {
        Some(n) => format!("{} nights", n.round() as i64),
        None => "n/a".to_string(),
    }
}

pub fn format_avg_rate(v: Option<f64>) -> String {
    match v {
        Some(r) => format!("€ {}", format_number(r, 2)),
        None => "n/a".to_string(),
    }
}

pub fn format_count(n: usize) -> String {
    format_int(n as u64)
}
