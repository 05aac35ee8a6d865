// Group-and-reduce over a filtered set of bookings, plus the fixed
// aggregations each dashboard panel is built from.
use crate::types::BookingRecord;
use crate::util::{format_number, parse_month_safe};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// The dashboard's metric toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    #[default]
    Revenue,
    Bookings,
    /// Room nights sold.
    Nights,
}

impl Measure {
    pub fn reducer(self) -> Reducer {
        match self {
            Measure::Revenue => Reducer::Sum(NumericColumn::TotalRevenue),
            Measure::Bookings => Reducer::Count,
            Measure::Nights => Reducer::Sum(NumericColumn::TotalNights),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Measure::Revenue => "Revenue",
            Measure::Bookings => "Booking",
            Measure::Nights => "Room Nights",
        }
    }

    pub fn format_value(self, v: f64) -> String {
        match self {
            Measure::Revenue => format!("€ {}", format_number(v, 2)),
            Measure::Bookings | Measure::Nights => format_number(v, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    TotalRevenue,
    TotalNights,
}

impl NumericColumn {
    fn value(self, r: &BookingRecord) -> f64 {
        match self {
            NumericColumn::TotalRevenue => r.total_revenue,
            NumericColumn::TotalNights => r.total_nights as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum(NumericColumn),
    /// Rows per group, whatever the measure column holds.
    Count,
}

impl Reducer {
    fn contribution(self, r: &BookingRecord) -> f64 {
        match self {
            Reducer::Sum(col) => col.value(r),
            Reducer::Count => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Year,
    Month,
    Hotel,
    Country,
    MarketSegment,
    DistributionChannel,
    /// `"1"` for cancelled bookings, `"0"` otherwise.
    Cancellation,
}

impl GroupKey {
    fn value(self, r: &BookingRecord) -> String {
        match self {
            GroupKey::Year => r.arrival_year.to_string(),
            GroupKey::Month => r.arrival_month.name().to_string(),
            GroupKey::Hotel => r.hotel.clone(),
            GroupKey::Country => r.country.clone(),
            GroupKey::MarketSegment => r.market_segment.clone(),
            GroupKey::DistributionChannel => r.distribution_channel.clone(),
            GroupKey::Cancellation => (if r.is_canceled { "1" } else { "0" }).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub keys: Vec<String>,
    pub value: f64,
    /// Number of rows that fell into the group.
    pub rows: usize,
}

/// Group `rows` by `keys` and reduce each group. Groups come back in the
/// order their first row was seen.
pub fn aggregate(rows: &[&BookingRecord], keys: &[GroupKey], reducer: Reducer) -> Vec<Group> {
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for r in rows {
        let key: Vec<String> = keys.iter().map(|k| k.value(r)).collect();
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    keys: key,
                    value: 0.0,
                    rows: 0,
                });
                groups.len() - 1
            }
        };
        let g = &mut groups[slot];
        g.rows += 1;
        g.value += reducer.contribution(r);
    }
    groups
}

fn descending(groups: &mut [Group]) {
    // `sort_by` is stable, so ties keep encounter order.
    groups.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
}

fn by_keys(groups: &mut [Group]) {
    groups.sort_by(|a, b| a.keys.cmp(&b.keys));
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

impl TrendPoint {
    pub fn period(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

/// Measure per arrival month, oldest first.
pub fn monthly_trend(rows: &[&BookingRecord], measure: Measure) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = aggregate(rows, &[GroupKey::Year, GroupKey::Month], measure.reducer())
        .into_iter()
        .filter_map(|g| {
            let year = g.keys[0].parse::<i32>().ok()?;
            let month = parse_month_safe(Some(g.keys[1].as_str()))?.number_from_month();
            Some(TrendPoint {
                year,
                month,
                value: g.value,
            })
        })
        .collect();
    points.sort_by_key(|p| (p.year, p.month));
    points
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub value: f64,
    pub share_pct: f64,
}

fn shares(groups: Vec<Group>, label: impl Fn(&str) -> String) -> Vec<Share> {
    let total: f64 = groups.iter().map(|g| g.value).sum();
    groups
        .into_iter()
        .map(|g| Share {
            label: label(&g.keys[0]),
            value: g.value,
            share_pct: if total > 0.0 { g.value / total * 100.0 } else { 0.0 },
        })
        .collect()
}

/// Donut data: measure per hotel type, sorted by hotel name.
pub fn hotel_distribution(rows: &[&BookingRecord], measure: Measure) -> Vec<Share> {
    let mut groups = aggregate(rows, &[GroupKey::Hotel], measure.reducer());
    by_keys(&mut groups);
    shares(groups, str::to_string)
}

/// The `n` countries with the largest measure.
pub fn top_countries(rows: &[&BookingRecord], measure: Measure, n: usize) -> Vec<Group> {
    let mut groups = aggregate(rows, &[GroupKey::Country], measure.reducer());
    descending(&mut groups);
    groups.truncate(n);
    groups
}

/// Stacked bar data: one group per (market segment, hotel) pair.
pub fn segment_by_hotel(rows: &[&BookingRecord], measure: Measure) -> Vec<Group> {
    let mut groups = aggregate(
        rows,
        &[GroupKey::MarketSegment, GroupKey::Hotel],
        measure.reducer(),
    );
    by_keys(&mut groups);
    groups
}

/// Bookings whose assigned room differs from the reserved one, per channel.
pub fn room_mismatch_by_channel(rows: &[&BookingRecord]) -> Vec<Group> {
    let mismatched: Vec<&BookingRecord> = rows.iter().copied().filter(|r| r.room_mismatch()).collect();
    let mut groups = aggregate(&mismatched, &[GroupKey::DistributionChannel], Reducer::Count);
    descending(&mut groups);
    groups
}

pub fn cancellation_counts(rows: &[&BookingRecord]) -> Vec<Share> {
    let mut groups = aggregate(rows, &[GroupKey::Cancellation], Reducer::Count);
    by_keys(&mut groups);
    shares(groups, |k| {
        let label = if k == "1" { "Canceled" } else { "Not Canceled" };
        label.to_string()
    })
}
