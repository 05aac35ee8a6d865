// Turns a dashboard snapshot into printable tables and exported chart data.
// No figures are computed here beyond labels, percentages and bar lengths.
use crate::aggregate::{Group, Share};
use crate::error::DashboardError;
use crate::metrics::{format_avg_nights, format_avg_rate, format_count, format_revenue, Summary};
use crate::output::{preview_table, write_csv, write_json};
use crate::session::DashboardSnapshot;
use crate::types::{
    CancellationRow, ChannelMismatchRow, CountryRow, HotelShareRow, KpiRow, SegmentRow, TrendRow,
};
use crate::util::{format_number, text_bar};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

const BAR_WIDTH: usize = 30;

fn max_value<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.copied().fold(0.0, f64::max)
}

pub fn kpi_rows(summary: &Summary) -> Vec<KpiRow> {
    vec![
        KpiRow {
            metric: "Total Bookings".to_string(),
            value: format_count(summary.count),
        },
        KpiRow {
            metric: "Total Revenue".to_string(),
            value: format_revenue(summary.total_revenue),
        },
        KpiRow {
            metric: "Avg. Nights Stayed".to_string(),
            value: format_avg_nights(summary.avg_nights),
        },
        KpiRow {
            metric: "Avg. Daily Rate".to_string(),
            value: format_avg_rate(summary.avg_daily_rate),
        },
    ]
}

pub fn trend_rows(snap: &DashboardSnapshot) -> Vec<TrendRow> {
    let max = max_value(snap.trend.iter().map(|p| &p.value));
    snap.trend
        .iter()
        .map(|p| TrendRow {
            period: p.period(),
            value: snap.measure.format_value(p.value),
            bar: text_bar(p.value, max, BAR_WIDTH),
        })
        .collect()
}

pub fn hotel_rows(snap: &DashboardSnapshot) -> Vec<HotelShareRow> {
    snap.hotels
        .iter()
        .map(|s| HotelShareRow {
            hotel: s.label.clone(),
            value: snap.measure.format_value(s.value),
            share_pct: format_number(s.share_pct, 1),
            bar: text_bar(s.share_pct, 100.0, BAR_WIDTH),
        })
        .collect()
}

pub fn country_rows(snap: &DashboardSnapshot) -> Vec<CountryRow> {
    let max = max_value(snap.countries.iter().map(|g| &g.value));
    snap.countries
        .iter()
        .enumerate()
        .map(|(i, g)| CountryRow {
            rank: i + 1,
            country: g.keys[0].clone(),
            value: snap.measure.format_value(g.value),
            bar: text_bar(g.value, max, BAR_WIDTH),
        })
        .collect()
}

/// Bars are scaled against the largest segment total so the stacked
/// pieces of one segment add up visually.
pub fn segment_rows(snap: &DashboardSnapshot) -> Vec<SegmentRow> {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    for g in &snap.segments {
        match totals.iter_mut().find(|(seg, _)| *seg == g.keys[0]) {
            Some((_, t)) => *t += g.value,
            None => totals.push((g.keys[0].as_str(), g.value)),
        }
    }
    let max = max_value(totals.iter().map(|(_, t)| t));
    snap.segments
        .iter()
        .map(|g| SegmentRow {
            market_segment: g.keys[0].clone(),
            hotel: g.keys[1].clone(),
            value: snap.measure.format_value(g.value),
            bar: text_bar(g.value, max, BAR_WIDTH),
        })
        .collect()
}

pub fn mismatch_rows(groups: &[Group]) -> Vec<ChannelMismatchRow> {
    groups
        .iter()
        .map(|g| ChannelMismatchRow {
            distribution_channel: g.keys[0].clone(),
            mismatches: format_number(g.value, 0),
        })
        .collect()
}

pub fn cancellation_rows(shares: &[Share]) -> Vec<CancellationRow> {
    shares
        .iter()
        .map(|s| CancellationRow {
            status: s.label.clone(),
            bookings: format_number(s.value, 0),
            share_pct: format_number(s.share_pct, 1),
        })
        .collect()
}

pub fn print_dashboard(snap: &DashboardSnapshot, max_rows: usize) {
    let metric = snap.measure.label();
    println!("Hotel Booking Dashboard");
    println!("(Filters: {})\n", snap.criteria.describe());

    preview_table("Key Performance Indicators", None, &kpi_rows(&snap.summary), 4);
    preview_table(
        &format!("{} Over Time", metric),
        Some("monthly, oldest first"),
        &trend_rows(snap),
        max_rows,
    );
    preview_table(
        &format!("Hotel Distribution by {}", metric),
        None,
        &hotel_rows(snap),
        max_rows,
    );
    preview_table(
        &format!("Top {} Countries by {}", snap.countries.len(), metric),
        None,
        &country_rows(snap),
        max_rows,
    );
    preview_table(
        &format!("Market Segments by Hotel and {}", metric),
        Some("stacked by hotel"),
        &segment_rows(snap),
        max_rows,
    );
    preview_table(
        "Room Type Mismatches by Distribution Channel",
        Some("assigned room differs from reserved room"),
        &mismatch_rows(&snap.room_mismatches),
        max_rows,
    );
    preview_table(
        "Cancellation Status",
        None,
        &cancellation_rows(&snap.cancellations),
        max_rows,
    );
}

/// Write one CSV per panel plus a JSON snapshot into `dir`.
pub fn export(snap: &DashboardSnapshot, dir: &Path) -> Result<Vec<PathBuf>, DashboardError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let mut out = |name: &str| {
        let p = dir.join(name);
        written.push(p.clone());
        p
    };
    write_csv(&out("kpis.csv"), &kpi_rows(&snap.summary))?;
    write_csv(&out("monthly_trend.csv"), &trend_rows(snap))?;
    write_csv(&out("hotel_distribution.csv"), &hotel_rows(snap))?;
    write_csv(&out("top_countries.csv"), &country_rows(snap))?;
    write_csv(&out("market_segments.csv"), &segment_rows(snap))?;
    write_csv(&out("room_mismatches.csv"), &mismatch_rows(&snap.room_mismatches))?;
    write_csv(&out("cancellations.csv"), &cancellation_rows(&snap.cancellations))?;
    write_json(&out("snapshot.json"), snap)?;

    info!("exported {} files to {}", written.len(), dir.display());
    Ok(written)
}
