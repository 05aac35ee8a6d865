use crate::error::DashboardError;
use crate::types::ExportRow;
use csv::WriterBuilder;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// The header comes from `T::COLUMNS`, so an empty panel still exports one line.
pub fn write_csv<T: ExportRow>(path: &Path, rows: &[T]) -> Result<(), DashboardError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(T::COLUMNS)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DashboardError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of at most `max_rows` rows, or `(no rows)`.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("### {}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}", render_table(rows, max_rows));
    if rows.len() > max_rows {
        println!("... {} more rows", rows.len() - max_rows);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::fixture;
    use crate::types::{
        CancellationRow, ChannelMismatchRow, CountryRow, HotelShareRow, KpiRow, SegmentRow,
        TrendRow,
    };

    fn kpi(metric: &str, value: &str) -> KpiRow {
        KpiRow {
            metric: metric.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn empty_table_renders_placeholder() {
        let rows: Vec<KpiRow> = Vec::new();
        assert_eq!(render_table(&rows, 5), "(no rows)");
    }

    #[test]
    fn table_is_truncated_to_max_rows() {
        let rows = vec![kpi("a", "1"), kpi("b", "2"), kpi("c", "3")];
        let out = render_table(&rows, 2);
        assert!(out.contains("| Metric"));
        assert!(out.contains("| b"));
        assert!(!out.contains("| c"));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let path = fixture("kpi_out.csv", "");
        write_csv(&path, &[kpi("Total Bookings", "3")]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Metric,Value\nTotal Bookings,3\n");
    }

    #[test]
    fn empty_csv_still_has_header() {
        let path = fixture("empty_out.csv", "");
        write_csv::<KpiRow>(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Metric,Value\n");
    }

    #[test]
    fn declared_columns_match_serialized_header() {
        fn header_of<T: ExportRow>(row: T) -> String {
            let path = fixture("header_check.csv", "");
            write_csv(&path, &[row]).unwrap();
            let text = std::fs::read_to_string(&path).unwrap();
            let mut rdr = csv::Reader::from_reader(text.as_bytes());
            let first = rdr.records().next().unwrap().unwrap();
            assert_eq!(first.len(), T::COLUMNS.len());
            text.lines().next().unwrap().to_string()
        }
        let s = || "x".to_string();
        assert_eq!(header_of(kpi("a", "1")), "Metric,Value");
        assert_eq!(
            header_of(TrendRow { period: s(), value: s(), bar: s() }),
            "Month,Value"
        );
        assert_eq!(
            header_of(HotelShareRow { hotel: s(), value: s(), share_pct: s(), bar: s() }),
            "Hotel,Value,SharePct"
        );
        assert_eq!(
            header_of(CountryRow { rank: 1, country: s(), value: s(), bar: s() }),
            "Rank,Country,Value"
        );
        assert_eq!(
            header_of(SegmentRow { market_segment: s(), hotel: s(), value: s(), bar: s() }),
            "MarketSegment,Hotel,Value"
        );
        assert_eq!(
            header_of(ChannelMismatchRow { distribution_channel: s(), mismatches: s() }),
            "DistributionChannel,RoomMismatches"
        );
        assert_eq!(
            header_of(CancellationRow { status: s(), bookings: s(), share_pct: s() }),
            "Status,Bookings,SharePct"
        );
    }
}
