use crate::error::DashboardError;
use crate::table::BookingTable;
use crate::types::{BookingRecord, RawRow, REQUIRED_COLUMNS};
use crate::util::{parse_f64_safe, parse_flag_safe, parse_i32_safe, parse_month_safe, text_or};
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Read the booking CSV at `path` and derive the per-row totals.
///
/// A missing file or a header without the required columns aborts the load,
/// as does a negative rate or night count. Rows whose fields simply cannot be
/// parsed are skipped and counted in the report.
pub fn load_bookings(path: &Path) -> Result<(BookingTable, LoadReport), DashboardError> {
    let shown = path.display().to_string();
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(|e| DashboardError::DataLoad {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

    let headers = rdr.headers().map_err(|e| DashboardError::DataLoad {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DashboardError::DataLoad {
            path: shown,
            reason: "file has no header row".to_string(),
        });
    }
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumns {
            path: shown,
            columns: missing,
        });
    }

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<BookingRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        // Header is line 1.
        let line = total_rows as u64 + 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("line {}: {}", line, e);
                parse_errors += 1;
                continue;
            }
        };
        match build_record(row, line)? {
            Some(record) => records.push(record),
            None => parse_errors += 1,
        }
    }

    if parse_errors > 0 {
        warn!("{}: skipped {} unparsable rows", shown, parse_errors);
    }
    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
    };
    info!("{}: loaded {} of {} rows", shown, report.loaded_rows, report.total_rows);
    Ok((BookingTable::new(records), report))
}

/// `Ok(None)` means the row is unusable but harmless; `Err` means the row
/// parses yet breaks a data invariant.
fn build_record(row: RawRow, line: u64) -> Result<Option<BookingRecord>, DashboardError> {
    let Some(arrival_year) = parse_i32_safe(row.arrival_date_year.as_deref()) else {
        return Ok(None);
    };
    let Some(arrival_month) = parse_month_safe(row.arrival_date_month.as_deref()) else {
        return Ok(None);
    };
    let Some(is_canceled) = parse_flag_safe(row.is_canceled.as_deref()) else {
        return Ok(None);
    };
    let Some(weekend) = parse_i32_safe(row.stays_in_weekend_nights.as_deref()) else {
        return Ok(None);
    };
    let Some(week) = parse_i32_safe(row.stays_in_week_nights.as_deref()) else {
        return Ok(None);
    };
    let Some(adr) = parse_f64_safe(row.adr.as_deref()) else {
        return Ok(None);
    };

    let weekend_nights = non_negative_nights(weekend, "stays_in_weekend_nights", line)?;
    let week_nights = non_negative_nights(week, "stays_in_week_nights", line)?;
    if adr < 0.0 {
        return Err(DashboardError::DataIntegrity {
            line,
            field: "adr",
            value: adr.to_string(),
        });
    }

    Ok(Some(BookingRecord {
        hotel: text_or(row.hotel, "Unknown"),
        is_canceled,
        country: text_or(row.country, "Unknown"),
        market_segment: text_or(row.market_segment, "Undefined"),
        distribution_channel: text_or(row.distribution_channel, "Undefined"),
        reserved_room_type: text_or(row.reserved_room_type, "Unknown"),
        assigned_room_type: text_or(row.assigned_room_type, "Unknown"),
        reservation_status: text_or(row.reservation_status, "Unknown"),
        ..BookingRecord::new(arrival_year, arrival_month, weekend_nights, week_nights, adr)
    }))
}

fn non_negative_nights(n: i32, field: &'static str, line: u64) -> Result<u32, DashboardError> {
    u32::try_from(n).map_err(|_| DashboardError::DataIntegrity {
        line,
        field,
        value: n.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Month;
    use std::fs;
    use std::path::PathBuf;

    pub(crate) const HEADER: &str = "hotel,is_canceled,arrival_date_year,arrival_date_month,stays_in_weekend_nights,stays_in_week_nights,adr,country,market_segment,distribution_channel,reserved_room_type,assigned_room_type,reservation_status";

    /// Write `contents` to a fresh file under the system temp dir.
    pub(crate) fn fixture(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hotel_dashboard_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn derives_nights_and_revenue() {
        let csv = format!(
            "{HEADER}\n\
             A,0,2016,July,1,1,100,PRT,Direct,Direct,A,A,Check-Out\n\
             A,0,2016,July,0,2,50,GBR,Direct,Direct,A,C,Check-Out\n\
             B,1,2015,December,2,0,200,ESP,Groups,TA/TO,D,D,Canceled\n"
        );
        let path = fixture("derives.csv", &csv);
        let (table, report) = load_bookings(&path).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.loaded_rows, 3);
        assert_eq!(report.parse_errors, 0);

        let nights: Vec<u32> = table.records().iter().map(|r| r.total_nights).collect();
        let revenue: Vec<f64> = table.records().iter().map(|r| r.total_revenue).collect();
        assert_eq!(nights, vec![2, 2, 2]);
        assert_eq!(revenue, vec![200.0, 100.0, 400.0]);

        let last = &table.records()[2];
        assert!(last.is_canceled);
        assert_eq!(last.arrival_month, Month::December);
        assert!(table.records()[1].room_mismatch());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_bookings(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::DataLoad { .. }));
    }

    #[test]
    fn missing_columns_are_listed() {
        let path = fixture("missing.csv", "hotel,adr\nA,10\n");
        match load_bookings(&path).unwrap_err() {
            DashboardError::MissingColumns { columns, .. } => {
                assert!(columns.contains(&"arrival_date_year".to_string()));
                assert!(!columns.contains(&"hotel".to_string()));
                assert_eq!(columns.len(), REQUIRED_COLUMNS.len() - 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_rate_breaks_integrity() {
        let csv = format!(
            "{HEADER}\n\
             A,0,2016,July,1,1,100,PRT,Direct,Direct,A,A,Check-Out\n\
             A,0,2016,July,1,1,-5,PRT,Direct,Direct,A,A,Check-Out\n"
        );
        let path = fixture("negative_adr.csv", &csv);
        match load_bookings(&path).unwrap_err() {
            DashboardError::DataIntegrity { line, field, .. } => {
                assert_eq!(line, 3);
                assert_eq!(field, "adr");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_nights_break_integrity() {
        let csv = format!("{HEADER}\nA,0,2016,July,-1,1,100,PRT,Direct,Direct,A,A,Check-Out\n");
        let path = fixture("negative_nights.csv", &csv);
        let err = load_bookings(&path).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::DataIntegrity {
                field: "stays_in_weekend_nights",
                ..
            }
        ));
    }

    #[test]
    fn unparsable_rows_are_skipped_and_counted() {
        let csv = format!(
            "{HEADER}\n\
             A,0,2016,Juvember,1,1,100,PRT,Direct,Direct,A,A,Check-Out\n\
             A,0,twenty,July,1,1,100,PRT,Direct,Direct,A,A,Check-Out\n\
             A,0,2016,July,1,1,100,,Direct,Direct,A,A,Check-Out\n"
        );
        let path = fixture("skips.csv", &csv);
        let (table, report) = load_bookings(&path).unwrap();
        assert_eq!(report.parse_errors, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].country, "Unknown");
    }

    #[test]
    fn padded_headers_still_deserialize() {
        let padded = HEADER.replace(',', ", ");
        let csv = format!(
            "{padded}\n\
             A,0,2016,July,1,1,100,PRT,Direct,Direct,A,A,Check-Out\n\
             B,0,2015,May,2,0,80,ESP,Groups,TA/TO,A,A,Check-Out\n"
        );
        let path = fixture("padded_headers.csv", &csv);
        let (table, report) = load_bookings(&path).unwrap();
        assert_eq!(report.parse_errors, 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].hotel, "B");
        assert_eq!(table.records()[1].total_revenue, 160.0);
    }

    #[test]
    fn empty_file_is_a_load_error() {
        let path = fixture("empty.csv", "");
        assert!(matches!(
            load_bookings(&path).unwrap_err(),
            DashboardError::DataLoad { .. }
        ));
    }
}
