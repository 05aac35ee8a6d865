use crate::aggregate::{
    cancellation_counts, hotel_distribution, monthly_trend, room_mismatch_by_channel,
    segment_by_hotel, top_countries, Group, Measure, Share, TrendPoint,
};
use crate::cache::TableCache;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::filter::{CancellationFilter, FilterCriteria};
use crate::loader::LoadReport;
use crate::metrics::{summarize, Summary};
use crate::table::{BookingTable, FilterOptions};
use crate::types::BookingRecord;
use log::{info, warn};
use serde::Serialize;
use std::rc::Rc;

/// Everything one render of the dashboard needs.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub measure: Measure,
    pub criteria: FilterCriteria,
    pub summary: Summary,
    pub trend: Vec<TrendPoint>,
    pub hotels: Vec<Share>,
    pub countries: Vec<Group>,
    pub segments: Vec<Group>,
    pub room_mismatches: Vec<Group>,
    pub cancellations: Vec<Share>,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub report: LoadReport,
    pub from_cache: bool,
}

/// Per-user dashboard state: the loaded table, the current filter
/// selection and the metric toggle.
#[derive(Debug)]
pub struct Session {
    config: DashboardConfig,
    cache: TableCache,
    table: Option<Rc<BookingTable>>,
    criteria: Option<FilterCriteria>,
    measure: Measure,
}

impl Session {
    pub fn new(config: DashboardConfig) -> Self {
        let measure = config.measure;
        Session {
            config,
            cache: TableCache::new(),
            table: None,
            criteria: None,
            measure,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Load the configured file, reusing the cached table when the file has
    /// not changed. A selection that no longer fits the data is reset.
    pub fn load(&mut self) -> Result<LoadOutcome, DashboardError> {
        let cached = self.cache.get_or_load(&self.config.data_path)?;
        if cached.table.is_empty() {
            warn!("{} has no usable rows", self.config.data_path.display());
        }
        let options = cached.table.options().clone();
        let keep = self
            .criteria
            .as_ref()
            .is_some_and(|c| c.validate(&options).is_ok());
        if !keep {
            self.criteria = Some(FilterCriteria::full_range(&options, self.config.cancellation));
        }
        self.table = Some(cached.table);
        Ok(LoadOutcome {
            report: cached.report,
            from_cache: cached.hit,
        })
    }

    pub fn reload(&mut self) -> Result<LoadOutcome, DashboardError> {
        self.cache.invalidate();
        self.load()
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    pub fn options(&self) -> Result<&FilterOptions, DashboardError> {
        self.table
            .as_deref()
            .map(BookingTable::options)
            .ok_or(DashboardError::NoData)
    }

    pub fn criteria(&self) -> Result<&FilterCriteria, DashboardError> {
        self.criteria.as_ref().ok_or(DashboardError::NoData)
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn set_measure(&mut self, measure: Measure) {
        info!("metric set to {}", measure.label());
        self.measure = measure;
    }

    pub fn set_year_range(&mut self, min: i32, max: i32) -> Result<(), DashboardError> {
        self.update(|c| {
            c.year_min = min;
            c.year_max = max;
        })
    }

    /// `None` is the "All" choice.
    pub fn set_hotel(&mut self, hotel: Option<String>) -> Result<(), DashboardError> {
        self.update(|c| c.hotel = hotel)
    }

    pub fn set_market_segment(&mut self, segment: Option<String>) -> Result<(), DashboardError> {
        self.update(|c| c.market_segment = segment)
    }

    pub fn set_cancellation(&mut self, cancellation: CancellationFilter) -> Result<(), DashboardError> {
        self.update(|c| c.cancellation = cancellation)
    }

    /// Apply `change` to a copy of the selection and keep it only if the
    /// result is valid for the loaded data.
    fn update(&mut self, change: impl FnOnce(&mut FilterCriteria)) -> Result<(), DashboardError> {
        let options = self.options()?;
        let mut next = self.criteria()?.clone();
        change(&mut next);
        next.validate(options)?;
        info!("filters: {}", next.describe());
        self.criteria = Some(next);
        Ok(())
    }

    /// Run filter, metrics and every aggregation for the current selection.
    pub fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let table = self.table.as_deref().ok_or(DashboardError::NoData)?;
        let criteria = self.criteria()?.clone();
        let rows: Vec<&BookingRecord> = criteria.apply(table.records());
        let measure = self.measure;
        info!(
            "{} of {} bookings match ({})",
            rows.len(),
            table.len(),
            criteria.describe()
        );

        Ok(DashboardSnapshot {
            measure,
            summary: summarize(&rows),
            trend: monthly_trend(&rows, measure),
            hotels: hotel_distribution(&rows, measure),
            countries: top_countries(&rows, measure, self.config.top_countries),
            segments: segment_by_hotel(&rows, measure),
            room_mismatches: room_mismatch_by_channel(&rows),
            cancellations: cancellation_counts(&rows),
            criteria,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{fixture, HEADER};
    use std::fs;

    fn session_for(name: &str, body: &str) -> Session {
        let path = fixture(name, &format!("{HEADER}\n{body}"));
        Session::new(DashboardConfig {
            data_path: path,
            ..DashboardConfig::default()
        })
    }

    const ROWS: &str = "\
A,0,2016,July,1,1,100,PRT,Direct,Direct,A,A,Check-Out
A,0,2016,July,0,2,50,GBR,Online TA,TA/TO,A,B,Check-Out
B,0,2015,December,2,0,200,PRT,Online TA,TA/TO,C,C,Check-Out
B,1,2017,March,1,0,90,ESP,Groups,TA/TO,A,A,Canceled
";

    #[test]
    fn snapshot_before_load_is_no_data() {
        let s = Session::new(DashboardConfig::default());
        assert!(!s.is_loaded());
        assert!(matches!(s.snapshot(), Err(DashboardError::NoData)));
    }

    #[test]
    fn full_pipeline() {
        let mut s = session_for("session_full.csv", ROWS);
        let outcome = s.load().unwrap();
        assert_eq!(outcome.report.loaded_rows, 4);
        assert!(!outcome.from_cache);
        assert!(s.load().unwrap().from_cache);

        let snap = s.snapshot().unwrap();
        // The cancelled booking is excluded by default.
        assert_eq!(snap.summary.count, 3);
        assert_eq!(snap.summary.total_revenue, 700.0);
        assert_eq!(snap.summary.avg_nights, Some(2.0));

        let periods: Vec<String> = snap.trend.iter().map(TrendPoint::period).collect();
        assert_eq!(periods, vec!["2015-12", "2016-07"]);
        assert_eq!(snap.trend[1].value, 300.0);

        let hotels: Vec<(&str, f64)> = snap.hotels.iter().map(|h| (h.label.as_str(), h.value)).collect();
        assert_eq!(hotels, vec![("A", 300.0), ("B", 400.0)]);

        assert_eq!(snap.countries[0].keys, vec!["PRT".to_string()]);
        assert_eq!(snap.countries[0].value, 600.0);
        assert_eq!(snap.room_mismatches.len(), 1);
        assert_eq!(snap.cancellations.len(), 1);
        assert_eq!(snap.cancellations[0].label, "Not Canceled");
    }

    #[test]
    fn measure_toggle_switches_to_counts() {
        let mut s = session_for("session_measure.csv", ROWS);
        s.load().unwrap();
        s.set_measure(Measure::Bookings);
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.hotels[0].value, 2.0);
        assert_eq!(snap.countries[0].value, 2.0);
    }

    #[test]
    fn empty_selection_degrades_to_zeroes() {
        let mut s = session_for("session_empty.csv", ROWS);
        s.load().unwrap();
        s.set_year_range(2017, 2017).unwrap();
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.summary.count, 0);
        assert_eq!(snap.summary.total_revenue, 0.0);
        assert_eq!(snap.summary.avg_nights, None);
        assert!(snap.trend.is_empty());
        assert!(snap.countries.is_empty());
        assert!(snap.cancellations.is_empty());
    }

    #[test]
    fn invalid_updates_keep_previous_selection() {
        let mut s = session_for("session_invalid.csv", ROWS);
        s.load().unwrap();
        s.set_hotel(Some("B".to_string())).unwrap();
        assert!(s.set_hotel(Some("Motel".to_string())).is_err());
        assert!(s.set_year_range(2014, 2016).is_err());
        assert!(s.set_market_segment(Some("Corporate".to_string())).is_err());
        let c = s.criteria().unwrap();
        assert_eq!(c.hotel.as_deref(), Some("B"));
        assert_eq!((c.year_min, c.year_max), (2015, 2017));
    }

    #[test]
    fn cancellation_setting_changes_counts() {
        let mut s = session_for("session_cancel.csv", ROWS);
        s.load().unwrap();
        s.set_cancellation(CancellationFilter::Keep).unwrap();
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.summary.count, 4);
        let labels: Vec<&str> = snap.cancellations.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Not Canceled", "Canceled"]);
    }

    #[test]
    fn reload_resets_selection_that_no_longer_fits() {
        let mut s = session_for("session_reload.csv", ROWS);
        s.load().unwrap();
        s.set_hotel(Some("B".to_string())).unwrap();

        let path = s.config().data_path.clone();
        fs::write(
            &path,
            format!("{HEADER}\nA,0,2016,July,1,1,100,PRT,Direct,Direct,A,A,Check-Out\n"),
        )
        .unwrap();
        let outcome = s.reload().unwrap();
        assert!(!outcome.from_cache);
        let c = s.criteria().unwrap();
        assert_eq!(c.hotel, None);
        assert_eq!((c.year_min, c.year_max), (2016, 2016));
    }
}
