use crate::types::BookingRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// Values the filter controls may offer, taken from the data itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub year_min: i32,
    pub year_max: i32,
    pub hotels: Vec<String>,
    pub market_segments: Vec<String>,
}

impl FilterOptions {
    fn from_records(records: &[BookingRecord]) -> Self {
        let mut year_min = i32::MAX;
        let mut year_max = i32::MIN;
        let mut hotels = BTreeSet::new();
        let mut segments = BTreeSet::new();
        for r in records {
            year_min = year_min.min(r.arrival_year);
            year_max = year_max.max(r.arrival_year);
            hotels.insert(r.hotel.as_str());
            segments.insert(r.market_segment.as_str());
        }
        if records.is_empty() {
            year_min = 0;
            year_max = 0;
        }
        FilterOptions {
            year_min,
            year_max,
            hotels: hotels.into_iter().map(str::to_string).collect(),
            market_segments: segments.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn has_hotel(&self, hotel: &str) -> bool {
        self.hotels.iter().any(|h| h == hotel)
    }

    pub fn has_market_segment(&self, segment: &str) -> bool {
        self.market_segments.iter().any(|s| s == segment)
    }
}

/// The loaded booking rows. Read-only once built; every pipeline stage
/// borrows from it.
#[derive(Debug, Clone)]
pub struct BookingTable {
    records: Vec<BookingRecord>,
    options: FilterOptions,
}

impl BookingTable {
    pub fn new(records: Vec<BookingRecord>) -> Self {
        let options = FilterOptions::from_records(&records);
        BookingTable { records, options }
    }

    pub fn records(&self) -> &[BookingRecord] {
        &self.records
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
