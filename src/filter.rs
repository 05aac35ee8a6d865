use crate::error::DashboardError;
use crate::table::FilterOptions;
use crate::types::{BookingRecord, CANCELED_STATUS};
use serde::{Deserialize, Serialize};

/// How cancelled bookings are treated. The status check looks at
/// `reservation_status`, the flag check at `is_canceled`; they can disagree
/// on dirty data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationFilter {
    Keep,
    #[default]
    ExcludeByStatus,
    ExcludeByFlag,
}

impl CancellationFilter {
    fn keeps(self, r: &BookingRecord) -> bool {
        match self {
            CancellationFilter::Keep => true,
            CancellationFilter::ExcludeByStatus => r.reservation_status != CANCELED_STATUS,
            CancellationFilter::ExcludeByFlag => !r.is_canceled,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CancellationFilter::Keep => "include cancelled",
            CancellationFilter::ExcludeByStatus => "exclude cancelled (status)",
            CancellationFilter::ExcludeByFlag => "exclude cancelled (flag)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub year_min: i32,
    pub year_max: i32,
    pub hotel: Option<String>,
    pub market_segment: Option<String>,
    pub cancellation: CancellationFilter,
}

impl FilterCriteria {
    /// Everything the table covers, nothing narrowed.
    pub fn full_range(options: &FilterOptions, cancellation: CancellationFilter) -> Self {
        FilterCriteria {
            year_min: options.year_min,
            year_max: options.year_max,
            hotel: None,
            market_segment: None,
            cancellation,
        }
    }

    pub fn matches(&self, r: &BookingRecord) -> bool {
        (self.year_min..=self.year_max).contains(&r.arrival_year)
            && self.hotel.as_deref().map_or(true, |h| r.hotel == h)
            && self
                .market_segment
                .as_deref()
                .map_or(true, |s| r.market_segment == s)
            && self.cancellation.keeps(r)
    }

    /// Select the matching rows, keeping their order. An empty result is
    /// not an error.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<&'a BookingRecord>
    where
        I: IntoIterator<Item = &'a BookingRecord>,
    {
        rows.into_iter().filter(|r| self.matches(r)).collect()
    }

    pub fn validate(&self, options: &FilterOptions) -> Result<(), DashboardError> {
        if self.year_min > self.year_max
            || self.year_min < options.year_min
            || self.year_max > options.year_max
        {
            return Err(DashboardError::InvalidYearRange {
                min: self.year_min,
                max: self.year_max,
                lo: options.year_min,
                hi: options.year_max,
            });
        }
        if let Some(h) = &self.hotel {
            if !options.has_hotel(h) {
                return Err(DashboardError::InvalidFilterValue {
                    dimension: "hotel",
                    value: h.clone(),
                });
            }
        }
        if let Some(s) = &self.market_segment {
            if !options.has_market_segment(s) {
                return Err(DashboardError::InvalidFilterValue {
                    dimension: "market segment",
                    value: s.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        format!(
            "{}-{}, hotel: {}, segment: {}, {}",
            self.year_min,
            self.year_max,
            self.hotel.as_deref().unwrap_or("All"),
            self.market_segment.as_deref().unwrap_or("All"),
            self.cancellation.label()
        )
    }
}
