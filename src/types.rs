use chrono::Month;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Header names the loader insists on. Any other column in the file is
/// ignored.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "hotel",
    "is_canceled",
    "arrival_date_year",
    "arrival_date_month",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "adr",
    "country",
    "market_segment",
    "distribution_channel",
    "reserved_room_type",
    "assigned_room_type",
    "reservation_status",
];

/// Reservation status value that marks a cancelled booking.
pub const CANCELED_STATUS: &str = "Canceled";

#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub hotel: Option<String>,
    pub is_canceled: Option<String>,
    pub arrival_date_year: Option<String>,
    pub arrival_date_month: Option<String>,
    pub stays_in_weekend_nights: Option<String>,
    pub stays_in_week_nights: Option<String>,
    pub adr: Option<String>,
    pub country: Option<String>,
    pub market_segment: Option<String>,
    pub distribution_channel: Option<String>,
    pub reserved_room_type: Option<String>,
    pub assigned_room_type: Option<String>,
    pub reservation_status: Option<String>,
}

/// One reservation. `total_nights` and `total_revenue` are derived from the
/// row's own fields when the record is built and never touched afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub hotel: String,
    pub is_canceled: bool,
    pub arrival_year: i32,
    pub arrival_month: Month,
    pub adr: f64,
    pub country: String,
    pub market_segment: String,
    pub distribution_channel: String,
    pub reserved_room_type: String,
    pub assigned_room_type: String,
    pub reservation_status: String,
    pub total_nights: u32,
    pub total_revenue: f64,
}

impl BookingRecord {
    /// Builds a record with the derived totals filled in. Categorical
    /// fields start as placeholders; callers override them with struct
    /// update syntax.
    pub fn new(
        arrival_year: i32,
        arrival_month: Month,
        weekend_nights: u32,
        week_nights: u32,
        adr: f64,
    ) -> Self {
        let total_nights = weekend_nights + week_nights;
        BookingRecord {
            hotel: "Unknown".to_string(),
            is_canceled: false,
            arrival_year,
            arrival_month,
            adr,
            country: "Unknown".to_string(),
            market_segment: "Undefined".to_string(),
            distribution_channel: "Undefined".to_string(),
            reserved_room_type: "Unknown".to_string(),
            assigned_room_type: "Unknown".to_string(),
            reservation_status: "Unknown".to_string(),
            total_nights,
            total_revenue: adr * total_nights as f64,
        }
    }

    pub fn room_mismatch(&self) -> bool {
        self.reserved_room_type != self.assigned_room_type
    }
}

/// A row that can be exported to CSV. `COLUMNS` is the header written even
/// when there are no rows; it must list the serialized field names in order.
pub trait ExportRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub period: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(skip_serializing)]
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HotelShareRow {
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "Share %")]
    pub share_pct: String,
    #[serde(skip_serializing)]
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountryRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(skip_serializing)]
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SegmentRow {
    #[serde(rename = "MarketSegment")]
    #[tabled(rename = "MarketSegment")]
    pub market_segment: String,
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(skip_serializing)]
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChannelMismatchRow {
    #[serde(rename = "DistributionChannel")]
    #[tabled(rename = "DistributionChannel")]
    pub distribution_channel: String,
    #[serde(rename = "RoomMismatches")]
    #[tabled(rename = "RoomMismatches")]
    pub mismatches: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CancellationRow {
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Bookings")]
    #[tabled(rename = "Bookings")]
    pub bookings: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "Share %")]
    pub share_pct: String,
}

impl ExportRow for KpiRow {
    const COLUMNS: &'static [&'static str] = &["Metric", "Value"];
}

impl ExportRow for TrendRow {
    const COLUMNS: &'static [&'static str] = &["Month", "Value"];
}

impl ExportRow for HotelShareRow {
    const COLUMNS: &'static [&'static str] = &["Hotel", "Value", "SharePct"];
}

impl ExportRow for CountryRow {
    const COLUMNS: &'static [&'static str] = &["Rank", "Country", "Value"];
}

impl ExportRow for SegmentRow {
    const COLUMNS: &'static [&'static str] = &["MarketSegment", "Hotel", "Value"];
}

impl ExportRow for ChannelMismatchRow {
    const COLUMNS: &'static [&'static str] = &["DistributionChannel", "RoomMismatches"];
}

impl ExportRow for CancellationRow {
    const COLUMNS: &'static [&'static str] = &["Status", "Bookings", "SharePct"];
}
