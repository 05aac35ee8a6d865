use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Cannot load {path}: {reason}")]
    DataLoad { path: String, reason: String },

    #[error("Missing required columns in {path}: {}", .columns.join(", "))]
    MissingColumns { path: String, columns: Vec<String> },

    #[error("Invalid data on line {line}: {field} = {value}")]
    DataIntegrity {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("Unknown {dimension} filter value: {value}")]
    InvalidFilterValue {
        dimension: &'static str,
        value: String,
    },

    #[error("Invalid year range {min}..={max} (data covers {lo}..={hi})")]
    InvalidYearRange { min: i32, max: i32, lo: i32, hi: i32 },

    #[error("No data loaded")]
    NoData,

    #[error("Config: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
