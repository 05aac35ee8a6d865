use crate::aggregate::Measure;
use crate::error::DashboardError;
use crate::filter::CancellationFilter;
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub top_countries: usize,
    pub preview_rows: usize,
    pub log_level: String,
    pub cancellation: CancellationFilter,
    pub measure: Measure,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("hotel_booking.csv"),
            output_dir: PathBuf::from("dashboard_output"),
            top_countries: 5,
            preview_rows: 10,
            log_level: "info".to_string(),
            cancellation: CancellationFilter::default(),
            measure: Measure::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config: DashboardConfig = serde_json::from_str(&text)?;
        // Relative paths in the file are relative to the file itself.
        if let Some(base) = path.parent() {
            if config.data_path.is_relative() {
                config.data_path = base.join(&config.data_path);
            }
            if config.output_dir.is_relative() {
                config.output_dir = base.join(&config.output_dir);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// An explicit path must exist; the default file is optional.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, DashboardError> {
        match explicit {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, DashboardError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| DashboardError::Config(format!("unknown log level: {}", self.log_level)))
    }

    fn validate(&self) -> Result<(), DashboardError> {
        if self.top_countries == 0 {
            return Err(DashboardError::Config("top_countries must be at least 1".to_string()));
        }
        self.level_filter()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::fixture;

    #[test]
    fn defaults_use_relative_paths() {
        let c = DashboardConfig::default();
        assert_eq!(c.data_path, PathBuf::from("hotel_booking.csv"));
        assert!(c.data_path.is_relative());
        assert_eq!(c.top_countries, 5);
        assert_eq!(c.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = fixture(
            "partial_config.json",
            r#"{ "data_path": "bookings.csv", "cancellation": "exclude_by_flag", "measure": "bookings" }"#,
        );
        let c = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(c.data_path, path.parent().unwrap().join("bookings.csv"));
        assert_eq!(c.cancellation, CancellationFilter::ExcludeByFlag);
        assert_eq!(c.measure, Measure::Bookings);
        assert_eq!(c.preview_rows, 10);
    }

    #[test]
    fn rejects_bad_values() {
        let zero = fixture("zero_config.json", r#"{ "top_countries": 0 }"#);
        assert!(matches!(
            DashboardConfig::from_file(&zero),
            Err(DashboardError::Config(_))
        ));
        let level = fixture("level_config.json", r#"{ "log_level": "chatty" }"#);
        assert!(DashboardConfig::from_file(&level).is_err());
        let unknown = fixture("unknown_config.json", r#"{ "colour": "gold" }"#);
        assert!(matches!(
            DashboardConfig::from_file(&unknown),
            Err(DashboardError::Json(_))
        ));
    }

    #[test]
    fn explicit_missing_file_fails() {
        assert!(DashboardConfig::resolve(Some(Path::new("/no/such/dashboard.json"))).is_err());
    }
}
