use crate::error::DashboardError;
use crate::loader::{load_bookings, LoadReport};
use crate::table::BookingTable;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// Identity of a data file on disk. A change in any part forces a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKey {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl FileKey {
    pub fn of(path: &Path) -> Result<Self, DashboardError> {
        let meta = fs::metadata(path).map_err(|e| DashboardError::DataLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(FileKey {
            path,
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Cached {
    pub table: Rc<BookingTable>,
    pub report: LoadReport,
    pub hit: bool,
}

/// Holds the most recently loaded table and hands it back for as long as the
/// file it came from is unchanged.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<(FileKey, Rc<BookingTable>, LoadReport)>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Cached, DashboardError> {
        let key = FileKey::of(path)?;
        if let Some((cached_key, table, report)) = &self.entry {
            if *cached_key == key {
                debug!("cache hit for {}", key.path.display());
                return Ok(Cached {
                    table: Rc::clone(table),
                    report: report.clone(),
                    hit: true,
                });
            }
            info!("{} changed on disk, reloading", key.path.display());
        }

        let (table, report) = load_bookings(path)?;
        let table = Rc::new(table);
        self.entry = Some((key, Rc::clone(&table), report.clone()));
        Ok(Cached {
            table,
            report,
            hit: false,
        })
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("cache invalidated");
        }
    }
}
