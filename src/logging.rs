// Minimal `log` backend. Messages go to stderr so they never interleave
// with the menu and tables on stdout.
use chrono::{DateTime, Utc};
use log::{LevelFilter, Metadata, Record, SetLoggerError};

pub struct StderrLogger;

pub static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now: DateTime<Utc> = Utc::now();
            eprintln!(
                "[{}] {} {} - {}",
                now.to_rfc3339(),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
