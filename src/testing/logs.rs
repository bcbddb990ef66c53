use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone)]
struct CapturedRecord {
    level: Level,
    message: String,
}

#[derive(Default)]
struct CaptureLogger {
    records: Mutex<Vec<CapturedRecord>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push(CapturedRecord {
                level: record.level(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<&'static CaptureLogger> = OnceLock::new();

/// Process-wide `log` capture. Tests share one logger, so assertions should
/// filter on a marker unique to the test (e.g. a device identifier).
#[derive(Clone, Copy)]
pub struct LogCapture {
    logger: &'static CaptureLogger,
}

impl LogCapture {
    /// Install the capture logger, or reuse it when already installed
    pub fn install() -> Self {
        let logger = *LOGGER.get_or_init(|| {
            let logger: &'static CaptureLogger = Box::leak(Box::default());
            if log::set_logger(logger).is_ok() {
                log::set_max_level(LevelFilter::Trace);
            }
            logger
        });
        Self { logger }
    }

    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.logger
            .records
            .lock()
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.level == level && r.message.contains(needle))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn warnings(&self, needle: &str) -> usize {
        self.count(Level::Warn, needle)
    }

    pub fn infos(&self, needle: &str) -> usize {
        self.count(Level::Info, needle)
    }
}
