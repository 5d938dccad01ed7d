//! Log capture and object printers.
//!
//! [`LogCapture`] routes `tracing` output of the current thread into a plain
//! text file until it is finished, so the file can be shown afterwards.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing::info;

use crate::error::OrmResult;
use crate::model::Entity;

pub const LOG_FILE_NAME: &str = "orm.log";

/// Thread-scoped capture of log output into a file.
pub struct LogCapture {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl LogCapture {
    /// Start capturing into `path`, truncating any previous content.
    pub fn start(path: impl AsRef<Path>, level: LevelFilter) -> OrmResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        let subscriber = tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(level)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Ok(Self { path, _guard: guard })
    }

    /// Stop capturing and return everything written.
    pub fn finish(self) -> OrmResult<String> {
        let path = self.path.clone();
        drop(self);
        read_log(&path)
    }
}

pub fn read_log(path: impl AsRef<Path>) -> OrmResult<String> {
    Ok(fs::read_to_string(path)?)
}

/// Write a section header.
pub fn log_section(title: &str) {
    info!("-- {title} --");
}

/// Write one object as JSON, tagged with its class name.
pub fn log_object<T: Entity + Serialize>(object: &T) -> OrmResult<()> {
    let json = serde_json::to_string(object)?;
    info!(class = T::CLASS_NAME, "{json}");
    Ok(())
}

pub fn log_query_results<T: Entity + Serialize>(objects: &[T]) -> OrmResult<()> {
    info!(class = T::CLASS_NAME, count = objects.len(), "query results");
    for object in objects {
        log_object(object)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tracing::{debug, warn};

    use super::*;
    use crate::model::Record;

    #[test]
    fn captures_until_finished() {
        let dir = tempfile::tempdir().unwrap();
        let capture = LogCapture::start(dir.path().join(LOG_FILE_NAME), LevelFilter::INFO).unwrap();
        log_section("first");
        debug!("filtered out");
        let date = NaiveDate::from_ymd_opt(1981, 1, 1).unwrap();
        log_query_results(&[Record::new(1, "A1", date, true, 1.1)]).unwrap();
        let text = capture.finish().unwrap();
        warn!("after capture");

        assert!(text.contains("-- first --"));
        assert!(text.contains("count=1"));
        assert!(text.contains(r#""label":"A1""#));
        assert!(text.contains(r#""date":"1981-01-01""#));
        assert!(!text.contains("filtered out"));
        assert!(!text.contains("after capture"));
    }
}
