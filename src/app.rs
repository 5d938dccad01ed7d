//! Lifecycle shell around the demo.
//!
//! `on_create` opens the database, runs the demo with its log captured to a
//! file and hands back the file's text. Any failure turns into a short notice
//! and the database is closed. `on_destroy` (or dropping the app) releases
//! whatever is still open.

use anyhow::Context;
use tracing::warn;

use crate::config::AppConfig;
use crate::demo;
use crate::logging::LogCapture;
use crate::model::Record;
use crate::sqlite::SqliteService;

/// What the app shows after `on_create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// The captured log text.
    Log(String),
    /// Short failure notice.
    Notice(String),
}

pub struct DemoApp {
    config: AppConfig,
    service: Option<SqliteService>,
}

impl DemoApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config, service: None }
    }

    pub fn on_create(&mut self) -> Screen {
        match self.start() {
            Ok(log) => Screen::Log(log),
            Err(err) => {
                let notice = format!("Exception: {err:#}");
                warn!(error = %notice, "demo aborted");
                self.cleanup();
                Screen::Notice(notice)
            }
        }
    }

    pub fn on_destroy(&mut self) {
        self.cleanup();
    }

    pub fn is_open(&self) -> bool {
        self.service.is_some()
    }

    fn start(&mut self) -> anyhow::Result<String> {
        self.cleanup();
        let sqlite_config = self.config.sqlite_config().context("failed to load the mapping")?;
        let service = SqliteService::start(sqlite_config).context("failed to start the sqlite service")?;
        let service = self.service.insert(service);
        service
            .create_schema::<Record>()
            .context("failed to create the schema")?;

        let log_path = self.config.log_path();
        let capture = LogCapture::start(&log_path, self.config.log_level)
            .with_context(|| format!("failed to open log file {}", log_path.display()))?;
        demo::run(&service.helper())?;
        let log = capture.finish().context("failed to read the captured log")?;
        Ok(log)
    }

    fn cleanup(&mut self) {
        if let Some(service) = self.service.take() {
            if let Err(err) = service.close() {
                warn!(error = %err, "failed to close the sqlite service");
            }
        }
    }
}

impl Drop for DemoApp {
    fn drop(&mut self) {
        self.cleanup();
    }
}
