//! Application configuration.

use std::path::PathBuf;

use tracing::level_filters::LevelFilter;

use crate::error::OrmResult;
use crate::logging::LOG_FILE_NAME;
use crate::sqlite::SqliteConfig;

/// Mapping used when no mapping file is given.
pub const DEFAULT_MAPPING: &str = include_str!("../resources/simple_example.mapping");

pub const DB_FILE_NAME: &str = "orm_demo.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the database and the captured log.
    pub data_dir: PathBuf,
    pub mapping: String,
    /// Mapping file read at startup; overrides `mapping` when set.
    pub mapping_file: Option<PathBuf>,
    pub force_create_schema: bool,
    /// Level of the captured log.
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            mapping: DEFAULT_MAPPING.to_string(),
            mapping_file: None,
            force_create_schema: true,
            log_level: LevelFilter::DEBUG,
        }
    }

    pub fn with_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.mapping = mapping.into();
        self
    }

    pub fn with_mapping_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_file = Some(path.into());
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_force_create_schema(mut self, force: bool) -> Self {
        self.force_create_schema = force;
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Database settings, reading the mapping file if one is configured.
    pub fn sqlite_config(&self) -> OrmResult<SqliteConfig> {
        let mapping = match &self.mapping_file {
            Some(path) => std::fs::read_to_string(path)?,
            None => self.mapping.clone(),
        };
        Ok(SqliteConfig::new(self.db_path(), mapping).with_force_create_schema(self.force_create_schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;

    #[test]
    fn paths_live_in_data_dir() {
        let config = AppConfig::new("/tmp/demo");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/demo/orm_demo.db"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/demo/orm.log"));
        let sqlite = config.sqlite_config().unwrap();
        assert!(sqlite.force_create_schema);
        assert_eq!(sqlite.db_path, Some(PathBuf::from("/tmp/demo/orm_demo.db")));
    }

    #[test]
    fn mapping_file_overrides_inline_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.mapping");
        std::fs::write(&path, "CLASS Record TABLE custom\nPRIMARY_KEY id\n;\n").unwrap();

        let config = AppConfig::new(dir.path()).with_mapping_file(&path);
        assert!(config.sqlite_config().unwrap().mapping.contains("TABLE custom"));

        let missing = AppConfig::new(dir.path()).with_mapping_file(dir.path().join("missing.mapping"));
        assert!(matches!(missing.sqlite_config(), Err(crate::OrmError::Io(_))));
    }

    #[test]
    fn default_mapping_declares_record() {
        let mapping = Mapping::parse(DEFAULT_MAPPING).unwrap();
        assert_eq!(mapping.class("Record").unwrap().table_name, "sample_record");
    }
}
