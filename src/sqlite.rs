use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::OrmResult;
use crate::helper::OrmHelper;
use crate::mapping::{ClassMapping, Mapping};
use crate::model::Entity;

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Dates are stored as ISO-8601 text so that text ordering is chronological.
impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{v}'"),
            Value::Boolean(v) => write!(f, "{v}"),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(v) => ToSqlOutput::from(*v),
            Value::Real(v) => ToSqlOutput::from(*v),
            Value::Text(v) => ToSqlOutput::from(v.as_str()),
            Value::Boolean(v) => ToSqlOutput::from(*v),
        })
    }
}

/// SQL statement with positional parameters (`?1`, `?2`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn with_params(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.params.extend(values);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key: Vec<String>,
}

impl TableDefinition {
    /// Table for an entity type as placed by its class mapping.
    pub fn for_entity<T: Entity>(class: &ClassMapping) -> Self {
        Self {
            name: class.table_name.clone(),
            columns: T::columns(),
            primary_key: vec![class.primary_key.clone()],
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::sql).collect();
        if !self.primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }
        format!("CREATE TABLE IF NOT EXISTS {} ({})", self.name, parts.join(", "))
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type.sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
    Real,
}

impl DataType {
    fn sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    NotNull,
}

impl ColumnConstraint {
    fn sql(self) -> &'static str {
        match self {
            ColumnConstraint::NotNull => "NOT NULL",
        }
    }
}

/// SQLite service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file; `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    /// Mapping text binding entity classes to tables.
    pub mapping: String,
    /// Drop and recreate mapped tables on every start.
    pub force_create_schema: bool,
}

impl SqliteConfig {
    /// Create a config for a database file
    pub fn new(db_path: impl Into<PathBuf>, mapping: impl Into<String>) -> Self {
        Self {
            db_path: Some(db_path.into()),
            mapping: mapping.into(),
            force_create_schema: false,
        }
    }

    pub fn in_memory(mapping: impl Into<String>) -> Self {
        Self {
            db_path: None,
            mapping: mapping.into(),
            force_create_schema: false,
        }
    }

    pub fn with_force_create_schema(mut self, force: bool) -> Self {
        self.force_create_schema = force;
        self
    }
}

/// An open database plus the parsed mapping.
///
/// Acquire with [`SqliteService::start`], release with [`SqliteService::close`].
/// Dropping the service also closes the connection, but swallows close errors.
pub struct SqliteService {
    config: SqliteConfig,
    mapping: Mapping,
    connection: Connection,
}

impl SqliteService {
    pub fn start(config: SqliteConfig) -> OrmResult<Self> {
        let mapping = Mapping::parse(&config.mapping)?;
        let connection = match &config.db_path {
            Some(path) => {
                info!(path = %path.display(), "starting sqlite service");
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                Connection::open(path)?
            }
            None => {
                info!("starting in-memory sqlite service");
                Connection::open_in_memory()?
            }
        };
        debug!(classes = mapping.len(), "mapping loaded");

        Ok(Self {
            config,
            mapping,
            connection,
        })
    }

    /// Materialize the table for `T`.
    pub fn create_schema<T: Entity>(&self) -> OrmResult<TableDefinition> {
        let class = self.mapping.class(T::CLASS_NAME)?;
        let table = TableDefinition::for_entity::<T>(class);
        if self.config.force_create_schema {
            debug!(table = %table.name, "dropping table before schema creation");
            self.connection.execute(&table.drop_sql(), [])?;
        }
        let sql = table.create_sql();
        debug!(%sql, "creating table");
        self.connection.execute(&sql, [])?;
        Ok(table)
    }

    pub fn helper(&self) -> OrmHelper<'_> {
        OrmHelper::new(&self.connection, &self.mapping)
    }

    pub fn close(self) -> OrmResult<()> {
        info!("stopping sqlite service");
        self.connection.close().map_err(|(_, err)| err.into())
    }
}
