//! Domain model and the trait that lets the helper persist it.

use chrono::NaiveDate;
use rusqlite::Row;
use serde::Serialize;

use crate::sqlite::{ColumnConstraint, ColumnDefinition, DataType, Value};

/// A type that can be stored through [`crate::helper::OrmHelper`].
///
/// The class name is looked up in the mapping to find the table and the
/// primary-key column. Column names are also the names that query fragments
/// refer to.
pub trait Entity: Sized {
    const CLASS_NAME: &'static str;

    /// Column definitions, in storage order.
    fn columns() -> Vec<ColumnDefinition>;

    /// Current field values keyed by column name.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Build an instance from a row selected with [`Entity::columns`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Value of the named column, if the entity has it.
    fn value_of(&self, column: &str) -> Option<Value> {
        self.values()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

/// The sample record the demo stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: i64,
    pub label: String,
    pub date: NaiveDate,
    pub flag: bool,
    pub value: f32,
}

impl Record {
    pub fn new(id: i64, label: impl Into<String>, date: NaiveDate, flag: bool, value: f32) -> Self {
        Self {
            id,
            label: label.into(),
            date,
            flag,
            value,
        }
    }
}

impl Entity for Record {
    const CLASS_NAME: &'static str = "Record";

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", DataType::Integer),
            ColumnDefinition::new("label", DataType::Text).with_constraint(ColumnConstraint::NotNull),
            ColumnDefinition::new("date", DataType::Text).with_constraint(ColumnConstraint::NotNull),
            ColumnDefinition::new("flag", DataType::Integer).with_constraint(ColumnConstraint::NotNull),
            ColumnDefinition::new("value", DataType::Real).with_constraint(ColumnConstraint::NotNull),
        ]
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::Integer(self.id)),
            ("label", Value::Text(self.label.clone())),
            ("date", Value::from(self.date)),
            ("flag", Value::Boolean(self.flag)),
            ("value", Value::Real(f64::from(self.value))),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        // REAL columns come back as f64; the field was widened from f32 on write.
        let value: f64 = row.get("value")?;
        Ok(Self {
            id: row.get("id")?,
            label: row.get("label")?,
            date: row.get("date")?,
            flag: row.get("flag")?,
            value: value as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_of_finds_named_column() {
        let date = NaiveDate::from_ymd_opt(1981, 1, 1).unwrap();
        let record = Record::new(7, "A7", date, true, 1.5);
        assert_eq!(record.value_of("id"), Some(Value::Integer(7)));
        assert_eq!(record.value_of("date"), Some(Value::Text("1981-01-01".to_string())));
        assert_eq!(record.value_of("missing"), None);
    }

    #[test]
    fn columns_match_values() {
        let date = NaiveDate::from_ymd_opt(1982, 2, 2).unwrap();
        let record = Record::new(2, "A2", date, false, 2.2);
        let columns: Vec<String> = Record::columns().into_iter().map(|c| c.name).collect();
        let values: Vec<&str> = record.values().into_iter().map(|(name, _)| name).collect();
        assert_eq!(columns, values);
    }
}
