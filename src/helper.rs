//! CRUD facade over a connection and its mapping.
//!
//! Query fragments are handed to SQLite verbatim. A fragment that starts with
//! `ORDER BY` is appended as-is; anything else becomes the `WHERE` clause, so
//! `"value > 1.5 ORDER BY date DESC"` filters and orders in one string.

use rusqlite::{ffi, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{OrmError, OrmResult};
use crate::mapping::{ClassMapping, Mapping};
use crate::model::Entity;
use crate::sqlite::{SqlStatement, Value};

/// Borrowed handle for object-level persistence operations.
#[derive(Clone, Copy)]
pub struct OrmHelper<'a> {
    connection: &'a Connection,
    mapping: &'a Mapping,
}

impl<'a> OrmHelper<'a> {
    pub fn new(connection: &'a Connection, mapping: &'a Mapping) -> Self {
        Self { connection, mapping }
    }

    /// Insert one object. Fails with [`OrmError::DuplicateKey`] if its
    /// primary key is already stored.
    pub fn insert<T: Entity>(&self, object: &T) -> OrmResult<()> {
        let class = self.class::<T>()?;
        let values = object.values();
        let columns: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
        let statement = SqlStatement::new(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            class.table_name,
            columns.join(", "),
            placeholders.join(", ")
        ))
        .with_params(values.into_iter().map(|(_, value)| value));

        match self.execute(&statement) {
            Err(OrmError::Sqlite(rusqlite::Error::SqliteFailure(err, _)))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(OrmError::DuplicateKey {
                    class: T::CLASS_NAME.to_string(),
                    key: primary_key_value(object, class).to_string(),
                })
            }
            other => other.map(|_| ()),
        }
    }

    /// Write every non-key column of `object` to the row with its key.
    pub fn update<T: Entity>(&self, object: &T) -> OrmResult<()> {
        let class = self.class::<T>()?;
        let key = primary_key_value(object, class);
        let assignments: Vec<(&str, Value)> = object
            .values()
            .into_iter()
            .filter(|(name, _)| *name != class.primary_key)
            .collect();
        let set_clause: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{name} = ?{}", i + 1))
            .collect();
        let statement = SqlStatement::new(format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            class.table_name,
            set_clause.join(", "),
            class.primary_key,
            assignments.len() + 1
        ))
        .with_params(assignments.into_iter().map(|(_, value)| value))
        .with_param(key.clone());

        if self.execute(&statement)? == 0 {
            return Err(OrmError::NotFound {
                class: T::CLASS_NAME.to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Delete the row holding `object`. Returns whether a row was removed.
    pub fn delete<T: Entity>(&self, object: &T) -> OrmResult<bool> {
        let class = self.class::<T>()?;
        self.delete_by_id::<T>(primary_key_value(object, class))
    }

    /// Delete by primary key. Returns whether a row was removed.
    pub fn delete_by_id<T: Entity>(&self, id: impl Into<Value>) -> OrmResult<bool> {
        let class = self.class::<T>()?;
        let statement = SqlStatement::new(format!(
            "DELETE FROM {} WHERE {} = ?1",
            class.table_name, class.primary_key
        ))
        .with_param(id);
        Ok(self.execute(&statement)? > 0)
    }

    /// Delete all objects of `T`, or those matching `predicate`.
    pub fn delete_all<T: Entity>(&self, predicate: Option<&str>) -> OrmResult<usize> {
        let class = self.class::<T>()?;
        let sql = with_fragment(format!("DELETE FROM {}", class.table_name), predicate);
        self.execute(&SqlStatement::new(sql))
    }

    /// Fetch objects of `T`; `fragment` may hold a predicate, an `ORDER BY`
    /// clause, or both.
    pub fn get_objects<T: Entity>(&self, fragment: Option<&str>) -> OrmResult<Vec<T>> {
        let class = self.class::<T>()?;
        let sql = with_fragment(select_clause::<T>(class), fragment);
        self.query(&SqlStatement::new(sql))
    }

    pub fn get_object_by_id<T: Entity>(&self, id: impl Into<Value>) -> OrmResult<Option<T>> {
        let class = self.class::<T>()?;
        let statement = SqlStatement::new(format!(
            "{} WHERE {} = ?1",
            select_clause::<T>(class),
            class.primary_key
        ))
        .with_param(id);
        debug!(sql = %statement.sql, "query");
        let object = self
            .connection
            .query_row(&statement.sql, params_from_iter(statement.params.iter()), |row| {
                T::from_row(row)
            })
            .optional()?;
        Ok(object)
    }

    pub fn count<T: Entity>(&self, predicate: Option<&str>) -> OrmResult<usize> {
        let class = self.class::<T>()?;
        let sql = with_fragment(format!("SELECT COUNT(*) FROM {}", class.table_name), predicate);
        debug!(%sql, "query");
        let count: i64 = self.connection.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn class<T: Entity>(&self) -> OrmResult<&'a ClassMapping> {
        self.mapping.class(T::CLASS_NAME)
    }

    fn execute(&self, statement: &SqlStatement) -> OrmResult<usize> {
        debug!(sql = %statement.sql, params = statement.params.len(), "execute");
        let changed = self
            .connection
            .execute(&statement.sql, params_from_iter(statement.params.iter()))?;
        Ok(changed)
    }

    fn query<T: Entity>(&self, statement: &SqlStatement) -> OrmResult<Vec<T>> {
        debug!(sql = %statement.sql, "query");
        let mut stmt = self.connection.prepare(&statement.sql)?;
        let rows = stmt.query_map(params_from_iter(statement.params.iter()), |row| T::from_row(row))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

fn select_clause<T: Entity>(class: &ClassMapping) -> String {
    let columns: Vec<String> = T::columns().into_iter().map(|c| c.name).collect();
    format!("SELECT {} FROM {}", columns.join(", "), class.table_name)
}

fn primary_key_value<T: Entity>(object: &T, class: &ClassMapping) -> Value {
    object.value_of(&class.primary_key).unwrap_or(Value::Null)
}

fn with_fragment(mut sql: String, fragment: Option<&str>) -> String {
    let Some(fragment) = fragment.map(str::trim).filter(|f| !f.is_empty()) else {
        return sql;
    };
    if starts_with_order_by(fragment) {
        sql.push(' ');
    } else {
        sql.push_str(" WHERE ");
    }
    sql.push_str(fragment);
    sql
}

fn starts_with_order_by(fragment: &str) -> bool {
    let mut words = fragment.split_whitespace();
    matches!(
        (words.next(), words.next()),
        (Some(first), Some(second))
            if first.eq_ignore_ascii_case("ORDER") && second.eq_ignore_ascii_case("BY")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_placement() {
        let base = || "SELECT id FROM t".to_string();
        assert_eq!(with_fragment(base(), None), "SELECT id FROM t");
        assert_eq!(with_fragment(base(), Some("   ")), "SELECT id FROM t");
        assert_eq!(
            with_fragment(base(), Some("order  by id DESC")),
            "SELECT id FROM t order  by id DESC"
        );
        assert_eq!(
            with_fragment(base(), Some(" value > 1.5 ORDER BY date DESC")),
            "SELECT id FROM t WHERE value > 1.5 ORDER BY date DESC"
        );
        assert_eq!(
            with_fragment(base(), Some("ordered = 1")),
            "SELECT id FROM t WHERE ordered = 1"
        );
    }
}
