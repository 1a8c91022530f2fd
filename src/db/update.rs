//! Dynamic UPDATE statement builder
//!
//! Partial update endpoints accept any subset of an entity's mutable fields.
//! `UpdateBuilder` assembles the `SET` clause from only the supplied fields
//! and keeps the bind values in placeholder order, so repositories don't have
//! to enumerate every field combination by hand.

use chrono::NaiveDate;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{MySql, Sqlite};

/// A bind value for a dynamically built query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl SqlValue {
    /// Bind this value onto a SQLite query
    pub fn bind_sqlite<'q>(
        self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Null => query.bind(Option::<String>::None),
        }
    }

    /// Bind this value onto a MySQL query
    pub fn bind_mysql<'q>(
        self,
        query: Query<'q, MySql, MySqlArguments>,
    ) -> Query<'q, MySql, MySqlArguments> {
        match self {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Null => query.bind(Option::<String>::None),
        }
    }
}

/// Builds an `UPDATE ... SET ... WHERE ...` statement from optional fields.
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    columns: Vec<&'static str>,
    values: Vec<SqlValue>,
    touch_updated_at: bool,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
            touch_updated_at: false,
        }
    }

    /// Add a column assignment.
    pub fn set(mut self, column: &'static str, value: SqlValue) -> Self {
        self.columns.push(column);
        self.values.push(value);
        self
    }

    /// Add a column assignment only when the value is present.
    pub fn set_opt(self, column: &'static str, value: Option<SqlValue>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Also set `updated_at = CURRENT_TIMESTAMP` when any field changed.
    pub fn touch_updated_at(mut self) -> Self {
        self.touch_updated_at = true;
        self
    }

    /// True when no assignment was added
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build the statement with the given WHERE clause (may contain `?`
    /// placeholders; their values go in `where_values`).
    ///
    /// Returns `None` when no assignment was added.
    pub fn build(
        mut self,
        where_clause: &str,
        where_values: Vec<SqlValue>,
    ) -> Option<(String, Vec<SqlValue>)> {
        if self.columns.is_empty() {
            return None;
        }

        let mut assignments: Vec<String> =
            self.columns.iter().map(|c| format!("{} = ?", c)).collect();
        if self.touch_updated_at {
            assignments.push("updated_at = CURRENT_TIMESTAMP".to_string());
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            assignments.join(", "),
            where_clause
        );

        self.values.extend(where_values);
        Some((sql, self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_single_field() {
        let (sql, values) = UpdateBuilder::new("todos")
            .set("title", SqlValue::Text("New".to_string()))
            .build("id = ?", vec![SqlValue::Int(7)])
            .expect("builder should produce a statement");

        assert_eq!(sql, "UPDATE todos SET title = ? WHERE id = ?");
        assert_eq!(
            values,
            vec![SqlValue::Text("New".to_string()), SqlValue::Int(7)]
        );
    }

    #[test]
    fn test_build_preserves_order() {
        let (sql, values) = UpdateBuilder::new("notebooks")
            .set("title", SqlValue::Text("A".to_string()))
            .set("color", SqlValue::Text("#abc".to_string()))
            .touch_updated_at()
            .build(
                "id = ? AND user_id = ?",
                vec![SqlValue::Int(1), SqlValue::Int(2)],
            )
            .expect("builder should produce a statement");

        assert_eq!(
            sql,
            "UPDATE notebooks SET title = ?, color = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ? AND user_id = ?"
        );
        assert_eq!(values.len(), 4);
        assert_eq!(values[2], SqlValue::Int(1));
        assert_eq!(values[3], SqlValue::Int(2));
    }

    #[test]
    fn test_set_opt_skips_none() {
        let builder = UpdateBuilder::new("todos")
            .set_opt("title", None)
            .set_opt("status", Some(SqlValue::Text("completed".to_string())));

        let (sql, values) = builder.build("id = ?", vec![SqlValue::Int(1)]).unwrap();
        assert_eq!(sql, "UPDATE todos SET status = ? WHERE id = ?");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_empty_builder_yields_none() {
        let builder = UpdateBuilder::new("todos");
        assert!(builder.is_empty());
        assert!(builder.build("id = ?", vec![SqlValue::Int(1)]).is_none());
    }
}
