//! Buffered result cursor
//!
//! A query's rows are copied out of the statement into owned values before
//! any of them is read. Hydrating a parent may issue nested lookups for its
//! children on the same connection, which a live `rusqlite::Rows` would not
//! allow.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, Params};
use storefront_core::errors::{ExError, Result, StorefrontError};
use storefront_core::model::EntityKind;

use crate::errors::{bad_column, from_rusqlite, not_found};

/// Dates are stored as ISO-8601 calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Materialised result set with named columns
#[derive(Debug, Clone)]
pub struct ResultCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultCursor {
    /// Run a query and buffer every row
    ///
    /// # Errors
    /// * `DataAccess` - the statement failed to prepare or step
    pub fn execute<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Self> {
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(params).map_err(from_rusqlite)?;
        while let Some(row) = cursor.next().map_err(from_rusqlite)? {
            let values = (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;
            rows.push(values);
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterate rows in result order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn first(&self) -> Option<Row<'_>> {
        self.rows().next()
    }

    /// First row of a point lookup
    ///
    /// # Errors
    /// * `NotFound` - the lookup matched zero rows
    pub fn require_first(&self, kind: EntityKind, id: i64) -> Result<Row<'_>> {
        self.first().ok_or_else(|| not_found(kind, id))
    }

    /// Read the first column of every row as an id, skipping NULLs
    ///
    /// # Errors
    /// * `DataAccess` - a value was not an integer
    pub fn ids(&self) -> Result<Vec<i64>> {
        let Some(column) = self.columns.first() else {
            return Ok(Vec::new());
        };
        let mut ids = Vec::with_capacity(self.rows.len());
        for row in self.rows() {
            if let Some(id) = row.opt_int(column)? {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// One buffered row, read by column name
#[derive(Debug, Clone, Copy)]
pub struct Row<'c> {
    columns: &'c [String],
    values: &'c [Value],
}

impl<'c> Row<'c> {
    fn value(&self, column: &str) -> Result<&'c Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
            .ok_or_else(|| bad_column(column, "no such column in result"))
    }

    /// Integer column; NULL reads as 0
    ///
    /// # Errors
    /// * `DataAccess` - missing column or non-integer value
    pub fn int(&self, column: &str) -> Result<i64> {
        Ok(self.opt_int(column)?.unwrap_or(0))
    }

    /// Nullable integer column
    ///
    /// # Errors
    /// * `DataAccess` - missing column or non-integer value
    pub fn opt_int(&self, column: &str) -> Result<Option<i64>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i)),
            other => Err(bad_column(column, format!("expected integer, got {:?}", other))),
        }
    }

    /// Text column that must not be NULL
    ///
    /// # Errors
    /// * `DataAccess` - missing column, NULL, or non-text value
    pub fn string(&self, column: &str) -> Result<String> {
        self.opt_string(column)?
            .ok_or_else(|| bad_column(column, "unexpected NULL"))
    }

    /// Nullable text column
    ///
    /// # Errors
    /// * `DataAccess` - missing column or non-text value
    pub fn opt_string(&self, column: &str) -> Result<Option<String>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            Value::Integer(i) => Ok(Some(i.to_string())),
            other => Err(bad_column(column, format!("expected text, got {:?}", other))),
        }
    }

    /// Floating point column; NULL reads as 0.0
    ///
    /// # Errors
    /// * `DataAccess` - missing column or non-numeric value
    pub fn double(&self, column: &str) -> Result<f64> {
        match self.value(column)? {
            Value::Null => Ok(0.0),
            Value::Real(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            other => Err(bad_column(column, format!("expected real, got {:?}", other))),
        }
    }

    /// Calendar date stored as `YYYY-MM-DD`
    ///
    /// # Errors
    /// * `DataAccess` - missing column, NULL, or unparseable text
    pub fn date(&self, column: &str) -> Result<NaiveDate> {
        let text = self.string(column)?;
        NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|e| bad_column(column, e))
    }

    /// Text column parsed into a domain enum
    ///
    /// # Errors
    /// * `DataAccess` - missing column or NULL
    /// * `InvalidArgument` - the stored text is not a known variant
    pub fn parse<T>(&self, column: &str) -> Result<T>
    where
        T: FromStr<Err = StorefrontError>,
    {
        let text = self.string(column)?;
        text.parse::<T>().map_err(ExError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::model::OrderStatus;
    use storefront_core::ExErrorKind;

    fn cursor(sql: &str) -> ResultCursor {
        let conn = Connection::open_in_memory().unwrap();
        ResultCursor::execute(&conn, sql, []).unwrap()
    }

    #[test]
    fn test_named_accessors() {
        let c = cursor(
            "SELECT 7 AS id, 'Kite' AS name, 2.5 AS price, '2024-03-01' AS day, 'shipped' AS status",
        );
        let row = c.first().unwrap();
        assert_eq!(row.int("id").unwrap(), 7);
        assert_eq!(row.string("name").unwrap(), "Kite");
        assert_eq!(row.double("price").unwrap(), 2.5);
        assert_eq!(
            row.date("day").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(row.parse::<OrderStatus>("status").unwrap(), OrderStatus::Shipped);
    }

    #[test]
    fn test_null_int_reads_as_zero() {
        let c = cursor("SELECT NULL AS child_id");
        let row = c.first().unwrap();
        assert_eq!(row.int("child_id").unwrap(), 0);
        assert_eq!(row.opt_int("child_id").unwrap(), None);
    }

    #[test]
    fn test_unknown_column_is_data_access() {
        let c = cursor("SELECT 1 AS a");
        let err = c.first().unwrap().int("b").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DataAccess);
    }

    #[test]
    fn test_empty_point_lookup_is_not_found() {
        let c = cursor("SELECT 1 AS a WHERE 0");
        assert!(c.is_empty());
        let err = c.require_first(EntityKind::Order, 3).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_rows_are_independent_of_statement() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1), (2), (NULL);")
            .unwrap();
        let c = ResultCursor::execute(&conn, "SELECT x FROM t ORDER BY rowid", []).unwrap();
        // Nested statement while the buffered rows are still being read
        for row in c.rows() {
            let n: i64 = conn
                .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
                .unwrap();
            assert_eq!(n, 3);
            let _ = row.opt_int("x").unwrap();
        }
        assert_eq!(c.ids().unwrap(), vec![1, 2]);
    }
}
