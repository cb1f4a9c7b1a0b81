//! Row-collapsing hydration
//!
//! A one-to-many LEFT JOIN repeats the parent's columns once per child. The
//! helpers here read the parent scalars once and reduce the child-id column
//! to a de-duplicated, first-seen-ordered id list. A NULL or 0 child id is
//! the sentinel row of a parent with no children and contributes nothing.

use storefront_core::errors::{Result, StorefrontError};
use storefront_core::model::EntityKind;

use crate::cursor::{ResultCursor, Row};

/// The rows of one cursor, all belonging to the same parent
#[derive(Debug, Clone, Copy)]
pub struct ParentRows<'c> {
    cursor: &'c ResultCursor,
    first: Row<'c>,
    parent_id: i64,
}

impl<'c> ParentRows<'c> {
    /// Check that every row carries the same parent id in `parent_column`
    ///
    /// # Errors
    /// * `NotFound` - the cursor is empty
    /// * `DataAccess` - rows span more than one parent
    pub fn collect(
        cursor: &'c ResultCursor,
        kind: EntityKind,
        parent_column: &str,
        expected_id: i64,
    ) -> Result<Self> {
        let first = cursor.require_first(kind, expected_id)?;
        let parent_id = first.int(parent_column)?;
        for row in cursor.rows() {
            let found = row.int(parent_column)?;
            if found != parent_id {
                return Err(StorefrontError::CursorSpansParents {
                    column: parent_column.to_string(),
                    expected: parent_id,
                    found,
                }
                .into());
            }
        }
        Ok(Self {
            cursor,
            first,
            parent_id,
        })
    }

    pub fn parent_id(&self) -> i64 {
        self.parent_id
    }

    /// Row holding the parent's scalar columns
    pub fn scalars(&self) -> Row<'c> {
        self.first
    }

    /// Distinct non-sentinel child ids of `column`, in first-seen order
    ///
    /// # Errors
    /// * `DataAccess` - the column is missing or not an integer
    pub fn child_ids(&self, column: &str) -> Result<Vec<i64>> {
        let raw = self
            .cursor
            .rows()
            .map(|row| row.opt_int(column))
            .collect::<Result<Vec<_>>>()?;
        Ok(first_seen_distinct(raw))
    }

    /// Distinct values produced by `read`, in first-seen order
    ///
    /// `read` returning `None` marks a sentinel row.
    ///
    /// # Errors
    /// Propagates the first error returned by `read`
    pub fn distinct<V, F>(&self, mut read: F) -> Result<Vec<V>>
    where
        V: PartialEq,
        F: FnMut(&Row<'c>) -> Result<Option<V>>,
    {
        let mut out: Vec<V> = Vec::new();
        for row in self.cursor.rows() {
            if let Some(value) = read(&row)? {
                if !out.contains(&value) {
                    out.push(value);
                }
            }
        }
        Ok(out)
    }
}

/// Reduce a child-id column to distinct ids in first-seen order, dropping
/// NULL and 0 sentinels
pub fn first_seen_distinct(ids: impl IntoIterator<Item = Option<i64>>) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::new();
    for id in ids.into_iter().flatten() {
        if id != 0 && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rusqlite::Connection;
    use storefront_core::ExErrorKind;

    fn joined(rows: &str) -> ResultCursor {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE j (seq INTEGER, parent_id INTEGER, name TEXT, child_id INTEGER);
             INSERT INTO j VALUES {};",
            rows
        ))
        .unwrap();
        ResultCursor::execute(&conn, "SELECT parent_id, name, child_id FROM j ORDER BY seq", [])
            .unwrap()
    }

    #[test]
    fn test_repeated_child_collapses() {
        let c = joined("(1, 5, 'a', 10), (2, 5, 'a', 11), (3, 5, 'a', 10), (4, 5, 'a', 12)");
        let rows = ParentRows::collect(&c, EntityKind::Order, "parent_id", 5).unwrap();
        assert_eq!(rows.child_ids("child_id").unwrap(), vec![10, 11, 12]);
        assert_eq!(rows.scalars().string("name").unwrap(), "a");
    }

    #[test]
    fn test_sentinel_row_yields_no_children() {
        let c = joined("(1, 5, 'a', NULL)");
        let rows = ParentRows::collect(&c, EntityKind::Order, "parent_id", 5).unwrap();
        assert!(rows.child_ids("child_id").unwrap().is_empty());

        let c = joined("(1, 5, 'a', 0)");
        let rows = ParentRows::collect(&c, EntityKind::Order, "parent_id", 5).unwrap();
        assert!(rows.child_ids("child_id").unwrap().is_empty());
    }

    #[test]
    fn test_rows_spanning_two_parents_rejected() {
        let c = joined("(1, 5, 'a', 10), (2, 6, 'b', 11)");
        let err = ParentRows::collect(&c, EntityKind::Order, "parent_id", 5).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DataAccess);
    }

    #[test]
    fn test_empty_cursor_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        let c = ResultCursor::execute(&conn, "SELECT 1 AS parent_id WHERE 0", []).unwrap();
        let err = ParentRows::collect(&c, EntityKind::Customer, "parent_id", 1).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.entity_id(), Some("1"));
    }

    #[test]
    fn test_distinct_over_text_column() {
        let c = joined("(1, 5, 'x', 1), (2, 5, 'y', 2), (3, 5, 'x', 3)");
        let rows = ParentRows::collect(&c, EntityKind::Address, "parent_id", 5).unwrap();
        let names = rows.distinct(|row| row.opt_string("name")).unwrap();
        assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_first_seen_distinct(ids in proptest::collection::vec(proptest::option::of(0i64..20), 0..60)) {
            let out = first_seen_distinct(ids.clone());

            // No duplicates, no sentinels
            for (i, id) in out.iter().enumerate() {
                prop_assert!(*id != 0);
                prop_assert!(!out[i + 1..].contains(id));
            }

            // Every real id survives, in order of first appearance
            let mut expected: Vec<i64> = Vec::new();
            for id in ids.iter().flatten() {
                if *id != 0 && !expected.contains(id) {
                    expected.push(*id);
                }
            }
            prop_assert_eq!(out, expected);
        }
    }
}
