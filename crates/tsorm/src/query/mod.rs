//! SELECT rendering and result scanning.
//!
//! The read path renders the accumulated statement state into a SELECT,
//! resolves predicate placeholders to literals, executes, and scans the
//! result rows back into records by case-sensitive column-name match.

use std::fmt::Write as _;

use crate::db::Db;
use crate::schema::{schema_of, Record, Schema};
use crate::value::explain;

impl Db {
    /// Executes the accumulated query and appends every result row to
    /// `dest`, in result order.
    ///
    /// Columns that match no schema field are discarded; fields absent
    /// from the result keep their `Default` value. An assignment failure
    /// aborts the call and discards rows already scanned for it.
    pub fn find_into<T: Record + Default>(&self, dest: &mut Vec<T>) -> Db {
        let mut tx = self.fork();
        let schema = schema_of::<T>();

        let sql = render_select::<T>(&schema, tx.statement());
        let Some(result) = tx.log_and_query(&sql) else {
            return tx;
        };

        let mut scanned: Vec<T> = Vec::with_capacity(result.row_count());
        for row in &result.rows {
            let mut record = T::default();
            for (position, column) in result.columns.iter().enumerate() {
                if schema.field_by_column(column).is_none() {
                    continue;
                }
                let Some(value) = row.get(position) else {
                    continue;
                };
                if let Err(err) = record.assign(column, value) {
                    tx.record_error(err);
                    return tx;
                }
            }
            scanned.push(record);
        }
        dest.extend(scanned);
        tx
    }

    /// Executes the accumulated query and keeps only the first result row.
    pub fn first_into<T: Record + Default>(&self, dest: &mut T) -> Db {
        let mut rows = Vec::new();
        let tx = self.limit(1).find_into(&mut rows);
        if let Some(first) = rows.into_iter().next() {
            *dest = first;
        }
        tx
    }
}

/// Renders the SELECT text for the current statement state.
///
/// The source table defaults to the family name when the schema declares
/// tags (a read then spans all subtables), else the per-instance override,
/// else the family name.
fn render_select<T: Record + Default>(schema: &Schema, stmt: &crate::statement::Statement) -> String {
    let table = stmt.table.clone().unwrap_or_else(|| {
        if schema.has_tags() {
            schema.family.clone()
        } else {
            T::default()
                .table_name()
                .unwrap_or_else(|| schema.family.clone())
        }
    });

    let mut sql = format!(
        "SELECT {} FROM {}{}",
        stmt.select_list(),
        table,
        stmt.render_where()
    );
    if let Some(order) = &stmt.order {
        let _ = write!(sql, " ORDER BY {}", order);
    }
    if let Some(limit) = stmt.limit {
        let _ = write!(sql, " LIMIT {}", limit);
    }
    if let Some(offset) = stmt.offset {
        let _ = write!(sql, " OFFSET {}", offset);
    }
    if let Some(group) = &stmt.group {
        let _ = write!(sql, " GROUP BY {}", group);
    }

    explain(&sql, &stmt.args)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::db::Db;
    use crate::error::OrmError;
    use crate::executor::ResultSet;
    use crate::testing::{MockExecutor, Reading};
    use crate::value::Value;

    fn result_with_rows(rows: Vec<Vec<Value>>) -> ResultSet {
        ResultSet {
            columns: vec![
                "ts".to_string(),
                "device".to_string(),
                "current".to_string(),
                "mystery".to_string(),
            ],
            rows,
        }
    }

    #[test]
    fn test_select_rendering_defaults_to_family() {
        let exec = MockExecutor::new();
        let statements = exec.statements();
        let db = Db::new(exec);

        let mut rows: Vec<Reading> = Vec::new();
        db.filter("device = ?", vec![Value::from("d1")])
            .order_by("ts DESC")
            .limit(20)
            .offset(5)
            .find_into(&mut rows);

        // Tagged schema: the read targets the super-table by default, and
        // the placeholder is resolved before execution.
        assert_eq!(
            statements.lock().as_slice(),
            ["SELECT * FROM reading WHERE device = 'd1' ORDER BY ts DESC LIMIT 20 OFFSET 5"]
        );
    }

    #[test]
    fn test_select_list_and_group_by() {
        let exec = MockExecutor::new();
        let statements = exec.statements();
        let db = Db::new(exec);

        let mut rows: Vec<Reading> = Vec::new();
        db.select("device")
            .select("avg(current)")
            .group_by("device")
            .find_into(&mut rows);

        assert_eq!(
            statements.lock().as_slice(),
            ["SELECT device, avg(current) FROM reading GROUP BY device"]
        );
    }

    #[test]
    fn test_scan_matches_columns_case_sensitively() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let exec = MockExecutor::new().respond(result_with_rows(vec![vec![
            Value::Timestamp(ts),
            Value::Str("d1".to_string()),
            Value::Float(5.5),
            Value::Str("discarded".to_string()),
        ]]));
        let db = Db::new(exec);

        let mut rows: Vec<Reading> = Vec::new();
        let tx = db.find_into(&mut rows);

        assert!(tx.err().is_none());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ts, Some(ts));
        assert_eq!(rows[0].device, "d1");
        assert_eq!(rows[0].current, Some(5.5));
        // Not present in the result set: left at its default.
        assert_eq!(rows[0].voltage, None);
    }

    #[test]
    fn test_scan_failure_discards_partial_rows() {
        let exec = MockExecutor::new().respond(result_with_rows(vec![
            vec![
                Value::Null,
                Value::Str("d1".to_string()),
                Value::Float(1.0),
                Value::Null,
            ],
            vec![
                Value::Null,
                Value::Str("d1".to_string()),
                // Wrong kind for a float column: the scan aborts here.
                Value::Str("not a number".to_string()),
                Value::Null,
            ],
        ]));
        let db = Db::new(exec);

        let mut rows: Vec<Reading> = Vec::new();
        let tx = db.find_into(&mut rows);

        assert!(matches!(
            tx.errors().first(),
            Some(OrmError::Scan { column, .. }) if column == "current"
        ));
        // The successfully scanned first row is discarded too.
        assert!(rows.is_empty());
    }

    #[test]
    fn test_first_keeps_only_first_row() {
        let exec = MockExecutor::new().respond(result_with_rows(vec![
            vec![
                Value::Null,
                Value::Str("d1".to_string()),
                Value::Float(1.0),
                Value::Null,
            ],
            vec![
                Value::Null,
                Value::Str("d2".to_string()),
                Value::Float(2.0),
                Value::Null,
            ],
        ]));
        let statements = exec.statements();
        let db = Db::new(exec);

        let mut record = Reading::default();
        let tx = db.first_into(&mut record);

        assert!(tx.err().is_none());
        assert_eq!(record.device, "d1");
        assert_eq!(record.current, Some(1.0));
        assert!(statements.lock()[0].ends_with(" LIMIT 1"));
    }

    #[test]
    fn test_query_failure_is_recorded() {
        let exec = MockExecutor::new().fail_on("SELECT");
        let db = Db::new(exec);

        let mut rows: Vec<Reading> = Vec::new();
        let tx = db.find_into(&mut rows);

        assert!(matches!(
            tx.errors().first(),
            Some(OrmError::Execution(_))
        ));
        assert!(rows.is_empty());
    }
}
