//! Batch-insert grouping engine.
//!
//! The write path partitions an arbitrary slice of records into the
//! minimal number of column-homogeneous INSERT statements:
//!
//! 1. rows are grouped by destination table (chain override, per-row
//!    override, or the family name for untagged schemas);
//! 2. within a destination, rows are grouped by *column signature* — the
//!    ordered list of columns whose value is present;
//! 3. each signature group renders one multi-row INSERT, with tag literals
//!    taken from the group's first row.
//!
//! Groups execute independently: a failing group is recorded on the error
//! list and the remaining groups still run, so partial success is an
//! accepted outcome.

use crate::db::Db;
use crate::error::OrmError;
use crate::schema::{schema_of, Record, Schema};
use crate::value::sql_literal;

struct DestinationGroup<'a, T> {
    table: String,
    rows: Vec<&'a T>,
}

struct SignatureGroup<'a, T> {
    key: String,
    columns: Vec<String>,
    rows: Vec<&'a T>,
}

impl Db {
    /// Inserts a batch of records.
    ///
    /// An empty slice is a no-op. A row with no resolvable destination
    /// records a [`OrmError::MissingDestination`] and is skipped; the
    /// other destination groups are still attempted.
    pub fn create<T: Record>(&self, rows: &[T]) -> Db {
        let mut tx = self.fork();
        if rows.is_empty() {
            return tx;
        }

        let schema = schema_of::<T>();

        let mut groups: Vec<DestinationGroup<'_, T>> = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let destination = tx
                .statement()
                .table
                .clone()
                .or_else(|| row.table_name())
                .or_else(|| {
                    if schema.has_tags() {
                        None
                    } else {
                        Some(schema.family.clone())
                    }
                });
            let Some(table) = destination else {
                tx.record_error(OrmError::MissingDestination { index });
                continue;
            };
            match groups.iter_mut().find(|g| g.table == table) {
                Some(group) => group.rows.push(row),
                None => groups.push(DestinationGroup {
                    table,
                    rows: vec![row],
                }),
            }
        }

        for group in &groups {
            tx.insert_destination_group(&schema, &group.table, &group.rows);
        }
        tx
    }

    /// Inserts a single record through the identical grouping path.
    pub fn create_one<T: Record>(&self, row: &T) -> Db {
        self.create(std::slice::from_ref(row))
    }

    /// Signature-groups and executes one destination group.
    fn insert_destination_group<T: Record>(
        &mut self,
        schema: &Schema,
        table: &str,
        rows: &[&T],
    ) {
        // Tags are read once from the first row. Equality across the rest
        // of the group is not re-validated; see DESIGN.md.
        let tag_literals: Vec<String> = schema
            .tags()
            .map(|tag| match rows[0].value(&tag.name) {
                Some(value) => sql_literal(&value),
                None => "NULL".to_string(),
            })
            .collect();

        let mut groups: Vec<SignatureGroup<'_, T>> = Vec::new();
        for row in rows {
            let mut key = String::new();
            let mut columns = Vec::new();
            for field in schema.cols() {
                if row.value(&field.name).is_some() {
                    key.push_str(&field.name);
                    key.push(',');
                    columns.push(field.name.clone());
                }
            }
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.rows.push(row),
                None => groups.push(SignatureGroup {
                    key,
                    columns,
                    rows: vec![row],
                }),
            }
        }

        for group in &groups {
            let sql = render_insert(schema, table, &group.columns, &tag_literals, &group.rows);
            self.log_and_execute(&sql);
        }
    }
}

/// Renders one INSERT for a signature group.
fn render_insert<T: Record>(
    schema: &Schema,
    table: &str,
    columns: &[String],
    tag_literals: &[String],
    rows: &[&T],
) -> String {
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let literals: Vec<String> = columns
            .iter()
            .map(|column| match row.value(column) {
                Some(value) => sql_literal(&value),
                None => "NULL".to_string(),
            })
            .collect();
        tuples.push(format!("({})", literals.join(", ")));
    }

    if schema.has_tags() {
        format!(
            "INSERT INTO {} ({}) USING {} TAGS ({}) VALUES {}",
            table,
            columns.join(", "),
            schema.family,
            tag_literals.join(", "),
            tuples.join(", ")
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            columns.join(", "),
            tuples.join(", ")
        )
    }
}
