//! Idempotent table-family creation.

use crate::db::Db;
use crate::error::OrmResult;
use crate::schema::{schema_of, Record, Schema};

impl Db {
    /// Creates the table family for a record type if it does not exist.
    ///
    /// Never alters an existing family's column set; schema drift is the
    /// caller's concern.
    pub fn auto_migrate<T: Record>(&self) -> OrmResult<()> {
        let schema = schema_of::<T>();
        let sql = create_family_sql(&schema);
        if self.config().log_sql {
            tracing::info!("executing SQL: {}", sql);
        } else {
            tracing::debug!("executing SQL: {}", sql);
        }
        self.executor().execute(&sql)?;
        Ok(())
    }
}

/// Renders the CREATE statement for a schema: a super-table with a TAGS
/// clause when tags are declared, a plain table otherwise.
pub fn create_family_sql(schema: &Schema) -> String {
    let column_defs: Vec<String> = schema
        .cols()
        .map(|f| format!("{} {}", f.name, f.data_type))
        .collect();

    if schema.has_tags() {
        let tag_defs: Vec<String> = schema
            .tags()
            .map(|f| format!("{} {}", f.name, f.data_type))
            .collect();
        format!(
            "CREATE STABLE IF NOT EXISTS {} ({}) TAGS ({})",
            schema.family,
            column_defs.join(", "),
            tag_defs.join(", ")
        )
    } else {
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            schema.family,
            column_defs.join(", ")
        )
    }
}
