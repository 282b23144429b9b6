//! Fluent statement state.
//!
//! A [`Statement`] accumulates the chained predicate/ordering/paging state
//! of a query. It is copy-on-write: every chain operation on
//! [`Db`](crate::db::Db) clones the statement first (a deep copy, since all
//! list-valued fields are owned `Vec`s), so two chains branched from the
//! same base never observe each other's mutations.
//!
//! No validation happens at this layer. Malformed predicate text or
//! conflicting limit/offset values pass through to the renderer as-is.

use crate::value::Value;

/// Accumulated query-builder state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    /// Explicit destination/source table, when set with `Db::table`.
    pub table: Option<String>,
    /// Select-list entries; empty means `*`.
    pub selects: Vec<String>,
    /// Opaque predicate fragments, AND-joined at render time.
    pub conditions: Vec<String>,
    /// Positional arguments for `?` placeholders across all fragments.
    pub args: Vec<Value>,
    /// ORDER BY text.
    pub order: Option<String>,
    /// GROUP BY text.
    pub group: Option<String>,
    /// LIMIT value.
    pub limit: Option<u64>,
    /// OFFSET value.
    pub offset: Option<u64>,
}

impl Statement {
    /// Creates an empty statement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the select list, defaulting to `*`.
    pub fn select_list(&self) -> String {
        if self.selects.is_empty() {
            "*".to_string()
        } else {
            self.selects.join(", ")
        }
    }

    /// Renders the WHERE clause with a leading space, or an empty string
    /// when no predicate was added. Placeholders are left unresolved here.
    pub fn render_where(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}
