//! The execution channel collaborator.
//!
//! The ORM renders complete SQL text and hands it to an [`Executor`]; it
//! never sends bound parameters. Connection management, pooling and
//! transport concerns live entirely behind this trait.

use crate::error::OrmResult;
use crate::value::Value;

/// A column-named result set returned by a read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names, in result order.
    pub columns: Vec<String>,
    /// Row data; each row is positionally aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates an empty result set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Executes rendered SQL against the database.
///
/// Implementations are expected to serialize or pool internally; the ORM
/// itself holds no lock around the channel. Failures surface as
/// [`OrmError::Execution`](crate::error::OrmError::Execution).
pub trait Executor: Send + Sync {
    /// Executes a write statement, returning the affected-row count.
    fn execute(&self, sql: &str) -> OrmResult<u64>;

    /// Executes a read statement, returning a column-named result set.
    fn query(&self, sql: &str) -> OrmResult<ResultSet>;
}
