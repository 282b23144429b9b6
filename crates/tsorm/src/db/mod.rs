//! The chain handle.
//!
//! [`Db`] is the entry point for every operation. Chain operations fork the
//! handle — the statement is cloned, the error list is carried — and return
//! the fork, so branched chains are fully independent. Terminal operations
//! (`create`, `find_into`, `exec`, `auto_migrate`) consume the accumulated
//! statement state.
//!
//! A chain already carrying an error still executes later calls; failures
//! append to the list and are inspected after the terminal call.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorList, OrmError};
use crate::executor::{Executor, ResultSet};
use crate::statement::Statement;
use crate::value::{explain, Value};

/// Client-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Log every rendered statement at INFO instead of DEBUG.
    pub log_sql: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { log_sql: false }
    }
}

impl DbConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets SQL logging.
    pub fn log_sql(mut self, log_sql: bool) -> Self {
        self.log_sql = log_sql;
        self
    }
}

/// ORM handle over an execution channel.
#[derive(Clone)]
pub struct Db {
    executor: Arc<dyn Executor>,
    config: DbConfig,
    stmt: Statement,
    errors: ErrorList,
    rows_affected: u64,
}

impl Db {
    /// Creates a handle over an executor with default configuration.
    pub fn new(executor: impl Executor + 'static) -> Self {
        Self::with_config(executor, DbConfig::default())
    }

    /// Creates a handle with explicit configuration.
    pub fn with_config(executor: impl Executor + 'static, config: DbConfig) -> Self {
        Self::from_arc(Arc::new(executor), config)
    }

    /// Creates a handle from a shared executor.
    pub fn from_arc(executor: Arc<dyn Executor>, config: DbConfig) -> Self {
        Self {
            executor,
            config,
            stmt: Statement::new(),
            errors: ErrorList::new(),
            rows_affected: 0,
        }
    }

    /// Forks the chain: statement and errors carry over, the affected-row
    /// counter resets for the new terminal call.
    pub(crate) fn fork(&self) -> Self {
        let mut tx = self.clone();
        tx.rows_affected = 0;
        tx
    }

    // =========================================================================
    // Chain operations
    // =========================================================================

    /// Fixes the destination/source table for the chain.
    pub fn table(&self, name: impl Into<String>) -> Self {
        let mut tx = self.fork();
        tx.stmt.table = Some(name.into());
        tx
    }

    /// Appends a predicate fragment with positional `?` arguments.
    /// Fragments are AND-joined at render time.
    pub fn filter(&self, condition: impl Into<String>, args: Vec<Value>) -> Self {
        let mut tx = self.fork();
        tx.stmt.conditions.push(condition.into());
        tx.stmt.args.extend(args);
        tx
    }

    /// Appends a select-list entry.
    pub fn select(&self, columns: impl Into<String>) -> Self {
        let mut tx = self.fork();
        tx.stmt.selects.push(columns.into());
        tx
    }

    /// Sets the ORDER BY text.
    pub fn order_by(&self, order: impl Into<String>) -> Self {
        let mut tx = self.fork();
        tx.stmt.order = Some(order.into());
        tx
    }

    /// Sets the GROUP BY text.
    pub fn group_by(&self, group: impl Into<String>) -> Self {
        let mut tx = self.fork();
        tx.stmt.group = Some(group.into());
        tx
    }

    /// Sets the LIMIT value.
    pub fn limit(&self, limit: u64) -> Self {
        let mut tx = self.fork();
        tx.stmt.limit = Some(limit);
        tx
    }

    /// Sets the OFFSET value.
    pub fn offset(&self, offset: u64) -> Self {
        let mut tx = self.fork();
        tx.stmt.offset = Some(offset);
        tx
    }

    // =========================================================================
    // Raw execution
    // =========================================================================

    /// Executes arbitrary SQL, resolving `?` placeholders to literals
    /// first. The affected-row count is recorded on the returned chain.
    pub fn exec(&self, sql: &str, args: Vec<Value>) -> Self {
        let mut tx = self.fork();
        let sql = explain(sql, &args);
        tx.log_and_execute(&sql);
        tx
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Rows affected by the most recent terminal call, counting only the
    /// statements that succeeded.
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Returns the accumulated errors, or `None` when the chain is clean.
    pub fn err(&self) -> Option<&ErrorList> {
        if self.errors.is_empty() {
            None
        } else {
            Some(&self.errors)
        }
    }

    /// Returns the accumulated error list, possibly empty.
    pub fn errors(&self) -> &ErrorList {
        &self.errors
    }

    /// Converts the chain into a result: the affected-row count on
    /// success, the accumulated errors otherwise.
    pub fn into_result(self) -> Result<u64, ErrorList> {
        if self.errors.is_empty() {
            Ok(self.rows_affected)
        } else {
            Err(self.errors)
        }
    }

    /// Current statement state.
    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    // =========================================================================
    // Internal plumbing
    // =========================================================================

    pub(crate) fn config(&self) -> &DbConfig {
        &self.config
    }

    pub(crate) fn record_error(&mut self, err: OrmError) {
        self.errors.push(err);
    }

    /// Executes one write statement; a failure is recorded without
    /// aborting the chain, a success adds to the affected-row total.
    pub(crate) fn log_and_execute(&mut self, sql: &str) {
        if self.config.log_sql {
            tracing::info!("executing SQL: {}", sql);
        } else {
            tracing::debug!("executing SQL: {}", sql);
        }
        match self.executor.execute(sql) {
            Ok(rows) => self.rows_affected += rows,
            Err(err) => self.errors.push(err),
        }
    }

    /// Executes one read statement.
    pub(crate) fn log_and_query(&mut self, sql: &str) -> Option<ResultSet> {
        if self.config.log_sql {
            tracing::info!("executing SQL: {}", sql);
        } else {
            tracing::debug!("executing SQL: {}", sql);
        }
        match self.executor.query(sql) {
            Ok(result) => Some(result),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    pub(crate) fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("statement", &self.stmt)
            .field("errors", &self.errors)
            .field("rows_affected", &self.rows_affected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExecutor;

    #[test]
    fn test_chain_branch_isolation() {
        let db = Db::new(MockExecutor::new());
        let base = db.table("meters").filter("device = ?", vec![Value::from("d1")]);

        let a = base.limit(10);
        let b = base.filter("current > ?", vec![Value::from(5.0)]).offset(3);

        // Branches never observe each other's mutations.
        assert_eq!(base.statement().conditions.len(), 1);
        assert_eq!(a.statement().limit, Some(10));
        assert_eq!(a.statement().conditions.len(), 1);
        assert_eq!(b.statement().limit, None);
        assert_eq!(b.statement().conditions.len(), 2);
        assert_eq!(b.statement().offset, Some(3));
    }

    #[test]
    fn test_exec_substitutes_and_records_rows() {
        let exec = MockExecutor::new().affected(4);
        let statements = exec.statements();
        let db = Db::new(exec);

        let tx = db.exec("DELETE FROM m WHERE device = ?", vec![Value::from("d1")]);
        assert!(tx.err().is_none());
        assert_eq!(tx.rows_affected(), 4);
        assert_eq!(
            statements.lock().as_slice(),
            ["DELETE FROM m WHERE device = 'd1'"]
        );
    }

    #[test]
    fn test_chain_with_error_still_executes() {
        let exec = MockExecutor::new();
        let statements = exec.statements();
        let mut db = Db::new(exec);
        db.record_error(OrmError::Execution("earlier failure".to_string()));

        let tx = db.exec("SELECT 1", vec![]);
        // The earlier error is carried, and the call still ran.
        assert_eq!(tx.errors().len(), 1);
        assert_eq!(statements.lock().len(), 1);
    }

    #[test]
    fn test_into_result() {
        let db = Db::new(MockExecutor::new().affected(2));
        assert_eq!(db.exec("INSERT ...", vec![]).into_result(), Ok(2));

        let failing = Db::new(MockExecutor::new().fail_on("INSERT"));
        let res = failing.exec("INSERT ...", vec![]).into_result();
        assert!(res.is_err());
    }
}
