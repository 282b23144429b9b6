//! Shared test fixtures: a scripted executor and sample record types.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{OrmError, OrmResult};
use crate::executor::{Executor, ResultSet};
use crate::schema::{Field, Record, Schema};
use crate::value::{scan, scan_opt, Value};

/// Records every statement it receives and serves scripted results.
pub(crate) struct MockExecutor {
    statements: Arc<Mutex<Vec<String>>>,
    responses: Mutex<VecDeque<ResultSet>>,
    fail_on: Option<String>,
    affected: u64,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self {
            statements: Arc::new(Mutex::new(Vec::new())),
            responses: Mutex::new(VecDeque::new()),
            fail_on: None,
            affected: 1,
        }
    }

    /// Affected-row count reported per successful execute.
    pub(crate) fn affected(mut self, rows: u64) -> Self {
        self.affected = rows;
        self
    }

    /// Any statement containing `needle` fails.
    pub(crate) fn fail_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Queues a result set for the next query.
    pub(crate) fn respond(self, result: ResultSet) -> Self {
        self.responses.lock().push_back(result);
        self
    }

    /// Handle onto the recorded statements, usable after the executor has
    /// been moved into a `Db`.
    pub(crate) fn statements(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.statements)
    }

    fn check(&self, sql: &str) -> OrmResult<()> {
        self.statements.lock().push(sql.to_string());
        if let Some(needle) = &self.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(OrmError::Execution(format!("rejected: {}", sql)));
            }
        }
        Ok(())
    }
}

impl Executor for MockExecutor {
    fn execute(&self, sql: &str) -> OrmResult<u64> {
        self.check(sql)?;
        Ok(self.affected)
    }

    fn query(&self, sql: &str) -> OrmResult<ResultSet> {
        self.check(sql)?;
        Ok(self.responses.lock().pop_front().unwrap_or_default())
    }
}

/// A tagged meter reading routed to a per-device subtable.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Reading {
    pub ts: Option<DateTime<Utc>>,
    pub device: String,
    pub current: Option<f64>,
    pub voltage: Option<i32>,
    pub phase: Option<f32>,
}

impl Record for Reading {
    fn describe() -> Schema {
        Schema::new("reading")
            .field(Field::of::<DateTime<Utc>>("Ts").primary_key())
            .field(Field::of::<String>("Device").tag())
            .field(Field::of::<f64>("Current"))
            .field(Field::of::<i32>("Voltage"))
            .field(Field::of::<f32>("Phase"))
    }

    fn table_name(&self) -> Option<String> {
        if self.device.is_empty() {
            None
        } else {
            Some(format!("dev_{}", self.device))
        }
    }

    fn value(&self, column: &str) -> Option<Value> {
        match column {
            "ts" => self.ts.map(Value::from),
            "device" => Some(Value::from(self.device.clone())),
            "current" => self.current.map(Value::from),
            "voltage" => self.voltage.map(Value::from),
            "phase" => self.phase.map(Value::from),
            _ => None,
        }
    }

    fn assign(&mut self, column: &str, value: &Value) -> OrmResult<()> {
        match column {
            "ts" => self.ts = scan_opt(column, value)?,
            "device" => self.device = scan(column, value)?,
            "current" => self.current = scan_opt(column, value)?,
            "voltage" => self.voltage = scan_opt(column, value)?,
            "phase" => self.phase = scan_opt(column, value)?,
            _ => {}
        }
        Ok(())
    }
}

/// An untagged record; writes default to the family table.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BareCounter {
    pub hits: Option<i64>,
    pub note: Option<String>,
}

impl Record for BareCounter {
    fn describe() -> Schema {
        // Empty family name: defaults to the snake-cased type name.
        Schema::default()
            .field(Field::of::<i64>("Hits"))
            .field(Field::of::<String>("Note"))
    }

    fn value(&self, column: &str) -> Option<Value> {
        match column {
            "hits" => self.hits.map(Value::from),
            "note" => self.note.clone().map(Value::from),
            _ => None,
        }
    }

    fn assign(&mut self, column: &str, value: &Value) -> OrmResult<()> {
        match column {
            "hits" => self.hits = scan_opt(column, value)?,
            "note" => self.note = scan_opt(column, value)?,
            _ => {}
        }
        Ok(())
    }
}
