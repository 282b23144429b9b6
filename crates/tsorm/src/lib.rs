//! # tsorm
//!
//! Lightweight ORM for tag/super-table time-series databases.
//!
//! Records are plain Rust types that register an explicit schema: tags
//! identify and partition physical subtables, columns hold the
//! time-series data and may be structurally *absent* on a per-row basis.
//! The ORM generates correct DDL/DML, routes rows to the right subtable,
//! and rehydrates query results back into records. It includes:
//!
//! - **Schema registration**: per-type field descriptors with tag/column
//!   roles, storage types, and name defaults — no runtime reflection
//! - **Batch grouping engine**: heterogeneous batches are partitioned by
//!   destination table and column signature into the minimal number of
//!   column-homogeneous INSERT statements
//! - **Fluent queries**: copy-on-write statement chains with predicate,
//!   ordering and paging state
//! - **Result mapping**: rows scan back into records by column-name match
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tsorm::{Db, Field, Record, Schema, Value};
//!
//! let db = Db::new(my_connection);
//! db.auto_migrate::<Reading>()?;
//!
//! // Rows with different populated columns split into separate,
//! // column-homogeneous statements automatically.
//! let tx = db.create(&readings);
//! println!("wrote {} rows", tx.rows_affected());
//!
//! let mut recent: Vec<Reading> = Vec::new();
//! db.filter("device = ?", vec![Value::from("d1")])
//!     .order_by("ts DESC")
//!     .limit(100)
//!     .find_into(&mut recent);
//! ```
//!
//! All values are rendered as SQL literals; no bound parameters are ever
//! sent to the execution channel.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;

/// Values and literal rendering.
pub mod value;

/// Schema descriptors and the record contract.
pub mod schema;

/// Fluent statement state.
pub mod statement;

/// The execution channel collaborator.
pub mod executor;

/// The chain handle.
pub mod db;

/// Batch-insert grouping engine.
pub mod insert;

/// SELECT rendering and result scanning.
pub mod query;

/// Idempotent family creation.
pub mod ddl;

#[cfg(test)]
pub(crate) mod testing;

pub use db::{Db, DbConfig};
pub use ddl::create_family_sql;
pub use error::{ErrorList, OrmError, OrmResult};
pub use executor::{Executor, ResultSet};
pub use schema::{
    schema_of, to_snake_case, ColumnType, DataType, Field, FieldRole, Record, Schema,
};
pub use statement::Statement;
pub use value::{explain, scan, scan_opt, sql_literal, FromValue, Value};
