//! Error types for the ORM.

use std::fmt;
use thiserror::Error;

/// ORM error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrmError {
    /// No destination table could be resolved for a row.
    #[error(
        "no destination table for row {index}: set a table with Db::table or implement Record::table_name"
    )]
    MissingDestination {
        /// Zero-based index of the row within the batch.
        index: usize,
    },

    /// Schema description failed.
    ///
    /// Declared for completeness; introspection currently always succeeds
    /// by falling back to defaults.
    #[error("schema error: {0}")]
    Schema(String),

    /// The execution channel rejected a statement.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Decoding a result row into a record failed.
    #[error("scan failed on column `{column}`: {message}")]
    Scan {
        /// Column whose value could not be assigned.
        column: String,
        /// Reason the assignment failed.
        message: String,
    },
}

/// Result type alias for ORM operations.
pub type OrmResult<T> = std::result::Result<T, OrmError>;

/// An ordered collection of errors accumulated across a call chain.
///
/// Independent insert groups execute even after earlier groups fail, so a
/// single terminal call can surface more than one error. Each failure keeps
/// its own typed value and position; `Display` joins them with `"; "`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorList {
    errors: Vec<OrmError>,
}

impl ErrorList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error. Earlier errors are never overwritten.
    pub fn push(&mut self, err: OrmError) {
        self.errors.push(err);
    }

    /// Appends every error from another list.
    pub fn extend(&mut self, other: ErrorList) {
        self.errors.extend(other.errors);
    }

    /// Returns true if no error has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the first recorded error, if any.
    pub fn first(&self) -> Option<&OrmError> {
        self.errors.first()
    }

    /// Iterates over the recorded errors in order.
    pub fn iter(&self) -> impl Iterator<Item = &OrmError> {
        self.errors.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl From<OrmError> for ErrorList {
    fn from(err: OrmError) -> Self {
        Self { errors: vec![err] }
    }
}

impl IntoIterator for ErrorList {
    type Item = OrmError;
    type IntoIter = std::vec::IntoIter<OrmError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrmError::MissingDestination { index: 3 };
        assert!(err.to_string().contains("row 3"));

        let err = OrmError::Scan {
            column: "voltage".to_string(),
            message: "not an integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "scan failed on column `voltage`: not an integer"
        );
    }

    #[test]
    fn test_error_list_accumulates_in_order() {
        let mut list = ErrorList::new();
        assert!(list.is_empty());

        list.push(OrmError::MissingDestination { index: 0 });
        list.push(OrmError::Execution("table does not exist".to_string()));

        assert_eq!(list.len(), 2);
        assert_eq!(list.first(), Some(&OrmError::MissingDestination { index: 0 }));

        let rendered = list.to_string();
        assert!(rendered.contains("row 0"));
        assert!(rendered.contains("; execution failed: table does not exist"));
    }

    #[test]
    fn test_error_list_from_single() {
        let list: ErrorList = OrmError::Execution("boom".to_string()).into();
        assert_eq!(list.len(), 1);
    }
}
