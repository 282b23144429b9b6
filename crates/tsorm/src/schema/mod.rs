//! Record schema descriptors.
//!
//! A record type registers its schema explicitly through the [`Record`]
//! trait: an ordered list of fields, each carrying a column name, a role
//! (tag or column) and a storage type, plus a value accessor/mutator pair.
//! There is no runtime reflection; everything the write and read paths need
//! is declared once per type and cached by `TypeId`.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::OrmResult;
use crate::value::Value;

/// Default width for text and binary columns.
pub const DEFAULT_BINARY_WIDTH: u32 = 64;

/// Physical storage type of a column or tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// Boolean.
    Bool,
    /// 32-bit or narrower signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit or narrower unsigned integer.
    UInt,
    /// 64-bit unsigned integer.
    UBigInt,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Fixed-width binary string.
    Binary(u32),
    /// Timestamp.
    Timestamp,
    /// Raw type text supplied through a `type:` annotation.
    Raw(String),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "BOOL"),
            DataType::Int => write!(f, "INT"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::UInt => write!(f, "INT UNSIGNED"),
            DataType::UBigInt => write!(f, "BIGINT UNSIGNED"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Binary(width) => write!(f, "BINARY({})", width),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Raw(text) => write!(f, "{}", text),
        }
    }
}

/// Maps a native type to its default storage type.
///
/// This is the fixed mapping applied when a field declares no `type:`
/// override.
pub trait ColumnType {
    /// Storage type inferred for this native type.
    const DATA_TYPE: DataType;
}

impl ColumnType for bool {
    const DATA_TYPE: DataType = DataType::Bool;
}

impl ColumnType for i8 {
    const DATA_TYPE: DataType = DataType::Int;
}

impl ColumnType for i16 {
    const DATA_TYPE: DataType = DataType::Int;
}

impl ColumnType for i32 {
    const DATA_TYPE: DataType = DataType::Int;
}

impl ColumnType for i64 {
    const DATA_TYPE: DataType = DataType::BigInt;
}

impl ColumnType for u8 {
    const DATA_TYPE: DataType = DataType::UInt;
}

impl ColumnType for u16 {
    const DATA_TYPE: DataType = DataType::UInt;
}

impl ColumnType for u32 {
    const DATA_TYPE: DataType = DataType::UInt;
}

impl ColumnType for u64 {
    const DATA_TYPE: DataType = DataType::UBigInt;
}

impl ColumnType for f32 {
    const DATA_TYPE: DataType = DataType::Float;
}

impl ColumnType for f64 {
    const DATA_TYPE: DataType = DataType::Double;
}

impl ColumnType for String {
    const DATA_TYPE: DataType = DataType::Binary(DEFAULT_BINARY_WIDTH);
}

impl ColumnType for &str {
    const DATA_TYPE: DataType = DataType::Binary(DEFAULT_BINARY_WIDTH);
}

impl ColumnType for Vec<u8> {
    const DATA_TYPE: DataType = DataType::Binary(DEFAULT_BINARY_WIDTH);
}

impl ColumnType for DateTime<Utc> {
    const DATA_TYPE: DataType = DataType::Timestamp;
}

impl<T: ColumnType> ColumnType for Option<T> {
    const DATA_TYPE: DataType = T::DATA_TYPE;
}

/// Classification of a registered field.
///
/// Fields that are neither tags nor columns are simply not registered;
/// that is the "ignored" class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Identifies and partitions a physical subtable. Supplied once per
    /// INSERT, fixed per subtable.
    Tag,
    /// Time-series data; may be structurally absent on a per-row basis.
    Column,
}

/// Descriptor for a single registered field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name. Defaults to the snake-cased declared name.
    pub name: String,
    /// Tag or column.
    pub role: FieldRole,
    /// Physical storage type.
    pub data_type: DataType,
    /// Informational only; not enforced anywhere.
    pub primary_key: bool,
}

impl Field {
    /// Creates a column field with an explicit storage type. The name is
    /// snake-cased.
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: to_snake_case(name),
            role: FieldRole::Column,
            data_type,
            primary_key: false,
        }
    }

    /// Creates a column field whose storage type is inferred from `T`.
    pub fn of<T: ColumnType>(name: &str) -> Self {
        Self::new(name, T::DATA_TYPE)
    }

    /// Marks the field as a tag.
    pub fn tag(mut self) -> Self {
        self.role = FieldRole::Tag;
        self
    }

    /// Marks the field as the primary key (informational).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Replaces the column name verbatim (no snake-case transform).
    pub fn column_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the storage type.
    pub fn storage(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Applies a field annotation string.
    ///
    /// Semicolon-separated `key[:value]` pairs, keys case-insensitive:
    /// `column:<name>` renames, `tag` reclassifies, `primarykey` flags,
    /// `type:<raw>` overrides the storage type. Unknown keys are ignored
    /// and parsing never fails.
    pub fn spec(mut self, spec: &str) -> Self {
        let settings = parse_field_spec(spec);
        if let Some(name) = settings.get("COLUMN") {
            self.name = name.clone();
        }
        if settings.contains_key("TAG") {
            self.role = FieldRole::Tag;
        }
        if settings.contains_key("PRIMARYKEY") {
            self.primary_key = true;
        }
        if let Some(raw) = settings.get("TYPE") {
            self.data_type = DataType::Raw(raw.clone());
        }
        self
    }
}

/// Parses a field annotation into uppercase key/value settings.
///
/// A key without a value maps to itself, so presence checks work for
/// value-less keys like `tag`.
fn parse_field_spec(spec: &str) -> HashMap<String, String> {
    let mut settings = HashMap::new();
    for part in spec.split(';') {
        let mut halves = part.splitn(2, ':');
        let key = halves.next().unwrap_or("").trim().to_uppercase();
        if key.is_empty() {
            continue;
        }
        match halves.next() {
            Some(value) => settings.insert(key, value.to_string()),
            None => settings.insert(key.clone(), key),
        };
    }
    settings
}

/// Derived metadata for a record type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Logical family (super-table) name. Left empty in a descriptor, it
    /// defaults to the snake-cased type name during resolution.
    pub family: String,
    /// All registered fields, in declaration order.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema with an explicit family name.
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, preserving declaration order.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Iterates tag fields in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.role == FieldRole::Tag)
    }

    /// Iterates column fields in declaration order.
    pub fn cols(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.role == FieldRole::Column)
    }

    /// Returns true if any field is a tag.
    pub fn has_tags(&self) -> bool {
        self.tags().next().is_some()
    }

    /// Looks up a field by column name, case-sensitively. Tags and columns
    /// both participate so scans can populate tag fields too.
    pub fn field_by_column(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A persistable record.
///
/// Implementations describe their schema once and expose per-column value
/// access. The accessor returns `None` for an *absent* column, meaning
/// "omit from the statement" — never NULL and never the type's zero value.
pub trait Record: 'static {
    /// Builds the static schema descriptor for this type.
    ///
    /// An empty family name defaults to the snake-cased type name.
    fn describe() -> Schema;

    /// Optional type-level family name override.
    fn family_name() -> Option<&'static str> {
        None
    }

    /// Optional per-instance destination table override.
    ///
    /// Evaluated per row, never cached, because it may depend on field
    /// values such as tags.
    fn table_name(&self) -> Option<String> {
        None
    }

    /// Returns the value of a column or tag, or `None` when absent.
    fn value(&self, column: &str) -> Option<Value>;

    /// Assigns a scanned value to the field mapped to `column`.
    fn assign(&mut self, column: &str, value: &Value) -> OrmResult<()>;
}

fn schema_cache() -> &'static RwLock<HashMap<TypeId, Arc<Schema>>> {
    static CACHE: OnceLock<RwLock<HashMap<TypeId, Arc<Schema>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolves the schema for a record type, from the process-wide cache when
/// available.
///
/// Family-name defaults and overrides are applied here, once per type. The
/// per-instance table override is deliberately not part of the cached
/// schema.
pub fn schema_of<T: Record>() -> Arc<Schema> {
    let id = TypeId::of::<T>();
    if let Some(schema) = schema_cache().read().get(&id) {
        return Arc::clone(schema);
    }

    let mut schema = T::describe();
    if let Some(family) = T::family_name() {
        schema.family = family.to_string();
    } else if schema.family.is_empty() {
        schema.family = to_snake_case(short_type_name::<T>());
    }

    let schema = Arc::new(schema);
    Arc::clone(
        schema_cache()
            .write()
            .entry(id)
            .or_insert(schema),
    )
}

/// Last path segment of the type name, without generics.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let tail = full.rsplit("::").next().unwrap_or(full);
    tail.split('<').next().unwrap_or(tail)
}

/// Snake-cases an identifier: an underscore is inserted before an
/// uppercase letter whose predecessor is not uppercase, so `DeviceID`
/// becomes `device_id`.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_upper = true;
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 && !prev_upper {
                out.push('_');
            }
            prev_upper = true;
        } else {
            prev_upper = false;
        }
        out.extend(ch.to_lowercase());
    }
    out
}
