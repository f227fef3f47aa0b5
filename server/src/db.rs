//! In-memory table store that enforces the migrated schema.
//!
//! # Design
//! Rows are JSON objects keyed by column name. Every write is checked against
//! the table's `ColumnDef`s: unknown columns and mistyped values are rejected,
//! missing columns fall back to their default (or null when nullable), and
//! `id` / `created_at` / `updated_at` are managed by the store itself.
//! Typed models convert from rows with `serde_json::from_value`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::migrations::{self, MigrationError, Migrator};
use crate::schema::{ColumnDef, ColumnType, Schema, TableDef};

pub type Row = Map<String, Value>;

const MANAGED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Debug, Error)]
pub enum DbError {
    #[error("table `{0}` does not exist")]
    NoSuchTable(String),

    #[error("{table} {id} not found")]
    RecordNotFound { table: String, id: i64 },

    #[error("unknown column `{column}` for `{table}`")]
    UnknownColumn { table: String, column: String },

    #[error("`{column}` can't be blank")]
    NotNull { column: String },

    #[error("`{column}` is not a valid {expected}")]
    TypeMismatch { column: String, expected: &'static str },

    #[error("row could not be decoded: {0}")]
    Decode(String),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Default)]
struct TableRows {
    next_id: i64,
    rows: BTreeMap<i64, Row>,
}

#[derive(Debug)]
pub struct Database {
    schema: Schema,
    migrator: Migrator,
    tables: HashMap<String, TableRows>,
}

impl Database {
    /// Runs every migration against an empty schema.
    pub fn migrated() -> Result<Self, DbError> {
        let mut migrator = Migrator::new(migrations::all())?;
        let mut schema = Schema::new();
        let ran = migrator.run_pending(&mut schema)?;
        log::debug!("schema ready after {} migrations", ran.len());

        let tables = schema
            .table_names()
            .map(|name| (name.to_string(), TableRows::default()))
            .collect();
        Ok(Self {
            schema,
            migrator,
            tables,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn migrator(&self) -> &Migrator {
        &self.migrator
    }

    pub fn insert(&mut self, table: &str, values: Row) -> Result<Row, DbError> {
        let def = self.table_def(table)?;
        let mut row = Row::new();
        for (column, value) in values {
            let col = column_def(def, &column)?;
            row.insert(column, coerce(col, value)?);
        }
        for col in &def.columns {
            if MANAGED_COLUMNS.contains(&col.name.as_str()) || row.contains_key(&col.name) {
                continue;
            }
            let value = match (&col.default, col.nullable) {
                (Some(default), _) => default.clone(),
                (None, true) => Value::Null,
                (None, false) => {
                    return Err(DbError::NotNull {
                        column: col.name.clone(),
                    })
                }
            };
            row.insert(col.name.clone(), value);
        }
        let stamp = def.has_timestamps();

        let rows = self.rows_mut(table)?;
        rows.next_id += 1;
        let id = rows.next_id;
        row.insert("id".to_string(), Value::from(id));
        if stamp {
            let now = Value::from(now());
            row.insert("created_at".to_string(), now.clone());
            row.insert("updated_at".to_string(), now);
        }
        rows.rows.insert(id, row.clone());
        Ok(row)
    }

    pub fn update(&mut self, table: &str, id: i64, values: Row) -> Result<Row, DbError> {
        let def = self.table_def(table)?;
        let mut changes = Row::new();
        for (column, value) in values {
            let col = column_def(def, &column)?;
            changes.insert(column, coerce(col, value)?);
        }
        let stamp = def.has_timestamps();

        let rows = self.rows_mut(table)?;
        let row = rows.rows.get_mut(&id).ok_or_else(|| DbError::RecordNotFound {
            table: table.to_string(),
            id,
        })?;
        row.extend(changes);
        if stamp {
            row.insert("updated_at".to_string(), Value::from(now()));
        }
        Ok(row.clone())
    }

    pub fn find(&self, table: &str, id: i64) -> Result<Row, DbError> {
        self.rows(table)?
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::RecordNotFound {
                table: table.to_string(),
                id,
            })
    }

    pub fn all(&self, table: &str) -> Result<Vec<Row>, DbError> {
        Ok(self.rows(table)?.rows.values().cloned().collect())
    }

    pub fn where_eq(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>, DbError> {
        Ok(self
            .rows(table)?
            .rows
            .values()
            .filter(|row| row.get(column) == Some(value))
            .cloned()
            .collect())
    }

    pub fn delete(&mut self, table: &str, id: i64) -> Result<Row, DbError> {
        self.rows_mut(table)?
            .rows
            .remove(&id)
            .ok_or_else(|| DbError::RecordNotFound {
                table: table.to_string(),
                id,
            })
    }

    fn table_def(&self, table: &str) -> Result<&TableDef, DbError> {
        self.schema
            .table(table)
            .ok_or_else(|| DbError::NoSuchTable(table.to_string()))
    }

    fn rows(&self, table: &str) -> Result<&TableRows, DbError> {
        self.tables
            .get(table)
            .ok_or_else(|| DbError::NoSuchTable(table.to_string()))
    }

    fn rows_mut(&mut self, table: &str) -> Result<&mut TableRows, DbError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| DbError::NoSuchTable(table.to_string()))
    }
}

/// Decodes a row into a typed model.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, DbError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| DbError::Decode(e.to_string()))
}

/// Serializes a model into row values, dropping `None` fields so that
/// column defaults still apply.
pub fn to_row<T: serde::Serialize>(value: &T) -> Result<Row, DbError> {
    match serde_json::to_value(value).map_err(|e| DbError::Decode(e.to_string()))? {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        _ => Err(DbError::Decode("expected an object".to_string())),
    }
}

pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn column_def<'a>(def: &'a TableDef, column: &str) -> Result<&'a ColumnDef, DbError> {
    if MANAGED_COLUMNS.contains(&column) {
        return Err(DbError::UnknownColumn {
            table: def.name.clone(),
            column: column.to_string(),
        });
    }
    def.get(column).ok_or_else(|| DbError::UnknownColumn {
        table: def.name.clone(),
        column: column.to_string(),
    })
}

fn coerce(col: &ColumnDef, value: Value) -> Result<Value, DbError> {
    if value.is_null() {
        return if col.nullable {
            Ok(Value::Null)
        } else {
            Err(DbError::NotNull {
                column: col.name.clone(),
            })
        };
    }
    let mismatch = |expected| DbError::TypeMismatch {
        column: col.name.clone(),
        expected,
    };
    match &col.ty {
        ColumnType::String | ColumnType::Text => match value {
            Value::String(_) => Ok(value),
            _ => Err(mismatch("string")),
        },
        ColumnType::Integer | ColumnType::References(_) => match value.as_i64() {
            Some(n) => Ok(Value::from(n)),
            None => Err(mismatch("integer")),
        },
        ColumnType::Decimal { precision, scale } => {
            let n = value.as_f64().ok_or_else(|| mismatch("decimal"))?;
            let factor = 10f64.powi(i32::from(*scale));
            let rounded = (n * factor).round() / factor;
            // at most `precision - scale` digits before the point
            let limit = 10f64.powi(i32::from(*precision) - i32::from(*scale));
            if rounded.abs() >= limit {
                return Err(mismatch("decimal in range"));
            }
            Number::from_f64(rounded)
                .map(Value::Number)
                .ok_or_else(|| mismatch("decimal"))
        }
        ColumnType::Boolean => match value {
            Value::Bool(_) => Ok(value),
            _ => Err(mismatch("boolean")),
        },
        ColumnType::Date => match value.as_str().map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d")) {
            Some(Ok(_)) => Ok(value),
            _ => Err(mismatch("date")),
        },
        ColumnType::DateTime => match value.as_str().map(DateTime::parse_from_rfc3339) {
            Some(Ok(_)) => Ok(value),
            _ => Err(mismatch("datetime")),
        },
    }
}
