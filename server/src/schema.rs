//! Relational schema model that migrations evolve.
//!
//! # Design
//! The schema is plain data: tables own an ordered list of column
//! definitions. `Database` consults it on every write, so a column only
//! exists once a migration has added it.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Storage type of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Text,
    Integer,
    Decimal { precision: u8, scale: u8 },
    Boolean,
    Date,
    DateTime,
    /// Integer id of a row in the named table.
    References(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub default: Option<Value>,
}

impl ColumnDef {
    /// A NOT NULL column without a default.
    pub fn new(name: &str, ty: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            nullable: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds the managed `created_at` / `updated_at` pair.
    pub fn timestamps(self) -> Self {
        self.column(ColumnDef::new("created_at", ColumnType::DateTime))
            .column(ColumnDef::new("updated_at", ColumnType::DateTime))
    }

    pub fn get(&self, column: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == column)
    }

    pub fn has_timestamps(&self) -> bool {
        self.get("created_at").is_some() && self.get("updated_at").is_some()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table `{0}` already exists")]
    TableExists(String),

    #[error("table `{0}` does not exist")]
    TableMissing(String),

    #[error("column `{column}` already exists on `{table}`")]
    ColumnExists { table: String, column: String },
}

/// One forward change against a `Schema`.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaChange {
    CreateTable(TableDef),
    AddColumn { table: String, column: ColumnDef },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    tables: BTreeMap<String, TableDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn create_table(&mut self, table: TableDef) -> Result<(), SchemaError> {
        if self.tables.contains_key(&table.name) {
            return Err(SchemaError::TableExists(table.name));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn add_column(&mut self, table: &str, column: ColumnDef) -> Result<(), SchemaError> {
        let def = self
            .tables
            .get_mut(table)
            .ok_or_else(|| SchemaError::TableMissing(table.to_string()))?;
        if def.get(&column.name).is_some() {
            return Err(SchemaError::ColumnExists {
                table: table.to_string(),
                column: column.name,
            });
        }
        def.columns.push(column);
        Ok(())
    }

    pub fn apply(&mut self, change: &SchemaChange) -> Result<(), SchemaError> {
        match change {
            SchemaChange::CreateTable(table) => self.create_table(table.clone()),
            SchemaChange::AddColumn { table, column } => self.add_column(table, column.clone()),
        }
    }
}
