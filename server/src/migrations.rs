//! Versioned, ordered schema migrations and the tracker that applies them.
//!
//! # Design
//! A `Migration` is a list of `SchemaChange`s tagged with a 14-digit version.
//! Applying one runs against a scratch copy of the schema and only commits
//! when every change succeeds. `Migrator` plays the role of the
//! `schema_migrations` table: it remembers which versions ran, so
//! `run_pending` is safe to call repeatedly, while re-running a migration
//! directly against an already migrated schema fails on the first duplicate
//! table or column.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::schema::{ColumnDef, ColumnType, Schema, SchemaChange, SchemaError, TableDef};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("migration {version} failed: {source}")]
    Schema {
        version: String,
        #[source]
        source: SchemaError,
    },

    #[error("migration {0} has already been applied")]
    AlreadyApplied(String),

    #[error("migration {0} is out of order or duplicated")]
    OutOfOrder(String),
}

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: &'static str,
    pub name: &'static str,
    pub changes: Vec<SchemaChange>,
}

impl Migration {
    /// `<version>_<name>`, the same identifier a migration file would carry.
    pub fn id(&self) -> String {
        format!("{}_{}", self.version, self.name)
    }

    /// Applies every change or none of them.
    pub fn apply(&self, schema: &mut Schema) -> Result<(), MigrationError> {
        let mut scratch = schema.clone();
        for change in &self.changes {
            scratch.apply(change).map_err(|source| MigrationError::Schema {
                version: self.version.to_string(),
                source,
            })?;
        }
        *schema = scratch;
        Ok(())
    }
}

#[derive(Debug)]
pub struct Migrator {
    migrations: Vec<Migration>,
    applied: BTreeSet<&'static str>,
}

impl Migrator {
    /// Rejects a migration set whose versions are not strictly increasing.
    pub fn new(migrations: Vec<Migration>) -> Result<Self, MigrationError> {
        for pair in migrations.windows(2) {
            if pair[0].version >= pair[1].version {
                return Err(MigrationError::OutOfOrder(pair[1].id()));
            }
        }
        Ok(Self {
            migrations,
            applied: BTreeSet::new(),
        })
    }

    pub fn is_applied(&self, version: &str) -> bool {
        self.applied.contains(version)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Migration> {
        self.migrations
            .iter()
            .filter(|m| !self.applied.contains(m.version))
    }

    /// Applies a single migration and records its version.
    pub fn apply(&mut self, migration: &Migration, schema: &mut Schema) -> Result<(), MigrationError> {
        if self.applied.contains(migration.version) {
            return Err(MigrationError::AlreadyApplied(migration.id()));
        }
        migration.apply(schema)?;
        log::info!("applied migration {}", migration.id());
        self.applied.insert(migration.version);
        Ok(())
    }

    /// Applies every pending migration in version order and returns the
    /// versions that ran. A second call returns an empty list.
    pub fn run_pending(&mut self, schema: &mut Schema) -> Result<Vec<&'static str>, MigrationError> {
        let pending: Vec<Migration> = self.pending().cloned().collect();
        let mut ran = Vec::with_capacity(pending.len());
        for migration in &pending {
            self.apply(migration, schema)?;
            ran.push(migration.version);
        }
        Ok(ran)
    }
}

/// Every migration, in version order.
pub fn all() -> Vec<Migration> {
    vec![
        create_users(),
        create_rooms(),
        create_bookings(),
        create_reviews(),
        create_inquiries(),
        add_payment_details_to_bookings(),
    ]
}

pub fn create_users() -> Migration {
    Migration {
        version: "20240101000001",
        name: "create_users",
        changes: vec![SchemaChange::CreateTable(
            TableDef::new("users")
                .column(ColumnDef::new("name", ColumnType::String))
                .column(ColumnDef::new("email", ColumnType::String))
                .column(ColumnDef::new("password_digest", ColumnType::String))
                .column(ColumnDef::new("phone", ColumnType::String).nullable())
                .column(ColumnDef::new("role", ColumnType::String).default_value("guest"))
                .column(ColumnDef::new("avatar", ColumnType::String).nullable())
                .column(ColumnDef::new("reset_password_token", ColumnType::String).nullable())
                .column(ColumnDef::new("reset_password_sent_at", ColumnType::DateTime).nullable())
                .timestamps(),
        )],
    }
}

pub fn create_rooms() -> Migration {
    Migration {
        version: "20240101000002",
        name: "create_rooms",
        changes: vec![SchemaChange::CreateTable(
            TableDef::new("rooms")
                .column(ColumnDef::new("name", ColumnType::String))
                .column(ColumnDef::new("description", ColumnType::Text))
                .column(ColumnDef::new(
                    "price",
                    ColumnType::Decimal {
                        precision: 10,
                        scale: 2,
                    },
                ))
                .column(ColumnDef::new("capacity", ColumnType::Integer))
                .column(ColumnDef::new("category", ColumnType::Integer))
                .column(ColumnDef::new("status", ColumnType::Integer).default_value(0))
                .column(ColumnDef::new("is_featured", ColumnType::Boolean).default_value(false))
                .timestamps(),
        )],
    }
}

pub fn create_bookings() -> Migration {
    Migration {
        version: "20240101000003",
        name: "create_bookings",
        changes: vec![SchemaChange::CreateTable(
            TableDef::new("bookings")
                .column(ColumnDef::new("user_id", ColumnType::References("users")))
                .column(ColumnDef::new("room_id", ColumnType::References("rooms")))
                .column(ColumnDef::new("check_in", ColumnType::Date))
                .column(ColumnDef::new("check_out", ColumnType::Date))
                .column(ColumnDef::new("guests", ColumnType::Integer).default_value(1))
                .column(ColumnDef::new(
                    "total_price",
                    ColumnType::Decimal {
                        precision: 10,
                        scale: 2,
                    },
                ))
                .column(ColumnDef::new("status", ColumnType::String).default_value("pending"))
                .timestamps(),
        )],
    }
}

pub fn create_reviews() -> Migration {
    Migration {
        version: "20240101000004",
        name: "create_reviews",
        changes: vec![SchemaChange::CreateTable(
            TableDef::new("reviews")
                .column(ColumnDef::new("user_id", ColumnType::References("users")))
                .column(ColumnDef::new("room_id", ColumnType::References("rooms")))
                .column(ColumnDef::new("rating", ColumnType::Integer))
                .column(ColumnDef::new("comment", ColumnType::Text))
                .timestamps(),
        )],
    }
}

pub fn create_inquiries() -> Migration {
    Migration {
        version: "20240115000001",
        name: "create_inquiries",
        changes: vec![SchemaChange::CreateTable(
            TableDef::new("inquiries")
                .column(ColumnDef::new("name", ColumnType::String))
                .column(ColumnDef::new("email", ColumnType::String))
                .column(ColumnDef::new("subject", ColumnType::String))
                .column(ColumnDef::new("message", ColumnType::Text))
                .column(ColumnDef::new("status", ColumnType::String).default_value("pending"))
                .timestamps(),
        )],
    }
}

pub fn add_payment_details_to_bookings() -> Migration {
    Migration {
        version: "20240120000001",
        name: "add_payment_details_to_bookings",
        changes: vec![
            SchemaChange::AddColumn {
                table: "bookings".to_string(),
                column: ColumnDef::new("payment_method", ColumnType::String).nullable(),
            },
            SchemaChange::AddColumn {
                table: "bookings".to_string(),
                column: ColumnDef::new("payment_status", ColumnType::String).nullable(),
            },
        ],
    }
}
