//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per table.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories are only built over connections at the latest schema
//!   version (`try_new` guard).
//! - Lookups return `Option`; the service layer turns absence into
//!   `RepoError::NotFound`.

pub mod customer_repo;
pub mod reservation_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::customer_repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Table and column names a repository reads or writes.
pub(crate) struct RequiredTable {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub(crate) const CUSTOMERS_TABLE: RequiredTable = RequiredTable {
    name: "customers",
    columns: &["id", "first_name", "last_name", "phone", "notes"],
};

pub(crate) const RESERVATIONS_TABLE: RequiredTable = RequiredTable {
    name: "reservations",
    columns: &["id", "customer_id", "start_at", "num_guests", "notes"],
};

/// Verifies schema version, tables and columns before a repository is built.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&RequiredTable],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        if !table_exists(conn, table.name)? {
            return Err(RepoError::MissingRequiredTable(table.name));
        }
        for &column in table.columns {
            if !table_has_column(conn, table.name, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: table.name,
                    column,
                });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
