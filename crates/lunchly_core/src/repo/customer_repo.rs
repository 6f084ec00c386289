//! Customer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own every SQL statement that touches `customers`.
//! - Map rows to `Customer` values by column name.
//!
//! # Invariants
//! - Inserts and updates run inside one `BEGIN IMMEDIATE` transaction each.
//! - Name ordering is `last_name, first_name, id` under BINARY collation.
//! - Ranking is an inner join, so customers without reservations never rank.

use crate::db::functions::{register_functions, UNICODE_LOWER_FN};
use crate::db::DbError;
use crate::model::customer::{Customer, CustomerFields, CustomerId};
use crate::repo::{ensure_connection_ready, CUSTOMERS_TABLE, RESERVATIONS_TABLE};
use rusqlite::{params, Connection, Params, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    phone,
    notes
FROM customers";

const NAME_ORDER_SQL: &str = "ORDER BY last_name ASC, first_name ASC, id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for customer and reservation persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error, propagated unchanged.
    Db(DbError),
    /// No customer row has this id.
    NotFound(CustomerId),
    /// Insert requested for a value that already has an id.
    ///
    /// Carries a `CustomerId` or a `ReservationId`, whichever record was passed.
    AlreadyPersisted(i64),
    /// Update requested for a value that was never inserted.
    Unsaved,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid value.
    InvalidData(String),
}

impl RepoError {
    /// HTTP status a route handler should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AlreadyPersisted(_) => 409,
            _ => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "no such customer: {id}"),
            Self::AlreadyPersisted(id) => write!(f, "record already persisted with id {id}"),
            Self::Unsaved => write!(f, "record has not been saved yet"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ranking row returned by [`CustomerRepository::best_customers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestCustomer {
    pub customer: Customer,
    /// Always at least 1.
    pub reservation_count: u32,
}

/// Repository interface for customer persistence and queries.
pub trait CustomerRepository {
    /// Inserts an unsaved customer and writes the assigned id onto it.
    fn create_customer(&self, customer: &mut Customer) -> RepoResult<CustomerId>;
    /// Overwrites every field of the stored row with `customer`'s values.
    ///
    /// An update whose id matches no row is not a silent no-op: it fails with
    /// `RepoError::NotFound(id)` and nothing is written. `RepoError::Unsaved`
    /// is returned when `customer` has no id.
    fn update_customer(&self, customer: &Customer) -> RepoResult<()>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    /// Lists every customer in name order.
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
    /// Case-insensitive substring match on `"first last"`.
    ///
    /// Case folding follows Unicode lowercase rules, not only ASCII.
    fn search_customers_by_name(&self, text: &str) -> RepoResult<Vec<Customer>>;
    /// Customers with the most reservations, at most `limit` entries.
    fn best_customers(&self, limit: u32) -> RepoResult<Vec<BestCustomer>>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[&CUSTOMERS_TABLE, &RESERVATIONS_TABLE])?;
        register_functions(conn)?;
        Ok(Self { conn })
    }

    fn query_customers(&self, sql: &str, params: impl Params) -> RepoResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }
        Ok(customers)
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn create_customer(&self, customer: &mut Customer) -> RepoResult<CustomerId> {
        if let Some(id) = customer.id() {
            return Err(RepoError::AlreadyPersisted(id));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO customers (
                first_name,
                last_name,
                phone,
                notes
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                customer.first_name.as_str(),
                customer.last_name.as_str(),
                customer.phone.as_deref(),
                customer.notes.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        customer.mark_persisted(id);
        Ok(id)
    }

    fn update_customer(&self, customer: &Customer) -> RepoResult<()> {
        let id = customer.id().ok_or(RepoError::Unsaved)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE customers
             SET
                first_name = ?1,
                last_name = ?2,
                phone = ?3,
                notes = ?4
             WHERE id = ?5;",
            params![
                customer.first_name.as_str(),
                customer.last_name.as_str(),
                customer.phone.as_deref(),
                customer.notes.as_deref(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }

        Ok(None)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        self.query_customers(
            &format!("{CUSTOMER_SELECT_SQL} {NAME_ORDER_SQL};"),
            params![],
        )
    }

    fn search_customers_by_name(&self, text: &str) -> RepoResult<Vec<Customer>> {
        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
        self.query_customers(
            &format!(
                "{CUSTOMER_SELECT_SQL}
                 WHERE {UNICODE_LOWER_FN}(first_name || ' ' || last_name) LIKE ?1 ESCAPE '\\'
                 {NAME_ORDER_SQL};"
            ),
            [pattern],
        )
    }

    fn best_customers(&self, limit: u32) -> RepoResult<Vec<BestCustomer>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT
                c.id AS id,
                c.first_name AS first_name,
                c.last_name AS last_name,
                c.phone AS phone,
                c.notes AS notes,
                COUNT(r.id) AS reservation_count
             FROM customers AS c
             INNER JOIN reservations AS r ON r.customer_id = c.id
             GROUP BY c.id
             ORDER BY
                reservation_count DESC,
                c.last_name ASC,
                c.first_name ASC,
                c.id ASC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut ranked = Vec::new();
        while let Some(row) = rows.next()? {
            let count: i64 = row.get("reservation_count")?;
            let reservation_count = u32::try_from(count).map_err(|_| {
                RepoError::InvalidData(format!("invalid reservation count `{count}`"))
            })?;
            ranked.push(BestCustomer {
                customer: parse_customer_row(row)?,
                reservation_count,
            });
        }

        Ok(ranked)
    }
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let id: CustomerId = row.get("id")?;
    Ok(Customer::from_row_parts(
        id,
        CustomerFields {
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            phone: row.get("phone")?,
            notes: row.get("notes")?,
        },
    ))
}

/// Escapes `LIKE` wildcards so `text` matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_like, RepoError};

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("love"), "love");
    }

    #[test]
    fn status_code_maps_not_found_to_404() {
        assert_eq!(RepoError::NotFound(3).status_code(), 404);
        assert_eq!(RepoError::AlreadyPersisted(3).status_code(), 409);
        assert_eq!(RepoError::Unsaved.status_code(), 500);
        assert_eq!(RepoError::NotFound(3).to_string(), "no such customer: 3");
    }
}
