//! Reservation repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Per-customer listing is ordered by `start_at ASC, id ASC`.
//! - Constraint failures (unknown customer, `num_guests < 1`) surface as
//!   `RepoError::Db` without translation.

use crate::model::customer::CustomerId;
use crate::model::reservation::{Reservation, ReservationId};
use crate::repo::customer_repo::{RepoError, RepoResult};
use crate::repo::{ensure_connection_ready, RESERVATIONS_TABLE};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Repository interface for reservation operations used by customers.
pub trait ReservationRepository {
    /// Inserts an unsaved reservation and writes the assigned id onto it.
    fn create_reservation(&self, reservation: &mut Reservation) -> RepoResult<ReservationId>;
    /// Lists all reservations held by one customer.
    fn reservations_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<Reservation>>;
}

/// SQLite-backed reservation repository.
pub struct SqliteReservationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReservationRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[&RESERVATIONS_TABLE])?;
        Ok(Self { conn })
    }
}

impl ReservationRepository for SqliteReservationRepository<'_> {
    fn create_reservation(&self, reservation: &mut Reservation) -> RepoResult<ReservationId> {
        if let Some(id) = reservation.id() {
            return Err(RepoError::AlreadyPersisted(id));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO reservations (
                customer_id,
                start_at,
                num_guests,
                notes
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                reservation.customer_id,
                reservation.start_at,
                reservation.num_guests,
                reservation.notes.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        reservation.mark_persisted(id);
        Ok(id)
    }

    fn reservations_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<Reservation>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                customer_id,
                start_at,
                num_guests,
                notes
             FROM reservations
             WHERE customer_id = ?1
             ORDER BY start_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([customer_id])?;
        let mut reservations = Vec::new();
        while let Some(row) = rows.next()? {
            reservations.push(parse_reservation_row(row)?);
        }

        Ok(reservations)
    }
}

fn parse_reservation_row(row: &Row<'_>) -> RepoResult<Reservation> {
    let guests: i64 = row.get("num_guests")?;
    let num_guests = u32::try_from(guests)
        .ok()
        .filter(|value| *value >= 1)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid num_guests value `{guests}` in reservations.num_guests"
            ))
        })?;

    let mut reservation = Reservation::new(
        row.get("customer_id")?,
        row.get("start_at")?,
        num_guests,
    )
    .with_id(row.get("id")?);
    reservation.notes = row.get("notes")?;
    Ok(reservation)
}
