//! Reservation domain model.
//!
//! # Invariants
//! - `customer_id` references an existing customer; the database enforces it.
//! - `start_at` is Unix epoch milliseconds.

use crate::model::customer::CustomerId;
use serde::{Deserialize, Serialize};

/// Database-assigned reservation identifier.
pub type ReservationId = i64;

/// A table booking held by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(skip_deserializing)]
    id: Option<ReservationId>,
    pub customer_id: CustomerId,
    pub start_at: i64,
    pub num_guests: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Reservation {
    /// Creates an unsaved reservation for `customer_id`.
    pub fn new(customer_id: CustomerId, start_at: i64, num_guests: u32) -> Self {
        Self {
            id: None,
            customer_id,
            start_at,
            num_guests,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn id(&self) -> Option<ReservationId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn with_id(mut self, id: ReservationId) -> Self {
        self.id = Some(id);
        self
    }

    pub(crate) fn mark_persisted(&mut self, id: ReservationId) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }
}
