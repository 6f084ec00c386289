//! Customer domain model.
//!
//! # Responsibility
//! - Represent one `customers` row as an owned value.
//! - Derive display projections such as the full name.
//!
//! # Invariants
//! - `id` is `None` until the row is inserted, and never changes afterwards.
//! - No field validation happens here; callers validate input upstream.

use serde::{Deserialize, Serialize};

/// Database-assigned customer identifier.
pub type CustomerId = i64;

/// Caller-supplied customer fields, without identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A person who can hold reservations.
///
/// Serialized with camelCase names (`firstName`, `lastName`) for callers that
/// render JSON. An inbound `id` is never deserialized, so only the repository
/// can mark a value as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(skip_deserializing)]
    id: Option<CustomerId>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Free-form staff notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Customer {
    /// Creates an unsaved customer without phone or notes.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self::from_parts(CustomerFields {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            notes: None,
        })
    }

    /// Creates an unsaved customer from a full field record.
    pub fn from_parts(fields: CustomerFields) -> Self {
        Self {
            id: None,
            first_name: fields.first_name,
            last_name: fields.last_name,
            phone: fields.phone,
            notes: fields.notes,
        }
    }

    /// Rebuilds a persisted customer from stored columns.
    pub(crate) fn from_row_parts(id: CustomerId, fields: CustomerFields) -> Self {
        let mut customer = Self::from_parts(fields);
        customer.id = Some(id);
        customer
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Database id, or `None` for a customer that was never inserted.
    pub fn id(&self) -> Option<CustomerId> {
        self.id
    }

    /// Returns whether this value mirrors a stored row.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// First and last name separated by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns a copy of the mutable fields.
    pub fn fields(&self) -> CustomerFields {
        CustomerFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Records the id assigned by an insert.
    ///
    /// Only the first assignment takes effect.
    pub(crate) fn mark_persisted(&mut self, id: CustomerId) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Customer;

    #[test]
    fn mark_persisted_keeps_first_id() {
        let mut customer = Customer::new("Ada", "Lovelace");
        customer.mark_persisted(7);
        customer.mark_persisted(9);
        assert_eq!(customer.id(), Some(7));
    }
}
