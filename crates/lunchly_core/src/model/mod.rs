//! Domain values for the restaurant: customers and their reservations.
//!
//! # Invariants
//! - Identifiers are database-assigned and written at most once per value.
//! - Values carry no connection or shared state; persistence lives in `repo`.

pub mod customer;
pub mod reservation;
