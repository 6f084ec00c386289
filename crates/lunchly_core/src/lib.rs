//! Core data-access layer for Lunchly, a restaurant reservation app.
//! Customers and their reservations live in SQLite; this crate owns the
//! schema, the SQL and the use-case services on top.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::customer::{Customer, CustomerFields, CustomerId};
pub use model::reservation::{Reservation, ReservationId};
pub use repo::customer_repo::{
    BestCustomer, CustomerRepository, RepoError, RepoResult, SqliteCustomerRepository,
};
pub use repo::reservation_repo::{ReservationRepository, SqliteReservationRepository};
pub use service::customer_service::{CustomerService, SaveOutcome, BEST_CUSTOMERS_LIMIT};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
