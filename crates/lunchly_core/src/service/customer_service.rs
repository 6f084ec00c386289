//! Customer use-case service.
//!
//! # Responsibility
//! - Provide the customer entry points route handlers call.
//! - Turn absent rows into `RepoError::NotFound`.
//! - Traverse customer -> reservations through the reservation collaborator.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::customer::{Customer, CustomerId};
use crate::model::reservation::Reservation;
use crate::repo::customer_repo::{BestCustomer, CustomerRepository, RepoError, RepoResult};
use crate::repo::reservation_repo::ReservationRepository;
use log::{debug, info, warn};

/// Maximum number of entries returned by [`CustomerService::best_customers`].
pub const BEST_CUSTOMERS_LIMIT: u32 = 10;

/// Which write path [`CustomerService::save`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(CustomerId),
    Updated(CustomerId),
}

impl SaveOutcome {
    pub fn id(self) -> CustomerId {
        match self {
            Self::Inserted(id) | Self::Updated(id) => id,
        }
    }
}

/// Use-case service over customer and reservation repositories.
pub struct CustomerService<C: CustomerRepository, R: ReservationRepository> {
    customers: C,
    reservations: R,
}

impl<C: CustomerRepository, R: ReservationRepository> CustomerService<C, R> {
    /// Creates a service using the provided repository implementations.
    pub fn new(customers: C, reservations: R) -> Self {
        Self {
            customers,
            reservations,
        }
    }

    /// Lists every customer ordered by last name, then first name.
    pub fn all(&self) -> RepoResult<Vec<Customer>> {
        self.customers.list_customers()
    }

    /// Gets one customer by id.
    ///
    /// # Errors
    /// - `RepoError::NotFound(id)` (status 404) when no row matches.
    pub fn get(&self, id: CustomerId) -> RepoResult<Customer> {
        match self.customers.get_customer(id)? {
            Some(customer) => Ok(customer),
            None => {
                warn!("event=customer_get module=service status=not_found customer_id={id}");
                Err(RepoError::NotFound(id))
            }
        }
    }

    /// Inserts an unsaved customer and assigns its id.
    pub fn create(&self, customer: &mut Customer) -> RepoResult<CustomerId> {
        let id = self.customers.create_customer(customer)?;
        info!("event=customer_save module=service status=ok mode=insert customer_id={id}");
        Ok(id)
    }

    /// Writes all fields of a persisted customer.
    ///
    /// # Errors
    /// - `RepoError::Unsaved` when `customer` has no id.
    /// - `RepoError::NotFound(id)` when the row no longer exists.
    pub fn update(&self, customer: &Customer) -> RepoResult<()> {
        self.customers.update_customer(customer)?;
        info!(
            "event=customer_save module=service status=ok mode=update customer_id={}",
            customer.id().unwrap_or_default()
        );
        Ok(())
    }

    /// Inserts or updates depending on whether `customer` has an id.
    pub fn save(&self, customer: &mut Customer) -> RepoResult<SaveOutcome> {
        match customer.id() {
            Some(id) => {
                self.update(customer)?;
                Ok(SaveOutcome::Updated(id))
            }
            None => self.create(customer).map(SaveOutcome::Inserted),
        }
    }

    /// Finds customers whose full name contains `text`, ignoring case.
    ///
    /// Case folding is Unicode-aware, so `émile` finds `Émile`.
    ///
    /// An empty `text` matches every customer.
    pub fn search_by_name(&self, text: &str) -> RepoResult<Vec<Customer>> {
        let found = self.customers.search_customers_by_name(text)?;
        debug!(
            "event=customer_search module=service status=ok query_len={} hits={}",
            text.chars().count(),
            found.len()
        );
        Ok(found)
    }

    /// Returns up to ten customers ranked by reservation count.
    pub fn best_customers(&self) -> RepoResult<Vec<BestCustomer>> {
        self.customers.best_customers(BEST_CUSTOMERS_LIMIT)
    }

    /// Lists the reservations held by `customer`.
    ///
    /// An unsaved customer has no reservations.
    pub fn get_reservations(&self, customer: &Customer) -> RepoResult<Vec<Reservation>> {
        match customer.id() {
            Some(id) => self.reservations.reservations_for_customer(id),
            None => Ok(Vec::new()),
        }
    }

    /// Books a reservation for an existing customer.
    pub fn add_reservation(&self, reservation: &mut Reservation) -> RepoResult<()> {
        let customer_id = reservation.customer_id;
        self.get(customer_id)?;
        let id = self.reservations.create_reservation(reservation)?;
        info!(
            "event=reservation_create module=service status=ok reservation_id={id} customer_id={customer_id}"
        );
        Ok(())
    }
}
