use lunchly_core::db::migrations::latest_version;
use lunchly_core::db::open_db_in_memory;
use lunchly_core::{
    Customer, CustomerRepository, CustomerService, RepoError, SaveOutcome,
    SqliteCustomerRepository, SqliteReservationRepository,
};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> CustomerService<SqliteCustomerRepository<'_>, SqliteReservationRepository<'_>> {
    CustomerService::new(
        SqliteCustomerRepository::try_new(conn).unwrap(),
        SqliteReservationRepository::try_new(conn).unwrap(),
    )
}

fn customer_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM customers;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn save_then_get_roundtrip_preserves_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut ada = Customer::new("Ada", "Lovelace")
        .with_phone("555-0100")
        .with_notes("vip");
    let outcome = service.save(&mut ada).unwrap();
    let id = ada.id().expect("save should assign an id");
    assert_eq!(outcome, SaveOutcome::Inserted(id));

    let loaded = service.get(id).unwrap();
    assert_eq!(loaded.id(), Some(id));
    assert_eq!(loaded, ada);
    assert_eq!(loaded.phone.as_deref(), Some("555-0100"));
    assert_eq!(loaded.notes.as_deref(), Some("vip"));
}

#[test]
fn get_returns_customer_with_requested_id() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut first = Customer::new("Ada", "Lovelace");
    let mut second = Customer::new("Grace", "Hopper");
    service.create(&mut first).unwrap();
    service.create(&mut second).unwrap();

    for expected in [&first, &second] {
        let id = expected.id().unwrap();
        assert_eq!(service.get(id).unwrap().id(), Some(id));
    }
}

#[test]
fn get_missing_id_fails_with_not_found_404() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.get(4242).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(4242)));
    assert_eq!(err.status_code(), 404);
    assert!(err.to_string().contains("4242"));
}

#[test]
fn save_on_persisted_customer_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut customer = Customer::new("Ada", "Byron");
    service.save(&mut customer).unwrap();
    let id = customer.id().unwrap();

    customer.last_name = "Lovelace".to_string();
    customer.phone = Some("555-0100".to_string());
    assert_eq!(service.save(&mut customer).unwrap(), SaveOutcome::Updated(id));

    let loaded = service.get(id).unwrap();
    assert_eq!(loaded.full_name(), "Ada Lovelace");
    assert_eq!(loaded.phone.as_deref(), Some("555-0100"));
    assert_eq!(customer_rows(&conn), 1);
}

#[test]
fn repeated_save_with_unchanged_fields_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut customer = Customer::new("Ada", "Lovelace").with_notes("vip");
    service.save(&mut customer).unwrap();
    let id = customer.id().unwrap();

    service.save(&mut customer).unwrap();
    service.save(&mut customer).unwrap();

    assert_eq!(customer.id(), Some(id));
    assert_eq!(customer_rows(&conn), 1);
    assert_eq!(service.get(id).unwrap(), customer);
}

#[test]
fn update_of_deleted_row_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut customer = Customer::new("Ada", "Lovelace");
    service.create(&mut customer).unwrap();
    let id = customer.id().unwrap();
    conn.execute("DELETE FROM customers WHERE id = ?1;", [id])
        .unwrap();

    let err = service.save(&mut customer).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
    assert_eq!(customer_rows(&conn), 0);
}

#[test]
fn repository_update_of_missing_row_fails_and_inserts_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut customer = Customer::new("Ada", "Lovelace");
    let id = repo.create_customer(&mut customer).unwrap();
    conn.execute("DELETE FROM customers WHERE id = ?1;", [id])
        .unwrap();

    customer.notes = Some("moved away".to_string());
    let err = repo.update_customer(&customer).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
    assert_eq!(err.status_code(), 404);
    assert!(repo.get_customer(id).unwrap().is_none());
    assert_eq!(customer_rows(&conn), 0);
}

#[test]
fn explicit_create_and_update_reject_wrong_state() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let unsaved = Customer::new("Ada", "Lovelace");
    assert!(matches!(
        service.update(&unsaved).unwrap_err(),
        RepoError::Unsaved
    ));

    let mut saved = Customer::new("Grace", "Hopper");
    let id = service.create(&mut saved).unwrap();
    let err = service.create(&mut saved).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyPersisted(existing) if existing == id));
    assert_eq!(err.status_code(), 409);
    assert_eq!(customer_rows(&conn), 1);
}

#[test]
fn optional_fields_can_be_cleared_on_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut customer = Customer::new("Ada", "Lovelace").with_phone("555-0100");
    let id = repo.create_customer(&mut customer).unwrap();

    customer.phone = None;
    repo.update_customer(&customer).unwrap();

    let loaded = repo.get_customer(id).unwrap().unwrap();
    assert_eq!(loaded.phone, None);
}

#[test]
fn repository_get_returns_none_for_missing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    assert!(repo.get_customer(1).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCustomerRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_customers_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCustomerRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("customers"))
    ));
}

#[test]
fn repository_rejects_customers_table_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone TEXT
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCustomerRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "customers",
            column: "notes"
        })
    ));
}
