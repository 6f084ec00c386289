//! Command-line front end over `lunchly_core`.
//!
//! # Responsibility
//! - Map subcommands onto `CustomerService` use-cases.
//! - Print one record per line; report errors on stderr with a non-zero exit
//!   (`2` when the requested customer does not exist).

use clap::{Args, Parser, Subcommand};
use log::error;
use lunchly_core::{
    default_log_level, init_logging, open_db, BestCustomer, Customer, CustomerService, RepoError,
    Reservation, SqliteCustomerRepository, SqliteReservationRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const NOT_FOUND_EXIT_CODE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "lunchly")]
#[command(about = "Manage Lunchly customers and reservations")]
#[command(version)]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(long, default_value = "lunchly.sqlite3")]
    db: PathBuf,

    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every customer by last name, then first name.
    List,
    /// Show one customer.
    Get { id: i64 },
    /// Find customers whose full name contains TEXT.
    Search { text: String },
    /// Show the ten customers with the most reservations.
    Best,
    /// Add a customer.
    Add {
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change fields of an existing customer.
    Edit(EditArgs),
    /// Book a reservation for a customer.
    Reserve {
        customer_id: i64,
        /// Start time in Unix epoch milliseconds.
        #[arg(long)]
        start_at: i64,
        #[arg(long)]
        guests: u32,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List a customer's reservations.
    Reservations { customer_id: i64 },
}

/// Field changes for `edit`; options left out keep the stored value.
#[derive(Debug, Args)]
struct EditArgs {
    id: i64,
    #[arg(long)]
    first: Option<String>,
    #[arg(long)]
    last: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Remove the stored phone number.
    #[arg(long, conflicts_with = "phone")]
    clear_phone: bool,
    #[arg(long)]
    notes: Option<String>,
    /// Remove the stored notes.
    #[arg(long, conflicts_with = "notes")]
    clear_notes: bool,
}

impl EditArgs {
    fn apply_to(self, customer: &mut Customer) {
        if let Some(first) = self.first {
            customer.first_name = first;
        }
        if let Some(last) = self.last {
            customer.last_name = last;
        }
        if self.clear_phone {
            customer.phone = None;
        } else if self.phone.is_some() {
            customer.phone = self.phone;
        }
        if self.clear_notes {
            customer.notes = None;
        } else if self.notes.is_some() {
            customer.notes = self.notes;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            match err.downcast_ref::<RepoError>() {
                Some(repo_err) if repo_err.is_not_found() => ExitCode::from(NOT_FOUND_EXIT_CODE),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&cli.db)?;
    let service = CustomerService::new(
        SqliteCustomerRepository::try_new(&conn)?,
        SqliteReservationRepository::try_new(&conn)?,
    );

    match cli.command {
        Command::List => print_customers(&service.all()?),
        Command::Get { id } => println!("{}", describe(&service.get(id)?)),
        Command::Search { text } => print_customers(&service.search_by_name(&text)?),
        Command::Best => service.best_customers()?.iter().for_each(print_ranked),
        Command::Add {
            first,
            last,
            phone,
            notes,
        } => {
            let mut customer = Customer::new(first, last);
            customer.phone = phone;
            customer.notes = notes;
            service.save(&mut customer)?;
            println!("{}", describe(&customer));
        }
        Command::Edit(edit) => {
            let mut customer = service.get(edit.id)?;
            edit.apply_to(&mut customer);
            service.save(&mut customer)?;
            println!("{}", describe(&customer));
        }
        Command::Reserve {
            customer_id,
            start_at,
            guests,
            notes,
        } => {
            let mut reservation = Reservation::new(customer_id, start_at, guests);
            reservation.notes = notes;
            service.add_reservation(&mut reservation)?;
            println!("{}", describe_reservation(&reservation));
        }
        Command::Reservations { customer_id } => {
            let customer = service.get(customer_id)?;
            for reservation in service.get_reservations(&customer)? {
                println!("{}", describe_reservation(&reservation));
            }
        }
    }

    Ok(())
}

fn print_customers(customers: &[Customer]) {
    for customer in customers {
        println!("{}", describe(customer));
    }
}

fn print_ranked(entry: &BestCustomer) {
    println!(
        "{}\treservations={}",
        describe(&entry.customer),
        entry.reservation_count
    );
}

fn describe(customer: &Customer) -> String {
    let mut line = format!(
        "#{}\t{}",
        customer.id().unwrap_or_default(),
        customer.full_name()
    );
    if let Some(phone) = customer.phone.as_deref() {
        line.push_str(&format!("\tphone={phone}"));
    }
    if let Some(notes) = customer.notes.as_deref() {
        line.push_str(&format!("\tnotes={notes}"));
    }
    line
}

fn describe_reservation(reservation: &Reservation) -> String {
    let mut line = format!(
        "#{}\tcustomer={}\tstart_at={}\tguests={}",
        reservation.id().unwrap_or_default(),
        reservation.customer_id,
        reservation.start_at,
        reservation.num_guests
    );
    if let Some(notes) = reservation.notes.as_deref() {
        line.push_str(&format!("\tnotes={notes}"));
    }
    line
}
