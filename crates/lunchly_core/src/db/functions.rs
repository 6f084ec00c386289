//! Application-defined SQL functions installed on every connection.
//!
//! # Invariants
//! - Functions are deterministic and registered before any repository query.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// SQL name of the Unicode-aware lowercase function used by name search.
pub const UNICODE_LOWER_FN: &str = "unicode_lower";

/// Registers the SQL functions repositories rely on.
///
/// Built-in `lower()` and `LIKE` only fold ASCII; `unicode_lower` applies
/// full Unicode lowercasing so `Émile` and `émile` compare equal.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::register_functions;
    use rusqlite::Connection;

    #[test]
    fn unicode_lower_folds_non_ascii_and_passes_null() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let folded: String = conn
            .query_row("SELECT unicode_lower('ÉMILE Zola');", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "émile zola");

        let null: Option<String> = conn
            .query_row("SELECT unicode_lower(NULL);", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null, None);
    }
}
