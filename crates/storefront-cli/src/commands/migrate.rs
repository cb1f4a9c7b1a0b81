//! Migrate command
//!
//! Usage: storefront migrate

use std::fmt::Write;

use storefront_store::migrations::applied_migrations;
use storefront_store::{Result, Storefront};

/// Open the database (which migrates it) and report what is applied
pub fn execute(storefront: &Storefront) -> Result<String> {
    let session = storefront.session()?;
    let applied = applied_migrations(session.connection())?;

    let mut out = String::new();
    for m in &applied {
        let short = m.checksum.get(..12).unwrap_or(&m.checksum);
        let _ = writeln!(out, "{}  {}  {}", m.migration_id, m.applied_at, short);
    }
    let _ = writeln!(out, "{} migration(s) applied", applied.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_reports_every_migration() {
        let storefront = Storefront::in_memory();
        let out = execute(&storefront).unwrap();
        assert!(out.contains("001_initial_schema"));
        assert!(out.contains("002_price_history"));
        assert!(out.ends_with("2 migration(s) applied\n"));
    }
}
