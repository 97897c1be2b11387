//! Schema migration: create the task table and record the schema version

use crate::error::Result;
use crate::storage::config::Config;
use crate::storage::database::{parse_database_url, DatabaseTarget};
use crate::storage::{schema, tasks, Database};

pub fn execute(config: &Config, dry_run: bool) -> Result<()> {
    let target = parse_database_url(&config.database_url)?;

    if dry_run {
        match &target {
            DatabaseTarget::Memory => println!("Target: in-memory database"),
            DatabaseTarget::File(path) => println!("Target: {}", path.display()),
        }
        println!("Schema version: {}", schema::SCHEMA_VERSION);
        println!("{}", schema::CREATE_TABLES.trim());
        println!("\nDry run complete. No changes made.");
        return Ok(());
    }

    let db = Database::open_url(&config.database_url)?;
    let (version, rows) = db.with_conn(|conn| {
        let version: u32 =
            conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
        Ok((version, tasks::count(conn)?))
    })?;

    println!(
        "Migrated {} to schema v{} ({} task rows)",
        db.path().display(),
        version,
        rows
    );
    Ok(())
}
