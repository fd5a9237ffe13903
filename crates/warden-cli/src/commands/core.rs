//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use warden_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("Initializing database at {}...", db_path.display());

    // Opening runs the migrations
    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   Encryption: ENABLED");
    }

    println!("Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a budget: warden budgets add --user me --category Dining --amount 300");
    println!("  2. Record spending: warden transactions add --user me --category Dining --amount 42");
    println!("  3. Start the agents: warden run --force");

    Ok(())
}
