//! SQLite persistence layer across the three ERP databases.
//!
//! RULE: Only the store talks to SQL. The engine sees the
//! `RecordProvider`/`AuditSink` traits; tests and the demo seeder use the
//! insert helpers. One store = three connections (operations, finance,
//! audit), mirroring how the source systems are actually deployed.

mod audit_log;
mod records;

pub use records::{ReceivableRow, SalesOrderRow, ShippingLogRow};

use crate::error::AuditResult;
use rusqlite::Connection;
use std::path::Path;

/// Database file names inside the data directory.
pub const OPERATIONS_DB: &str = "db_operations.db";
pub const FINANCE_DB: &str = "db_finance.db";
pub const AUDIT_DB: &str = "audit.db";

pub struct AuditStore {
    ops: Connection,
    fin: Connection,
    audit: Connection,
}

impl AuditStore {
    /// Open (or create) the three databases under `data_dir`.
    pub fn open(data_dir: &str) -> AuditResult<Self> {
        let dir = Path::new(data_dir);
        Ok(Self {
            ops: open_file(&dir.join(OPERATIONS_DB))?,
            fin: open_file(&dir.join(FINANCE_DB))?,
            audit: open_file(&dir.join(AUDIT_DB))?,
        })
    }

    /// Three in-memory databases (used in tests).
    pub fn in_memory() -> AuditResult<Self> {
        Ok(Self {
            ops: Connection::open_in_memory()?,
            fin: Connection::open_in_memory()?,
            audit: Connection::open_in_memory()?,
        })
    }

    /// Apply all schema migrations, idempotently, to their databases.
    pub fn migrate(&self) -> AuditResult<()> {
        self.ops
            .execute_batch(include_str!("../../../migrations/001_operations.sql"))?;
        self.fin
            .execute_batch(include_str!("../../../migrations/002_finance.sql"))?;
        self.audit
            .execute_batch(include_str!("../../../migrations/003_audit.sql"))?;
        Ok(())
    }

    pub(crate) fn ops(&self) -> &Connection {
        &self.ops
    }

    pub(crate) fn fin(&self) -> &Connection {
        &self.fin
    }

    pub(crate) fn audit(&self) -> &Connection {
        &self.audit
    }
}

fn open_file(path: &Path) -> AuditResult<Connection> {
    let conn = Connection::open(path)?;
    // WAL mode: better concurrent read performance on real files.
    let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}
