//! Designmart record store
//!
//! Owns the design lifecycle record: creation in `pending`, descriptor
//! attachment, review transitions, deletion, and read-side listings. The
//! [`DesignStore`] trait is the seam orchestrators and handlers depend on;
//! [`PgDesignStore`] is the Postgres implementation and
//! `memory::InMemoryDesignStore` (behind the `test-util` feature) is the
//! test double.
//!
//! Deleting a record never touches storage; orchestrators pair `delete` with
//! the vault's subtree delete so the two concerns stay decoupled.

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
mod pg;
mod store;

pub use pg::PgDesignStore;
pub use store::DesignStore;

/// Embedded migrations, applied at startup by the API binary.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
