//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! - `PostgresStore` - users, groups and messages over one `PgPool`

mod store;

pub use store::PostgresStore;
