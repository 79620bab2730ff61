//! Embedded SQL storage for Doorman.
//!
//! Exposes the [`SqlStore`] trait (dynamically typed `query`/`exec`) and the
//! [`SqliteStore`] implementation backed by bundled SQLite.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::SqlError;
pub use sqlite::SqliteStore;
pub use traits::{Row, SqlStore, Value};
