//! Data access layer
//!
//! - `entity` - filter normalization, SQL compilation and result mapping
//! - `datasette` - HTTP query backend for a remote Datasette instance
//! - `traits` - the `QueryBackend` seam between the two
//! - `error` - unified error type for query backends

pub mod datasette;
pub mod entity;
pub mod error;
pub mod traits;

pub use error::DataError;
pub use traits::{QueryBackend, QueryResult};
