//! Operation logic that sits between tool handlers and the transport.
//!
//! Services hold the parts of an operation that are more than a single
//! request: the update read-modify-write sequence and CQL construction.

mod cql;
pub mod update;

pub use cql::{escape_quotes, space_cql};
pub use update::{UpdateRequest, fetch_current, plan_update, submit, update_content};
