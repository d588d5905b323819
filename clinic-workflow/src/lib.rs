//! Prescription workflow domain logic for CampusCare Engine
//!
//! Provides the pure pieces of the clinic backend:
//! - Status derivation from medicine-issuance and lab-result facts
//! - Search relevance ranking for patient lookups
//! - Listing filter parsing (search / status / calendar-day window)
//! - Pagination envelope with has-more semantics
//!
//! No I/O lives here; the server crate feeds this from its record store.

pub mod error;
pub mod query;
pub mod status;

pub use error::*;
pub use query::*;
pub use status::*;
