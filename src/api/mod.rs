//! Client for the hosted catalog backend.
//!
//! The backend is a managed PostgREST-style service; this module only knows
//! how to issue row queries and procedure calls against it and how to decode
//! the rows into domain types.

mod catalog;
mod client;
mod http;
mod types;

pub use catalog::{CatalogSource, RestCatalog};
pub use types::CatalogError;
#[cfg(test)]
pub use types::ApiError;
