//! Parsers for the catalog file format.
//!
//! # Parsers
//!
//! - [`catalog_parser`]: Read and write catalog snapshots and delta files
//! - [`timestamps`]: Parse catalog timestamps with or without fractional seconds
//!
//! # Example
//!
//! ```no_run
//! use pepper_rust::parsing::catalog_parser::read_catalog;
//!
//! let load = read_catalog("tns_public_objects.csv").expect("Failed to read catalog");
//! println!("{} rows, released {}", load.store.len(), load.store.release_timestamp);
//! ```

pub mod catalog_parser;
pub mod timestamps;

#[cfg(test)]
mod catalog_parser_tests;

pub use catalog_parser::{read_catalog, read_delta, write_catalog, CatalogLoad};
pub use timestamps::parse_catalog_timestamp;
