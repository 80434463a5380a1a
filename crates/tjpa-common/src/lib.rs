//! TJPA Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, identifier arithmetic, logging and error handling for the
//! TJPA process crawler.
//!
//! # Overview
//!
//! - **Error Handling**: [`TjpaError`] and the crate-wide [`Result`] alias
//! - **Identifiers**: CNJ check-digit computation and canonical identifiers
//! - **Types**: process records as they are written to the output log
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```
//! use tjpa_common::identifier::{CanonicalIdentifier, JurisdictionContext};
//!
//! let ctx = JurisdictionContext::new("2023", "0040").unwrap();
//! let id = CanonicalIdentifier::assemble(818800, &ctx);
//! assert_eq!(id.as_str().len(), 20);
//! assert!(id.formatted().ends_with(".2023.8.14.0040"));
//! ```

pub mod error;
pub mod identifier;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TjpaError};
pub use identifier::{CanonicalIdentifier, CheckDigits, JurisdictionContext};
pub use types::{Movement, Party, ProcessRecord};
