//! Process data provider
//!
//! [`ProcessSource`] is the seam between the enumeration driver and whatever
//! answers process lookups. [`ConsiliumClient`] is the HTTP implementation
//! backed by the court's unified lookup service.

pub mod client;
pub mod endpoints;
pub mod types;

use async_trait::async_trait;
use tjpa_common::{CanonicalIdentifier, ProcessRecord};

pub use client::ConsiliumClient;

/// Result of looking up one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The provider answered with a process document
    Found(Vec<ProcessRecord>),
    /// Non-success status or a non-JSON response: no process at this number
    NotFound,
    /// Timeout, connection failure or an unreadable body
    Transport(String),
}

/// Anything that can resolve a canonical identifier into process records
#[async_trait]
pub trait ProcessSource: Send + Sync {
    /// Look up `identifier`. Never fails; failures are reported as outcomes.
    async fn fetch_process_data(&self, identifier: &CanonicalIdentifier) -> FetchOutcome;
}

#[async_trait]
impl<T: ProcessSource + ?Sized> ProcessSource for &T {
    async fn fetch_process_data(&self, identifier: &CanonicalIdentifier) -> FetchOutcome {
        (**self).fetch_process_data(identifier).await
    }
}
