//! TJPA Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Enumerates CNJ process numbers for one year and comarca of the Pará state
//! court, looks each one up in the court's public lookup service and appends
//! whatever it finds to a JSON lines file. Progress is checkpointed after
//! every number so a run can be interrupted and resumed.
//!
//! # Example
//!
//! ```no_run
//! use tjpa_ingest::{ConsiliumClient, CrawlerConfig, EnumerationDriver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CrawlerConfig::from_env()?;
//!     let client = ConsiliumClient::new(&config)?;
//!     let summary = EnumerationDriver::new(&config, client)?.run(50).await?;
//!     println!("next sequential number: {}", summary.next_sequence);
//!     Ok(())
//! }
//! ```

pub mod checkpoint;
pub mod config;
pub mod driver;
pub mod output;
pub mod provider;

pub use checkpoint::CheckpointStore;
pub use config::{CrawlerConfig, DelayRange};
pub use driver::{EnumerationDriver, RunSummary, StepOutcome};
pub use output::OutputLog;
pub use provider::{ConsiliumClient, FetchOutcome, ProcessSource};

use tjpa_common::TjpaError;

// ============================================================================
// Exit Codes
// ============================================================================

/// Any fatal error not covered below.
pub const EXIT_FAILURE: u8 = 1;

/// Invalid configuration or arguments.
pub const EXIT_CONFIG: u8 = 2;

/// The checkpoint file could not be parsed; fix or remove it by hand.
pub const EXIT_CORRUPT_CHECKPOINT: u8 = 3;

/// Map a fatal error to the process exit status.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<TjpaError>() {
        Some(TjpaError::CorruptCheckpoint { .. }) => EXIT_CORRUPT_CHECKPOINT,
        Some(TjpaError::Config(_)) | Some(TjpaError::InvalidIdentifier(_)) => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}
