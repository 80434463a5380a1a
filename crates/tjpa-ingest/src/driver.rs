//! Checkpointed enumeration of sequential numbers
//!
//! One run walks `[start, start + range)` where `start` comes from the
//! checkpoint. Each number goes through the same steps, in this order:
//!
//! 1. assemble the canonical identifier
//! 2. look it up
//! 3. append any records to the output log
//! 4. save `seq + 1` as the checkpoint
//! 5. pause for a random delay
//!
//! Killing the process between steps leaves the log and the checkpoint
//! consistent: the checkpoint only moves after the records are on disk.

use crate::checkpoint::CheckpointStore;
use crate::config::{CrawlerConfig, DelayRange};
use crate::output::OutputLog;
use crate::provider::{FetchOutcome, ProcessSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tjpa_common::identifier::MAX_SEQUENCE;
use tjpa_common::{CanonicalIdentifier, JurisdictionContext, ProcessRecord, Result, TjpaError};
use tracing::{info, warn};

/// What happened to a single sequential number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Records were written; `first_movements` is the history length of the first one
    Found { records: usize, first_movements: usize },
    /// Nothing at this number, or the provider could not be reached
    Empty,
}

/// Totals of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub start: u32,
    pub processed: u32,
    pub found: u32,
    pub empty: u32,
    pub records_written: usize,
    /// Value left in the checkpoint
    pub next_sequence: u32,
}

impl RunSummary {
    fn new(start: u32) -> Self {
        Self {
            start,
            next_sequence: start,
            ..Self::default()
        }
    }

    fn record(&mut self, seq: u32, outcome: StepOutcome) {
        self.processed += 1;
        self.next_sequence = seq + 1;
        match outcome {
            StepOutcome::Found { records, .. } => {
                self.found += 1;
                self.records_written += records;
            },
            StepOutcome::Empty => self.empty += 1,
        }
    }
}

/// Drives the lookup of consecutive identifiers against a [`ProcessSource`]
pub struct EnumerationDriver<S> {
    context: JurisdictionContext,
    source: S,
    checkpoint: CheckpointStore,
    output: OutputLog,
    delay: DelayRange,
    rng: StdRng,
}

impl<S: ProcessSource> EnumerationDriver<S> {
    pub fn new(config: &CrawlerConfig, source: S) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            context: config.context()?,
            source,
            checkpoint: CheckpointStore::new(&config.checkpoint_path, config.initial_sequence),
            output: OutputLog::new(&config.output_path),
            delay: config.delay,
            rng: StdRng::from_entropy(),
        })
    }

    /// Use a fixed RNG for the delay draws.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Process exactly `range_size` identifiers starting at the checkpoint.
    ///
    /// A corrupt checkpoint aborts before any lookup is issued. Provider
    /// failures never abort the run; failing to write the log or the
    /// checkpoint does, leaving the current number to be retried next time.
    pub async fn run(&mut self, range_size: u32) -> Result<RunSummary> {
        let start = self.checkpoint.load().await?;
        let end = start
            .checked_add(range_size)
            .filter(|&end| end <= MAX_SEQUENCE + 1)
            .ok_or_else(|| {
                TjpaError::config(format!(
                    "range of {} from {} runs past sequential number {}",
                    range_size, start, MAX_SEQUENCE
                ))
            })?;

        info!(
            year = self.context.year(),
            jurisdiction = self.context.jurisdiction_code(),
            output = %self.output.path().display(),
            checkpoint = %self.checkpoint.path().display(),
            start,
            end,
            "Starting enumeration"
        );

        let mut summary = RunSummary::new(start);
        for seq in start..end {
            let outcome = self.step(seq).await?;
            summary.record(seq, outcome);

            // Applied after every number, found or not.
            let pause = self.delay.sample(&mut self.rng);
            tokio::time::sleep(pause).await;
        }

        info!(
            processed = summary.processed,
            found = summary.found,
            empty = summary.empty,
            records = summary.records_written,
            next = summary.next_sequence,
            "Enumeration finished"
        );
        Ok(summary)
    }

    /// Look up one sequential number, persist its records and advance the checkpoint.
    pub async fn step(&mut self, seq: u32) -> Result<StepOutcome> {
        if seq > MAX_SEQUENCE {
            return Err(TjpaError::config(format!(
                "sequential number {} does not fit in 7 digits",
                seq
            )));
        }
        let identifier = CanonicalIdentifier::assemble(seq, &self.context);
        let records = self.lookup(&identifier).await;

        let outcome = if records.is_empty() {
            info!(identifier = %identifier, "No process at this number");
            StepOutcome::Empty
        } else {
            self.output.append(&records)?;
            let first_movements = records[0].movements.len();
            info!(
                identifier = %identifier,
                processes = records.len(),
                movements = first_movements,
                "Process found"
            );
            StepOutcome::Found {
                records: records.len(),
                first_movements,
            }
        };

        // An empty number is final, so the cursor moves either way.
        self.checkpoint.save(seq + 1).await?;
        Ok(outcome)
    }

    /// Not-found, transport failures and empty listings all mean "nothing
    /// here" for this run. None of them is retried.
    async fn lookup(&self, identifier: &CanonicalIdentifier) -> Vec<ProcessRecord> {
        match self.source.fetch_process_data(identifier).await {
            FetchOutcome::Found(records) => records,
            FetchOutcome::NotFound => Vec::new(),
            FetchOutcome::Transport(reason) => {
                warn!(identifier = %identifier, reason = %reason, "Lookup failed, treating as empty");
                Vec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;
    use tjpa_common::Movement;

    /// Answers from a fixed table and records every identifier it is asked for.
    #[derive(Default)]
    struct ScriptedSource {
        answers: HashMap<u32, FetchOutcome>,
        calls: Mutex<Vec<CanonicalIdentifier>>,
    }

    impl ScriptedSource {
        fn with(mut self, seq: u32, outcome: FetchOutcome) -> Self {
            self.answers.insert(seq, outcome);
            self
        }

        fn called_sequences(&self) -> Vec<u32> {
            self.calls.lock().unwrap().iter().map(|id| id.sequence()).collect()
        }
    }

    #[async_trait]
    impl ProcessSource for ScriptedSource {
        async fn fetch_process_data(&self, identifier: &CanonicalIdentifier) -> FetchOutcome {
            self.calls.lock().unwrap().push(identifier.clone());
            self.answers
                .get(&identifier.sequence())
                .cloned()
                .unwrap_or(FetchOutcome::NotFound)
        }
    }

    fn record(number: &str, movements: usize) -> ProcessRecord {
        ProcessRecord {
            number: Some(number.to_string()),
            class: None,
            subject: None,
            instance_label: None,
            parties: Vec::new(),
            movements: (0..movements)
                .map(|i| Movement {
                    date_label: Some(format!("0{}/01/2023", i + 1)),
                    description: Some("Juntada".to_string()),
                })
                .collect(),
        }
    }

    fn config(dir: &TempDir, initial: u32) -> CrawlerConfig {
        CrawlerConfig {
            initial_sequence: initial,
            output_path: dir.path().join("base_tjpa.jsonl"),
            checkpoint_path: dir.path().join("checkpoint_2023_0040.txt"),
            delay: DelayRange::none(),
            ..CrawlerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_processes_exact_range() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::default();
        let mut driver = EnumerationDriver::new(&config(&dir, 818_800), &source).unwrap();

        let summary = driver.run(5).await.unwrap();

        assert_eq!(source.called_sequences(), (818_800..818_805).collect::<Vec<_>>());
        assert_eq!(summary.processed, 5);
        assert_eq!(summary.empty, 5);
        assert_eq!(summary.next_sequence, 818_805);
        assert!(!dir.path().join("base_tjpa.jsonl").exists());
    }

    #[tokio::test]
    async fn test_identifiers_carry_check_digits() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::default();
        let mut driver = EnumerationDriver::new(&config(&dir, 818_800), &source).unwrap();
        driver.run(2).await.unwrap();

        let ctx = JurisdictionContext::new("2023", "0040").unwrap();
        let calls = source.calls.lock().unwrap().clone();
        assert_eq!(calls[0], CanonicalIdentifier::assemble(818_800, &ctx));
        assert_eq!(calls[1], CanonicalIdentifier::assemble(818_801, &ctx));
    }

    #[tokio::test]
    async fn test_found_records_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::default()
            .with(818_801, FetchOutcome::Found(vec![record("a", 3), record("b", 0)]))
            .with(818_803, FetchOutcome::Found(vec![record("c", 1)]))
            .with(818_802, FetchOutcome::Transport("connection reset".to_string()))
            .with(818_804, FetchOutcome::Found(Vec::new()));
        let cfg = config(&dir, 818_800);
        let mut driver = EnumerationDriver::new(&cfg, &source).unwrap();

        let summary = driver.run(5).await.unwrap();

        assert_eq!(summary.found, 2);
        assert_eq!(summary.empty, 3);
        assert_eq!(summary.records_written, 3);

        let written = OutputLog::new(&cfg.output_path).read_all().unwrap();
        let numbers: Vec<_> = written.iter().map(|r| r.number.clone().unwrap()).collect();
        assert_eq!(numbers, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_step_reports_first_record_movements() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::default()
            .with(7, FetchOutcome::Found(vec![record("a", 4), record("b", 9)]));
        let mut driver = EnumerationDriver::new(&config(&dir, 7), &source).unwrap();

        let outcome = driver.step(7).await.unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Found {
                records: 2,
                first_movements: 4
            }
        );
    }

    #[tokio::test]
    async fn test_restart_resumes_at_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 818_800);

        let first = ScriptedSource::default();
        EnumerationDriver::new(&cfg, &first).unwrap().run(3).await.unwrap();

        let second = ScriptedSource::default();
        let summary = EnumerationDriver::new(&cfg, &second).unwrap().run(4).await.unwrap();

        assert_eq!(first.called_sequences(), vec![818_800, 818_801, 818_802]);
        assert_eq!(second.called_sequences(), vec![818_803, 818_804, 818_805, 818_806]);
        assert_eq!(summary.start, 818_803);

        let stored = CheckpointStore::new(&cfg.checkpoint_path, 0).load().await.unwrap();
        assert_eq!(stored, 818_807);
    }

    #[tokio::test]
    async fn test_corrupt_checkpoint_aborts_before_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 818_800);
        std::fs::write(&cfg.checkpoint_path, "81x").unwrap();

        let source = ScriptedSource::default();
        let err = EnumerationDriver::new(&cfg, &source).unwrap().run(10).await.unwrap_err();

        assert!(err.is_corrupt_checkpoint());
        assert!(source.called_sequences().is_empty());
        assert_eq!(std::fs::read_to_string(&cfg.checkpoint_path).unwrap(), "81x");
    }

    #[tokio::test]
    async fn test_range_past_seven_digits_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::default();
        let mut driver = EnumerationDriver::new(&config(&dir, MAX_SEQUENCE - 1), &source).unwrap();

        assert!(matches!(driver.run(3).await, Err(TjpaError::Config(_))));
        assert!(source.called_sequences().is_empty());

        let summary = driver.run(2).await.unwrap();
        assert_eq!(summary.next_sequence, MAX_SEQUENCE + 1);
    }

    #[tokio::test]
    async fn test_step_past_seven_digits_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 0);
        let source = ScriptedSource::default();
        let mut driver = EnumerationDriver::new(&cfg, &source).unwrap();

        assert!(matches!(driver.step(MAX_SEQUENCE + 1).await, Err(TjpaError::Config(_))));
        assert!(source.called_sequences().is_empty());
        assert!(!cfg.checkpoint_path.exists());
    }

    #[tokio::test]
    async fn test_output_failure_aborts_without_advancing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CrawlerConfig {
            output_path: dir.path().to_path_buf(),
            ..config(&dir, 818_800)
        };
        std::fs::write(&cfg.checkpoint_path, "818800").unwrap();
        let source = ScriptedSource::default()
            .with(818_800, FetchOutcome::Found(vec![record("a", 0)]));

        let err = EnumerationDriver::new(&cfg, &source).unwrap().run(2).await.unwrap_err();

        assert!(matches!(err, TjpaError::Io(_)));
        assert_eq!(source.called_sequences(), vec![818_800]);
        assert_eq!(std::fs::read_to_string(&cfg.checkpoint_path).unwrap(), "818800");
    }

    #[tokio::test]
    async fn test_output_failure_on_fresh_run_leaves_no_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CrawlerConfig {
            output_path: dir.path().to_path_buf(),
            ..config(&dir, 818_800)
        };
        let source = ScriptedSource::default()
            .with(818_800, FetchOutcome::Found(vec![record("a", 0)]));

        let result = EnumerationDriver::new(&cfg, &source).unwrap().run(2).await;

        assert!(result.is_err());
        assert!(!cfg.checkpoint_path.exists());
    }

    #[tokio::test]
    async fn test_zero_range_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 100);
        let source = ScriptedSource::default();
        let summary = EnumerationDriver::new(&cfg, &source).unwrap().run(0).await.unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.next_sequence, 100);
        assert!(!cfg.checkpoint_path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applied_after_every_number() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CrawlerConfig {
            delay: DelayRange::new(Duration::from_millis(1500), Duration::from_millis(3000)),
            ..config(&dir, 10)
        };
        let source = ScriptedSource::default().with(11, FetchOutcome::Found(vec![record("x", 0)]));
        let mut driver = EnumerationDriver::new(&cfg, &source)
            .unwrap()
            .with_rng(StdRng::seed_from_u64(42));

        let started = tokio::time::Instant::now();
        driver.run(3).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(4500), "{elapsed:?}");
        assert!(elapsed <= Duration::from_millis(9000), "{elapsed:?}");
    }
}
