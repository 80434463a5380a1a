//! Crawler configuration
//!
//! One immutable [`CrawlerConfig`] is built at startup and handed by reference
//! to the client and the driver. Defaults reproduce the production setup for
//! the Parauapebas comarca; every field can be overridden through `TJPA_*`
//! environment variables (or a `.env` file loaded by the binary).

use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tjpa_common::identifier::{JurisdictionContext, MAX_SEQUENCE};
use tjpa_common::{Result, TjpaError};

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Base URL of the unified process lookup REST service.
pub const DEFAULT_BASE_URL: &str =
    "https://consulta-processual-unificada-prd.tjpa.jus.br/consilium-rest";

/// Filing year with a dense population of non-empty processes.
pub const DEFAULT_YEAR: &str = "2023";

/// Comarca of Parauapebas.
pub const DEFAULT_JURISDICTION_CODE: &str = "0040";

/// Real processes for 2023/0040 start around this number; lower numbers are
/// empty or administrative.
pub const DEFAULT_INITIAL_SEQUENCE: u32 = 818_800;

pub const DEFAULT_OUTPUT_FILE: &str = "base_tjpa.jsonl";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_DELAY_MIN_SECS: f64 = 1.5;

pub const DEFAULT_DELAY_MAX_SECS: f64 = 3.0;

/// Identifiers processed by one `crawl` invocation unless overridden.
pub const DEFAULT_RANGE_SIZE: u32 = 50;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Checkpoint file name for a year/jurisdiction pair.
pub fn default_checkpoint_file(year: &str, jurisdiction_code: &str) -> PathBuf {
    PathBuf::from(format!("checkpoint_{}_{}.txt", year, jurisdiction_code))
}

/// Inclusive bounds of the pause between two identifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No pause at all; used by tests and dry local runs.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draw a pause uniformly from `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        Duration::from_secs_f64(rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64()))
    }
}

/// Configuration for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Four-digit filing year
    pub year: String,

    /// Four-digit comarca code
    pub jurisdiction_code: String,

    /// Sequential number used when no checkpoint exists yet
    pub initial_sequence: u32,

    /// Append-only JSON lines file receiving process records
    pub output_path: PathBuf,

    /// Text file holding the next sequential number to process
    pub checkpoint_path: PathBuf,

    pub request_timeout: Duration,

    pub delay: DelayRange,

    /// User-Agent sent with every lookup
    pub user_agent: String,

    pub base_url: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR.to_string(),
            jurisdiction_code: DEFAULT_JURISDICTION_CODE.to_string(),
            initial_sequence: DEFAULT_INITIAL_SEQUENCE,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            checkpoint_path: default_checkpoint_file(DEFAULT_YEAR, DEFAULT_JURISDICTION_CODE),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delay: DelayRange::new(
                Duration::from_secs_f64(DEFAULT_DELAY_MIN_SECS),
                Duration::from_secs_f64(DEFAULT_DELAY_MAX_SECS),
            ),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Load configuration from environment variables
    ///
    /// - `TJPA_YEAR`, `TJPA_JURISDICTION_CODE`
    /// - `TJPA_INITIAL_SEQUENCE`
    /// - `TJPA_OUTPUT_FILE`, `TJPA_CHECKPOINT_FILE`
    /// - `TJPA_TIMEOUT_SECS`
    /// - `TJPA_DELAY_MIN_SECS`, `TJPA_DELAY_MAX_SECS`
    /// - `TJPA_USER_AGENT`, `TJPA_BASE_URL`
    ///
    /// When `TJPA_CHECKPOINT_FILE` is unset the checkpoint name follows the
    /// effective year and jurisdiction.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(year) = env_var("TJPA_YEAR") {
            config.year = year;
        }
        if let Some(code) = env_var("TJPA_JURISDICTION_CODE") {
            config.jurisdiction_code = code;
        }
        if let Some(seq) = env_var("TJPA_INITIAL_SEQUENCE") {
            config.initial_sequence = seq.trim().parse().map_err(|_| {
                TjpaError::config(format!("TJPA_INITIAL_SEQUENCE is not an integer: {:?}", seq))
            })?;
        }
        if let Some(path) = env_var("TJPA_OUTPUT_FILE") {
            config.output_path = PathBuf::from(path);
        }
        config.checkpoint_path = match env_var("TJPA_CHECKPOINT_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_checkpoint_file(&config.year, &config.jurisdiction_code),
        };
        if let Some(secs) = env_var("TJPA_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("TJPA_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = env_var("TJPA_DELAY_MIN_SECS") {
            config.delay.min = parse_secs("TJPA_DELAY_MIN_SECS", &secs)?;
        }
        if let Some(secs) = env_var("TJPA_DELAY_MAX_SECS") {
            config.delay.max = parse_secs("TJPA_DELAY_MAX_SECS", &secs)?;
        }
        if let Some(agent) = env_var("TJPA_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(url) = env_var("TJPA_BASE_URL") {
            config.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.context()?;

        if self.initial_sequence > MAX_SEQUENCE {
            return Err(TjpaError::config(format!(
                "initial sequence {} exceeds {}",
                self.initial_sequence, MAX_SEQUENCE
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(TjpaError::config("request timeout must be greater than 0"));
        }
        if self.delay.min > self.delay.max {
            return Err(TjpaError::config(format!(
                "delay minimum {:?} is greater than maximum {:?}",
                self.delay.min, self.delay.max
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(TjpaError::config("user agent must not be empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(TjpaError::config("base URL must not be empty"));
        }
        Ok(())
    }

    /// Year and jurisdiction as a validated context
    pub fn context(&self) -> Result<JurisdictionContext> {
        JurisdictionContext::new(self.year.clone(), self.jurisdiction_code.clone())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            TjpaError::config(format!("{} is not a non-negative number of seconds: {:?}", key, value))
        })
}
