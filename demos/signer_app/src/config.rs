// demos/signer_app/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use signflow::{HashMode, PipelineConfig};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
  /// How many integers (`0..num_jobs`) to feed.
  pub num_jobs: i64,
  pub workers_per_stage: usize,
  pub channel_capacity: usize,
  pub hash_mode: HashMode,
  pub timeout: Option<Duration>,
}

impl Default for SignerConfig {
  fn default() -> Self {
    Self {
      num_jobs: 100,
      workers_per_stage: 1,
      channel_capacity: 1,
      hash_mode: HashMode::Deterministic,
      timeout: None,
    }
  }
}

impl SignerConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source. Unset variables keep their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let num_jobs = parse_or("SIGNER_NUM_JOBS", &lookup, defaults.num_jobs)?;
    if num_jobs < 0 {
      return Err(AppError::Config(format!("SIGNER_NUM_JOBS must not be negative, got {}", num_jobs)));
    }
    let workers_per_stage = parse_or("SIGNER_WORKERS_PER_STAGE", &lookup, defaults.workers_per_stage)?;
    let channel_capacity = parse_or("SIGNER_CHANNEL_CAPACITY", &lookup, defaults.channel_capacity)?;
    let hash_mode = parse_or("SIGNER_HASH_MODE", &lookup, defaults.hash_mode)?;
    let timeout = lookup("SIGNER_TIMEOUT_SECS")
      .map(|raw| {
        raw
          .trim()
          .parse::<u64>()
          .map(Duration::from_secs)
          .map_err(|e| AppError::Config(format!("Invalid SIGNER_TIMEOUT_SECS '{}': {}", raw, e)))
      })
      .transpose()?;

    let config = Self {
      num_jobs,
      workers_per_stage,
      channel_capacity,
      hash_mode,
      timeout,
    };
    config.pipeline_config().validate()?;

    tracing::info!(?config, "Signer configuration loaded.");
    Ok(config)
  }

  pub fn pipeline_config(&self) -> PipelineConfig {
    let config = PipelineConfig::default()
      .with_workers_per_stage(self.workers_per_stage)
      .with_channel_capacity(self.channel_capacity);
    match self.timeout {
      Some(timeout) => config.with_run_timeout(timeout),
      None => config,
    }
  }
}

fn parse_or<T>(name: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(name) {
    None => Ok(default),
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, raw, e))),
  }
}
