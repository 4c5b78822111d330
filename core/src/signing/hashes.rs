// signflow/src/signing/hashes.rs

//! The two signers the expand stages are built from.
//!
//! Stages only see `DataSigner::sign`. Which algorithm sits behind `hashA` and
//! `hashB` is up to the caller; the default pair is deterministic so a run over
//! the same input always produces the same combined result.

use crate::error::{SignflowError, SignflowResult};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// An opaque `(string) -> string` signing function.
pub trait DataSigner: Send + Sync {
  fn name(&self) -> &str;

  fn sign(&self, data: &str) -> anyhow::Result<String>;
}

/// Decimal CRC-32 of the input bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Signer;

impl DataSigner for Crc32Signer {
  fn name(&self) -> &str {
    "crc32"
  }

  fn sign(&self, data: &str) -> anyhow::Result<String> {
    Ok(crc32fast::hash(data.as_bytes()).to_string())
  }
}

/// Lower-case hex of the first 128 bits of a BLAKE3 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSigner;

impl DigestSigner {
  const DIGEST_LEN: usize = 16;
}

impl DataSigner for DigestSigner {
  fn name(&self) -> &str {
    "blake3-128"
  }

  fn sign(&self, data: &str) -> anyhow::Result<String> {
    let digest = blake3::hash(data.as_bytes());
    Ok(hex::encode(&digest.as_bytes()[..Self::DIGEST_LEN]))
  }
}

/// Ignores its input and returns a random `u32` in decimal.
///
/// Results are not reproducible between runs. Only used when asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSigner;

impl DataSigner for RandomSigner {
  fn name(&self) -> &str {
    "random-u32"
  }

  fn sign(&self, _data: &str) -> anyhow::Result<String> {
    Ok(rand::random::<u32>().to_string())
  }
}

/// Adapts a closure into a `DataSigner`.
pub struct FnSigner<F> {
  name: String,
  f: F,
}

impl<F> FnSigner<F>
where
  F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
  pub fn new(name: impl Into<String>, f: F) -> Self {
    Self { name: name.into(), f }
  }
}

/// Wraps a closure that cannot fail.
pub fn infallible_signer(
  name: impl Into<String>,
  f: impl Fn(&str) -> String + Send + Sync,
) -> FnSigner<impl Fn(&str) -> anyhow::Result<String> + Send + Sync> {
  FnSigner::new(name, move |data: &str| Ok(f(data)))
}

impl<F> DataSigner for FnSigner<F>
where
  F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn sign(&self, data: &str) -> anyhow::Result<String> {
    (self.f)(data)
  }
}

/// Which built-in signer pair to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashMode {
  #[default]
  Deterministic,
  Random,
}

impl FromStr for HashMode {
  type Err = SignflowError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "deterministic" => Ok(HashMode::Deterministic),
      "random" => Ok(HashMode::Random),
      other => Err(SignflowError::Configuration {
        message: format!("unknown hash mode '{}' (expected 'deterministic' or 'random')", other),
      }),
    }
  }
}

/// The `hashA`/`hashB` pair shared by the expand stages.
#[derive(Clone)]
pub struct HashFunctions {
  hash_a: Arc<dyn DataSigner>,
  hash_b: Arc<dyn DataSigner>,
}

impl HashFunctions {
  pub fn new(hash_a: impl DataSigner + 'static, hash_b: impl DataSigner + 'static) -> Self {
    Self {
      hash_a: Arc::new(hash_a),
      hash_b: Arc::new(hash_b),
    }
  }

  /// BLAKE3 digest for `hashA`, CRC-32 for `hashB`.
  pub fn deterministic() -> Self {
    Self::new(DigestSigner, Crc32Signer)
  }

  /// Random output from both signers. The combined result changes every run.
  pub fn randomized() -> Self {
    Self::new(RandomSigner, RandomSigner)
  }

  pub fn for_mode(mode: HashMode) -> Self {
    match mode {
      HashMode::Deterministic => Self::deterministic(),
      HashMode::Random => Self::randomized(),
    }
  }

  pub fn hash_a(&self, data: &str) -> SignflowResult<String> {
    sign_with(self.hash_a.as_ref(), data)
  }

  pub fn hash_b(&self, data: &str) -> SignflowResult<String> {
    sign_with(self.hash_b.as_ref(), data)
  }
}

impl Default for HashFunctions {
  fn default() -> Self {
    Self::deterministic()
  }
}

impl fmt::Debug for HashFunctions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HashFunctions")
      .field("hash_a", &self.hash_a.name())
      .field("hash_b", &self.hash_b.name())
      .finish()
  }
}

fn sign_with(signer: &dyn DataSigner, data: &str) -> SignflowResult<String> {
  signer.sign(data).map_err(|source| SignflowError::SignerFailure {
    signer: signer.name().to_string(),
    source,
  })
}
