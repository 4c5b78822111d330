// demos/signer_app/src/errors.rs

use signflow::SignflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Signing Pipeline Error: {source}")]
  Pipeline {
    #[from] // Allows conversion from signflow::SignflowError
    source: SignflowError,
  },
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
