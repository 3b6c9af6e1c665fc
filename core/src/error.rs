// flowlite/src/error.rs

use crate::core::context::Context;
use anyhow::Error as AnyhowError;
use std::sync::Arc;
use thiserror::Error;

/// Error type of the engine.
///
/// User-raised failures (actions, hooks) are carried as
/// `Arc<anyhow::Error>` so the enum stays `Clone`; `JobFuture::wait()`
/// relies on that to hand out the same captured failure on repeated calls.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
  #[error("Action '{name}' is not registered")]
  UnregisteredAction { name: String },

  #[error("Hook '{name}' is not registered")]
  UnregisteredHook { name: String },

  #[error("Required input '{name}' is missing from context")]
  MissingInput { name: String },

  #[error("Action '{action}' failed: {cause}")]
  ActionFailure {
    action: String,
    cause: Arc<AnyhowError>,
  },

  #[error("Hook '{hook}' failed: {cause}")]
  HookFailure { hook: String, cause: Arc<AnyhowError> },

  /// Terminal failure of one job run. Carries the final context (with
  /// `$job_status == FAILED` and `$current_step` set to the failing
  /// action) so callers can inspect whatever outputs were computed
  /// before the failure.
  #[error("Job '{job_name}' failed at step '{step}': {source}")]
  JobFailed {
    job_name: String,
    step: String,
    source: Box<FlowError>,
    context: Context,
  },

  #[error("Engine is shut down; job '{job_name}' was not accepted")]
  EngineClosed { job_name: String },

  #[error("Internal engine error: {0}")]
  Internal(String),
}

impl FlowError {
  /// The terminal context attached to a `JobFailed`, if any.
  pub fn context(&self) -> Option<&Context> {
    match self {
      FlowError::JobFailed { context, .. } => Some(context),
      _ => None,
    }
  }

  /// Unwraps `JobFailed` layers down to the error that stopped the run.
  pub fn root(&self) -> &FlowError {
    match self {
      FlowError::JobFailed { source, .. } => source.root(),
      other => other,
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
