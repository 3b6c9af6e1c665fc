// flowlite/src/engine/future.rs

//! `JobFuture`: the asynchronous handle for one submitted job.

use crate::core::context::Context;
use crate::core::job::Job;
use crate::error::{FlowError, FlowResult};

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::{event, Level};

/// Result map produced by a successful run: every `job.output` key
/// (missing keys map to `Value::Null`, not an error) overlaid with every
/// `$`-prefixed system entry from the final context.
pub type JobOutput = HashMap<String, Value>;

/// Owns the pending result of one job run plus the originating job
/// definition. One `JobFuture` per submitted job; not reusable across
/// submissions.
///
/// The first `wait()` produces the authoritative outcome; it is cached so
/// subsequent calls observe the same success map or the same captured
/// failure (idempotent failure observation).
pub struct JobFuture {
  job: Job,
  rx: Option<oneshot::Receiver<FlowResult<Context>>>,
  outcome: Option<Result<JobOutput, FlowError>>,
}

impl JobFuture {
  pub(crate) fn new(job: Job, rx: oneshot::Receiver<FlowResult<Context>>) -> Self {
    Self {
      job,
      rx: Some(rx),
      outcome: None,
    }
  }

  /// The job definition this handle was created for.
  pub fn job(&self) -> &Job {
    &self.job
  }

  /// Suspends until the underlying run completes and returns its outcome.
  ///
  /// On success: the filtered output map (declared outputs plus system
  /// variables). On failure: the captured `FlowError` — for a run that
  /// started, a `JobFailed` carrying the terminal context.
  pub async fn wait(&mut self) -> Result<JobOutput, FlowError> {
    if let Some(outcome) = &self.outcome {
      return outcome.clone();
    }

    let outcome = match self.rx.take() {
      Some(rx) => match rx.await {
        Ok(Ok(context)) => Ok(collect_output(&self.job, &context)),
        Ok(Err(err)) => Err(err),
        Err(_recv_err) => {
          event!(Level::ERROR, job_name = %self.job.name, "job worker dropped without reporting a result");
          Err(FlowError::Internal(format!(
            "job '{}' worker dropped without reporting a result",
            self.job.name
          )))
        }
      },
      // Unreachable: the receiver is only taken on the path that caches
      // an outcome.
      None => Err(FlowError::Internal(
        "job future has no pending result".to_string(),
      )),
    };

    self.outcome = Some(outcome.clone());
    outcome
  }
}

fn collect_output(job: &Job, context: &Context) -> JobOutput {
  let mut output = JobOutput::new();
  for key in &job.output {
    output.insert(key.clone(), context.get(key).cloned().unwrap_or(Value::Null));
  }
  for (key, value) in context.system_vars() {
    output.insert(key.to_string(), value.clone());
  }
  output
}
