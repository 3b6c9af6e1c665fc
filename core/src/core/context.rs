// flowlite/src/core/context.rs

//! The per-run `Context`: a string-keyed bag of JSON values that a job's
//! steps read from and write to, plus the engine-owned system variables.
//!
//! System keys are prefixed with `$` and are never supplied by a job's
//! `env`; the engine writes them during execution. User code may read
//! them but is never required to write them.

use crate::core::handler::HookHandler;
use crate::core::job::JobStatus;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Prefix reserved for engine-owned context keys.
pub const SYSTEM_PREFIX: &str = "$";

/// Unique identifier of one job run, generated once per `execute_job`.
pub const JOB_RUN_ID_KEY: &str = "$job_run_id";

/// Terminal/in-flight status of the run (`RUNNING`, `FINISHED`, `FAILED`).
pub const JOB_STATUS_KEY: &str = "$job_status";

/// Name of the action currently (or last) executing.
pub const CURRENT_STEP_KEY: &str = "$current_step";

/// Marker entry for a bound progress hook. The map entry holds the hook's
/// registered *name*; the resolved handle lives in a dedicated slot on the
/// context, since a callable is not representable as a JSON value.
pub const ON_PROGRESS_KEY: &str = "$on_progress";

/// Mutable key/value state for a single job run.
///
/// Exactly one `Context` exists per run, created from the job's `env` at
/// the start of `execute_job` and discarded (or returned to the caller)
/// once the run completes. Contexts are never shared across runs.
#[derive(Clone, Default)]
pub struct Context {
  values: HashMap<String, Value>,
  progress: Option<HookHandler>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a fresh context seeded with a copy of the job's `env`.
  pub fn from_env(env: &HashMap<String, Value>) -> Self {
    Self {
      values: env.clone(),
      progress: None,
    }
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.values.get(key)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.values.insert(key.into(), value.into());
  }

  pub fn contains(&self, key: &str) -> bool {
    self.values.contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v))
  }

  /// All `$`-prefixed entries, in no particular order.
  pub fn system_vars(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.iter().filter(|(key, _)| key.starts_with(SYSTEM_PREFIX))
  }

  pub fn set_status(&mut self, status: JobStatus) {
    self.insert(JOB_STATUS_KEY, status.as_str());
  }

  pub fn status(&self) -> Option<JobStatus> {
    self
      .get(JOB_STATUS_KEY)
      .and_then(Value::as_str)
      .and_then(JobStatus::parse)
  }

  pub fn run_id(&self) -> Option<&str> {
    self.get(JOB_RUN_ID_KEY).and_then(Value::as_str)
  }

  pub fn current_step(&self) -> Option<String> {
    self
      .get(CURRENT_STEP_KEY)
      .and_then(Value::as_str)
      .map(str::to_string)
  }

  /// Binds a resolved progress hook under `$on_progress`.
  ///
  /// The map entry records the hook's registered name so the key still
  /// surfaces among system variables; the handle itself is kept in a
  /// dedicated slot and invoked via `JobContext::emit_progress`.
  pub fn bind_progress(&mut self, name: &str, hook: HookHandler) {
    self.insert(ON_PROGRESS_KEY, name);
    self.progress = Some(hook);
  }

  pub(crate) fn progress(&self) -> Option<HookHandler> {
    self.progress.clone()
  }

  /// Registered name of the bound progress hook, if any.
  pub fn progress_name(&self) -> Option<String> {
    self
      .get(ON_PROGRESS_KEY)
      .and_then(Value::as_str)
      .map(str::to_string)
  }

  pub fn has_progress(&self) -> bool {
    self.progress.is_some()
  }
}

// The progress slot holds a closure, so Debug is implemented by hand.
impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context")
      .field("values", &self.values)
      .field("progress_bound", &self.progress.is_some())
      .finish()
  }
}
