// flowlite/src/core/job.rs

//! Job and step definitions: plain serializable records.
//!
//! A job definition is data, not behavior — it names actions and hooks by
//! their registry names and is validated lazily at run time (missing
//! actions and inputs surface during execution, not at submission).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// One action invocation with declared input/output context keys.
///
/// `input` keys must already exist in context when the step runs; `output`
/// keys are the keys the action is expected to populate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
  pub action: String,
  #[serde(default)]
  pub input: Vec<String>,
  #[serde(default)]
  pub output: Vec<String>,
}

impl Step {
  pub fn new(action: impl Into<String>) -> Self {
    Self {
      action: action.into(),
      input: Vec::new(),
      output: Vec::new(),
    }
  }

  pub fn with_input<I, S>(mut self, input: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.input = input.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_output<I, S>(mut self, output: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.output = output.into_iter().map(Into::into).collect();
    self
  }
}

/// A named, ordered sequence of steps plus initial environment, declared
/// outputs, and optional lifecycle hook names.
///
/// `steps` order is the execution order: no reordering, no dependency
/// inference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
  pub name: String,
  #[serde(default)]
  pub env: HashMap<String, Value>,
  #[serde(default)]
  pub steps: Vec<Step>,
  #[serde(default)]
  pub output: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_finish: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_except: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_progress: Option<String>,
}

impl Job {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }
}

/// Terminal/in-flight state of one job run. `Running` transitions to
/// exactly one of `Finished` or `Failed`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
  Running,
  Finished,
  Failed,
}

impl JobStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      JobStatus::Running => "RUNNING",
      JobStatus::Finished => "FINISHED",
      JobStatus::Failed => "FAILED",
    }
  }

  pub fn parse(s: &str) -> Option<JobStatus> {
    match s {
      "RUNNING" => Some(JobStatus::Running),
      "FINISHED" => Some(JobStatus::Finished),
      "FAILED" => Some(JobStatus::Failed),
      _ => None,
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, JobStatus::Finished | JobStatus::Failed)
  }
}

impl fmt::Display for JobStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
