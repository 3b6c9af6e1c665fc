// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use flowlite::{Job, JobContext, WorkflowEngine};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Shared call log for asserting execution order across actions and hooks.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
  Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &CallLog) -> Vec<String> {
  log.lock().clone()
}

/// The two-step data job from the reference scenario:
/// load_data(input_file -> data), process_data(data -> processed_data).
pub fn data_job() -> Job {
  serde_json::from_value(json!({
    "name": "data_processing",
    "env": { "input_file": "data.csv" },
    "steps": [
      { "action": "load_data", "input": ["input_file"], "output": ["data"] },
      { "action": "process_data", "input": ["data"], "output": ["processed_data"] }
    ],
    "output": ["processed_data"]
  }))
  .expect("data job definition must deserialize")
}

/// Registers the data-job actions. With `fail_in_process` set, the
/// process_data action writes its output and then raises, mirroring the
/// reference failure scenario.
pub fn register_data_actions(engine: &WorkflowEngine, fail_in_process: bool) {
  engine.register_action("load_data", |inputs: Vec<Value>, ctx: JobContext| async move {
    let source = inputs[0].as_str().unwrap_or_default().to_string();
    ctx.insert("data", format!("Data loaded from {}", source));
    Ok(())
  });

  engine.register_action("process_data", move |inputs: Vec<Value>, ctx: JobContext| async move {
    let data = inputs[0].as_str().unwrap_or_default().to_string();
    ctx.insert("processed_data", format!("Processed {}", data));
    if fail_in_process {
      anyhow::bail!("Error occurred during data processing");
    }
    Ok(())
  });
}

/// An action that appends `label` to the call log and succeeds.
pub fn register_logging_action(engine: &WorkflowEngine, name: &str, log: &CallLog) {
  let label = format!("action:{}", name);
  let log = log.clone();
  engine.register_action(name, move |_inputs: Vec<Value>, _ctx: JobContext| {
    let log = log.clone();
    let label = label.clone();
    async move {
      log.lock().push(label);
      Ok(())
    }
  });
}

/// A hook that appends `label:<$current_step>:<$job_status>` to the call
/// log, for asserting what state hooks observe.
pub fn register_logging_hook(engine: &WorkflowEngine, name: &str, log: &CallLog) {
  let label = name.to_string();
  let log = log.clone();
  engine.register_hook(name, move |ctx: JobContext, _metadata: Option<Value>| {
    let log = log.clone();
    let label = label.clone();
    async move {
      let (step, status) = {
        let guard = ctx.read();
        (
          guard.current_step().unwrap_or_default(),
          guard.status().map(|s| s.to_string()).unwrap_or_default(),
        )
      };
      log.lock().push(format!("{}:{}:{}", label, step, status));
      Ok(())
    }
  });
}
