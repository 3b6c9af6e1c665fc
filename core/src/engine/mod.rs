// flowlite/src/engine/mod.rs

//! The `WorkflowEngine`: registration surface, scheduling boundary, and
//! lifecycle teardown.
//!
//! Jobs submitted through [`WorkflowEngine::submit_job`] run concurrently
//! with each other on a bounded worker pool (a semaphore over spawned
//! tokio tasks); within one job, steps run strictly sequentially on one
//! worker. `submit_job` never blocks; `JobFuture::wait` is the sole
//! suspension point for observing a result.

pub mod execution;
pub mod future;

use crate::core::context::Context;
use crate::core::context_data::JobContext;
use crate::core::handler::{ActionHandler, HookHandler};
use crate::core::job::{Job, Step};
use crate::engine::future::JobFuture;
use crate::error::{FlowError, FlowResult};
use crate::registry::Registry;

use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{event, Level};

/// Registries plus the pool gate; shared with every spawned job task.
pub(crate) struct EngineCore {
  pub(crate) actions: Registry<ActionHandler>,
  pub(crate) hooks: Registry<HookHandler>,
  permits: Arc<Semaphore>,
  closed: AtomicBool,
}

/// An in-process job orchestrator.
///
/// Callers register actions and hooks during setup, then submit job
/// definitions; each submission yields a [`JobFuture`]. The engine must be
/// used from within a tokio runtime (job tasks are spawned onto it).
pub struct WorkflowEngine {
  inner: Arc<EngineCore>,
  handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkflowEngine {
  /// Engine with a worker pool sized to the platform's available
  /// parallelism.
  pub fn new() -> Self {
    Self::with_workers(default_workers())
  }

  /// Engine with an explicit worker pool size (clamped to at least 1).
  pub fn with_workers(max_workers: usize) -> Self {
    Self {
      inner: Arc::new(EngineCore {
        actions: Registry::new("action"),
        hooks: Registry::new("hook"),
        permits: Arc::new(Semaphore::new(max_workers.max(1))),
        closed: AtomicBool::new(false),
      }),
      handles: Mutex::new(Vec::new()),
    }
  }

  /// Registers an action under `name`. Last registration wins.
  ///
  /// The fixed shape `(inputs, context) -> Result<(), anyhow::Error>` is
  /// enforced by the type system; a mismatched handler is a compile
  /// error, not a runtime one.
  pub fn register_action<F, Fut>(&self, name: impl Into<String>, action: F)
  where
    F: Fn(Vec<Value>, JobContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
  {
    let handler: ActionHandler = Arc::new(move |inputs, ctx| Box::pin(action(inputs, ctx)));
    self.inner.actions.register(name, handler);
  }

  /// Registers a hook under `name`. Last registration wins.
  ///
  /// Hooks use the unified two-argument shape `(context, metadata)`;
  /// lifecycle dispatch passes `None` metadata.
  pub fn register_hook<F, Fut>(&self, name: impl Into<String>, hook: F)
  where
    F: Fn(JobContext, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
  {
    let handler: HookHandler = Arc::new(move |ctx, metadata| Box::pin(hook(ctx, metadata)));
    self.inner.hooks.register(name, handler);
  }

  /// Dispatches a registered hook by name, e.g. a logging-style hook
  /// triggered from inside an action.
  ///
  /// Unlike the lifecycle sites (which skip silently), an absent name
  /// here is `FlowError::UnregisteredHook`.
  pub async fn invoke_hook(
    &self,
    name: &str,
    ctx: &JobContext,
    metadata: Option<Value>,
  ) -> FlowResult<()> {
    let hook = self
      .inner
      .hooks
      .resolve(name)
      .ok_or_else(|| FlowError::UnregisteredHook {
        name: name.to_string(),
      })?;
    hook(ctx.clone(), metadata)
      .await
      .map_err(|cause| FlowError::HookFailure {
        hook: name.to_string(),
        cause: Arc::new(cause),
      })
  }

  /// Schedules `job` on the worker pool and returns a future-like handle
  /// for its result. Never blocks the caller.
  ///
  /// After [`shutdown`](Self::shutdown) the returned future resolves to
  /// `FlowError::EngineClosed` — errors surface lazily through `wait()`,
  /// consistent with missing-action/missing-input errors.
  pub fn submit_job(&self, job: Job) -> JobFuture {
    let (tx, rx) = oneshot::channel();

    if self.inner.closed.load(Ordering::SeqCst) {
      event!(Level::WARN, job_name = %job.name, "job submitted after shutdown; rejecting");
      let _ = tx.send(Err(FlowError::EngineClosed {
        job_name: job.name.clone(),
      }));
      return JobFuture::new(job, rx);
    }

    let inner = Arc::clone(&self.inner);
    let task_job = job.clone();
    let handle = tokio::spawn(async move {
      // The permit bounds how many jobs run at once; waiting submissions
      // queue here, not in the caller.
      let result = match inner.permits.clone().acquire_owned().await {
        Ok(_permit) => inner.execute_job(&task_job).await,
        Err(_) => Err(FlowError::EngineClosed {
          job_name: task_job.name.clone(),
        }),
      };
      // A dropped JobFuture is the only way this send can fail.
      let _ = tx.send(result);
    });
    {
      // Completed tasks are pruned here, so a long-lived engine does not
      // accumulate one handle per job it has ever run.
      let mut guard = self.handles.lock();
      guard.retain(|tracked| !tracked.is_finished());
      guard.push(handle);
    }

    JobFuture::new(job, rx)
  }

  /// Number of spawned job tasks still tracked for shutdown. Completed
  /// tasks are pruned on each submission.
  pub fn tracked_jobs(&self) -> usize {
    self.handles.lock().len()
  }

  /// Runs `job` to completion on the current task, without the pool.
  ///
  /// Returns the final context on success. On failure the error is
  /// `FlowError::JobFailed` carrying the terminal context.
  pub async fn execute_job(&self, job: &Job) -> FlowResult<Context> {
    self.inner.execute_job(job).await
  }

  /// Runs a single step against an existing context.
  pub async fn execute_step(&self, step: &Step, ctx: &JobContext) -> FlowResult<()> {
    self.inner.execute_step(step, ctx).await
  }

  /// Shuts the worker pool down. New submissions are rejected from this
  /// point on; in-flight jobs are never cancelled.
  ///
  /// With `wait == true`, drains every spawned job task before returning.
  pub async fn shutdown(&self, wait: bool) {
    self.inner.closed.store(true, Ordering::SeqCst);
    event!(Level::DEBUG, wait, "engine shutdown requested");
    if !wait {
      return;
    }
    let handles: Vec<JoinHandle<()>> = {
      let mut guard = self.handles.lock();
      guard.drain(..).collect()
    };
    for handle in handles {
      if let Err(join_err) = handle.await {
        event!(Level::WARN, error = %join_err, "job task terminated abnormally during shutdown");
      }
    }
  }

  pub fn is_closed(&self) -> bool {
    self.inner.closed.load(Ordering::SeqCst)
  }
}

impl Default for WorkflowEngine {
  fn default() -> Self {
    Self::new()
  }
}

// Dropping the engine closes submission on every exit path; jobs already
// spawned keep running on the runtime (there is no cancellation
// primitive). Use `shutdown(true)` for a draining teardown.
impl Drop for WorkflowEngine {
  fn drop(&mut self) {
    self.inner.closed.store(true, Ordering::SeqCst);
  }
}

fn default_workers() -> usize {
  std::thread::available_parallelism()
    .map(NonZeroUsize::get)
    .unwrap_or(4)
}
