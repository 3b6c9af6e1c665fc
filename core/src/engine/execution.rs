// flowlite/src/engine/execution.rs

//! The job and step executors: sequential step dispatch over one run's
//! context, system-variable management, and hook/error interplay.

use crate::core::context::{Context, CURRENT_STEP_KEY, JOB_RUN_ID_KEY, ON_PROGRESS_KEY};
use crate::core::context_data::JobContext;
use crate::core::job::{Job, JobStatus, Step};
use crate::engine::EngineCore;
use crate::error::{FlowError, FlowResult};

use serde_json::Value;
use std::sync::Arc;
use tracing::{event, instrument, Level};
use uuid::Uuid;

impl EngineCore {
  /// Executes a job's full step sequence and returns the final context.
  ///
  /// State machine per run: `RUNNING -> FINISHED` or `RUNNING -> FAILED`,
  /// both terminal. Hooks always observe a context whose `$job_status`
  /// already reflects the terminal outcome, so a hook can branch on
  /// status without re-deriving it.
  #[instrument(
        name = "Engine::execute_job",
        skip_all,
        fields(job_name = %job.name, num_steps = job.steps.len()),
        err(Display)
    )]
  pub(crate) async fn execute_job(&self, job: &Job) -> FlowResult<Context> {
    let ctx = JobContext::from_env(&job.env);
    {
      let mut guard = ctx.write();
      guard.insert(JOB_RUN_ID_KEY, Uuid::new_v4().to_string());
      guard.set_status(JobStatus::Running);
    }

    // Bind the progress hook into the context itself, so actions can also
    // trigger progress reporting via JobContext::emit_progress.
    if let Some(name) = job.on_progress.as_deref() {
      match self.hooks.resolve(name) {
        Some(hook) => ctx.write().bind_progress(name, hook),
        None => {
          event!(Level::WARN, hook = name, "progress hook is not registered; progress reporting disabled")
        }
      }
    }

    // The on_finish hook runs inside the same failure scope as the steps:
    // if it fails, the run flips to FAILED and on_except still fires.
    let outcome = match self.run_steps(job, &ctx).await {
      Ok(()) => {
        ctx.write().set_status(JobStatus::Finished);
        self.fire_lifecycle_hook(job.on_finish.as_deref(), &ctx).await
      }
      Err(step_err) => Err(step_err),
    };

    match outcome {
      Ok(()) => {
        event!(Level::DEBUG, "job finished");
        Ok(ctx.snapshot())
      }
      Err(run_err) => {
        ctx.write().set_status(JobStatus::Failed);
        // Hook errors are deliberately not isolated: a failing on_except
        // hook replaces the original step error.
        self.fire_lifecycle_hook(job.on_except.as_deref(), &ctx).await?;
        let step = ctx.read().current_step().unwrap_or_default();
        event!(Level::DEBUG, failed_step = %step, "job failed");
        Err(FlowError::JobFailed {
          job_name: job.name.clone(),
          step,
          source: Box::new(run_err),
          context: ctx.snapshot(),
        })
      }
    }
  }

  async fn run_steps(&self, job: &Job, ctx: &JobContext) -> FlowResult<()> {
    for (step_idx, step) in job.steps.iter().enumerate() {
      event!(Level::DEBUG, step = %step.action, index = step_idx, "processing step");

      // $current_step names the upcoming action before the progress hook
      // fires, so progress reports see where the run is headed.
      ctx.write().insert(CURRENT_STEP_KEY, step.action.as_str());
      ctx
        .emit_progress(None)
        .await
        .map_err(|cause| FlowError::HookFailure {
          hook: ctx
            .read()
            .progress_name()
            .unwrap_or_else(|| ON_PROGRESS_KEY.to_string()),
          cause: Arc::new(cause),
        })?;

      self.execute_step(step, ctx).await?;
    }
    Ok(())
  }

  /// Resolves and invokes one step's action against the shared context.
  ///
  /// All effects happen through the context; there is no return value.
  #[instrument(
        name = "Engine::execute_step",
        skip_all,
        fields(action = %step.action),
        err(Display)
    )]
  pub(crate) async fn execute_step(&self, step: &Step, ctx: &JobContext) -> FlowResult<()> {
    // Declared inputs must exist before the action is invoked.
    {
      let guard = ctx.read();
      for input_name in &step.input {
        if !guard.contains(input_name) {
          return Err(FlowError::MissingInput {
            name: input_name.clone(),
          });
        }
      }
    }

    let action = match self.actions.resolve(&step.action) {
      Some(action) => action,
      None => {
        return Err(FlowError::UnregisteredAction {
          name: step.action.clone(),
        })
      }
    };

    // Positional inputs in declaration order. The literal-key fallback is
    // unreachable after the presence check above.
    let inputs: Vec<Value> = {
      let guard = ctx.read();
      step
        .input
        .iter()
        .map(|key| {
          guard
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::String(key.clone()))
        })
        .collect()
    };

    event!(Level::TRACE, "invoking action");
    action(inputs, ctx.clone())
      .await
      .map_err(|cause| FlowError::ActionFailure {
        action: step.action.clone(),
        cause: Arc::new(cause),
      })?;

    // Touch declared outputs: a key the action never set materializes as
    // null. Presence after the call is not enforced.
    {
      let mut guard = ctx.write();
      for output in &step.output {
        let value = guard.get(output).cloned().unwrap_or(Value::Null);
        guard.insert(output.clone(), value);
      }
    }

    Ok(())
  }

  /// Fires an optional lifecycle hook (`on_finish` / `on_except`).
  ///
  /// A name that is not registered is skipped with a warning, matching
  /// lazy run-time validation of job definitions. Hook errors are NOT
  /// caught; the caller decides what they displace.
  async fn fire_lifecycle_hook(&self, name: Option<&str>, ctx: &JobContext) -> FlowResult<()> {
    let name = match name {
      Some(name) => name,
      None => return Ok(()),
    };
    let hook = match self.hooks.resolve(name) {
      Some(hook) => hook,
      None => {
        event!(Level::WARN, hook = name, "lifecycle hook is not registered; skipping");
        return Ok(());
      }
    };
    event!(Level::TRACE, hook = name, "firing lifecycle hook");
    hook(ctx.clone(), None)
      .await
      .map_err(|cause| FlowError::HookFailure {
        hook: name.to_string(),
        cause: Arc::new(cause),
      })
  }
}
