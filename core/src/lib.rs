// src/lib.rs

//! flowlite: an ASYNC in-process job orchestrator for Rust.
//!
//! A caller defines a *job* as an ordered list of *steps*, each step
//! invoking a named, previously registered *action* against a shared
//! mutable *context*. flowlite executes steps sequentially, propagates
//! named outputs into the context, and fires lifecycle *hooks* on
//! success, on failure, and (optionally) on per-step progress:
//!  - Name-dispatched actions of the fixed shape `(inputs, context)`.
//!  - A per-run context with `$`-prefixed engine-owned system variables
//!    (`$job_run_id`, `$job_status`, `$current_step`, `$on_progress`).
//!  - `on_finish` / `on_except` / `on_progress` hooks plus custom named
//!    hooks dispatched explicitly.
//!  - A bounded worker pool: submitted jobs run concurrently with each
//!    other, never within themselves.
//!  - A `JobFuture` handle exposing the declared outputs and system
//!    variables, or the captured failure with its terminal context.

pub mod core;
pub mod engine;
pub mod error;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::core::context::{
  Context, CURRENT_STEP_KEY, JOB_RUN_ID_KEY, JOB_STATUS_KEY, ON_PROGRESS_KEY, SYSTEM_PREFIX,
};
pub use crate::core::context_data::JobContext;
pub use crate::core::handler::{ActionHandler, BoxFuture, HookHandler};
pub use crate::core::job::{Job, JobStatus, Step};

pub use crate::engine::future::{JobFuture, JobOutput};
pub use crate::engine::WorkflowEngine;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;

/*
    Core Workflow:
    1. Create a `WorkflowEngine` (optionally sizing the worker pool).
    2. Register actions with `engine.register_action(name, |inputs, ctx| async { ... })`
       and hooks with `engine.register_hook(name, |ctx, metadata| async { ... })`.
    3. Build a `Job`: initial `env`, ordered `steps` (action + input/output
       keys), declared `output` keys, optional hook names.
    4. `engine.submit_job(job)` returns a `JobFuture`; `wait().await` yields
       the output map or the captured failure.
    5. `engine.shutdown(true).await` drains in-flight jobs on teardown.
*/
