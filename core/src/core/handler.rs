// flowlite/src/core/handler.rs

//! Type aliases for user-registered action and hook handlers.
//!
//! Handlers are asynchronous closures wrapped into boxed futures so they
//! can be stored behind a registry name and dispatched at run time.
//! They receive a clone of the run's `JobContext` and are responsible for:
//! 1. Acquiring locks (`.read()` or `.write()`) on the context to access
//!    or modify state.
//! 2. **Crucially, ensuring that lock guards are dropped BEFORE any
//!    `.await` suspension point.**
//! 3. Producing outputs exclusively by mutating the context.

use crate::core::context_data::JobContext;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed, sendable future used by the stored handler shapes.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A registered action: one step's work.
///
/// Receives the step's resolved positional inputs plus the run context;
/// mutating the context is its only sanctioned side effect. Errors are
/// arbitrary (`anyhow::Error`) and stop the job.
pub type ActionHandler =
  Arc<dyn Fn(Vec<Value>, JobContext) -> BoxFuture<anyhow::Result<()>> + Send + Sync>;

/// A registered lifecycle hook (`on_finish`, `on_except`, `on_progress`,
/// or any custom name dispatched via `WorkflowEngine::invoke_hook`).
///
/// The signature is the unified two-argument form `(context, metadata)`:
/// lifecycle hooks receive `None` metadata, logging-style hooks a message
/// value. Hook errors are NOT isolated by the engine; see the executor
/// documentation.
pub type HookHandler =
  Arc<dyn Fn(JobContext, Option<Value>) -> BoxFuture<anyhow::Result<()>> + Send + Sync>;
