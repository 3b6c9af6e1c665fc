// flowlite/src/core/context_data.rs

//! `JobContext`: the shared-ownership wrapper handlers receive.

use crate::core::context::Context;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A wrapper around one run's `Context` providing shared ownership and
/// interior mutability using parking_lot::RwLock.
///
/// One `JobContext` is created per job run and is exclusively owned by the
/// worker executing that run; actions and hooks receive clones of the
/// wrapper, never a second run's context, so no cross-run locking
/// discipline is needed.
///
/// IMPORTANT: lock guards obtained from this struct are blocking and MUST
/// NOT be held across `.await` suspension points in asynchronous code.
#[derive(Debug)]
pub struct JobContext(Arc<RwLock<Context>>);

impl JobContext {
  pub fn new(context: Context) -> Self {
    JobContext(Arc::new(RwLock::new(context)))
  }

  /// Fresh per-run context seeded from a job's `env`.
  pub fn from_env(env: &HashMap<String, Value>) -> Self {
    Self::new(Context::from_env(env))
  }

  /// Acquires a read lock. The returned guard MUST be dropped before any
  /// `.await` point.
  pub fn read(&self) -> RwLockReadGuard<'_, Context> {
    self.0.read()
  }

  /// Acquires a write lock. The returned guard MUST be dropped before any
  /// `.await` point.
  pub fn write(&self) -> RwLockWriteGuard<'_, Context> {
    self.0.write()
  }

  /// Convenience lookup that clones the value out from under the lock.
  pub fn get(&self, key: &str) -> Option<Value> {
    self.0.read().get(key).cloned()
  }

  /// Convenience insert that locks internally.
  pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
    self.0.write().insert(key, value);
  }

  pub fn contains(&self, key: &str) -> bool {
    self.0.read().contains(key)
  }

  /// Owned copy of the current context state.
  pub fn snapshot(&self) -> Context {
    self.0.read().clone()
  }

  /// Invokes the bound `$on_progress` hook, if any, with this context.
  ///
  /// Available to actions as well as the executor, so a long-running
  /// action can report intermediate progress. A no-op when the run's job
  /// declared no progress hook. Hook errors propagate to the caller.
  pub async fn emit_progress(&self, metadata: Option<Value>) -> anyhow::Result<()> {
    let hook = { self.0.read().progress() };
    if let Some(hook) = hook {
      hook(self.clone(), metadata).await?;
    }
    Ok(())
  }
}

impl Clone for JobContext {
  fn clone(&self) -> Self {
    JobContext(Arc::clone(&self.0))
  }
}

impl Default for JobContext {
  fn default() -> Self {
    Self::new(Context::default())
  }
}
