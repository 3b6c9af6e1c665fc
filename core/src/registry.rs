// flowlite/src/registry.rs

//! A name-keyed registry of callable handlers.
//!
//! The engine keeps two of these: one for actions, one for hooks. Both are
//! populated during setup and read-mostly during execution, hence the
//! RwLock; registering concurrently with execution is safe but not the
//! expected usage.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{event, Level};

/// Mapping from handler name to a cloneable callable value.
///
/// Re-registering a name silently replaces the prior entry (last
/// registration wins); there is no unregistration. Absence at dispatch
/// time is a first-class error of the *caller* (`UnregisteredAction` /
/// `UnregisteredHook`), not of the registry.
pub struct Registry<H> {
  kind: &'static str,
  entries: RwLock<HashMap<String, H>>,
}

impl<H: Clone> Registry<H> {
  /// `kind` is a label for log lines only ("action", "hook").
  pub fn new(kind: &'static str) -> Self {
    Self {
      kind,
      entries: RwLock::new(HashMap::new()),
    }
  }

  pub fn register(&self, name: impl Into<String>, handler: H) {
    let name = name.into();
    let replaced = self.entries.write().insert(name.clone(), handler).is_some();
    if replaced {
      event!(Level::DEBUG, kind = self.kind, %name, "registration replaced an existing handler");
    } else {
      event!(Level::TRACE, kind = self.kind, %name, "handler registered");
    }
  }

  pub fn resolve(&self, name: &str) -> Option<H> {
    self.entries.read().get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.read().contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }
}

impl<H> std::fmt::Debug for Registry<H> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Registry")
      .field("kind", &self.kind)
      .field("len", &self.entries.read().len())
      .finish()
  }
}
