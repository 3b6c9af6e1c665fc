pub mod context;
pub mod context_data;
pub mod handler;
pub mod job;

// Re-export key types for easier access from other flowlite modules.
pub use context::Context;
pub use context_data::JobContext;
pub use handler::{ActionHandler, BoxFuture, HookHandler};
pub use job::{Job, JobStatus, Step};
