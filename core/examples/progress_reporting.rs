// flowlite/examples/progress_reporting.rs

use flowlite::{Job, JobContext, Step, WorkflowEngine};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Progress Reporting Example ---");

  let engine = WorkflowEngine::new();

  engine.register_action("download", |_inputs: Vec<Value>, ctx: JobContext| async move {
    ctx.insert("archive", "dataset.tar.gz");
    Ok(())
  });

  engine.register_action("unpack", |_inputs: Vec<Value>, ctx: JobContext| async move {
    // Long-running actions can report intermediate progress themselves.
    ctx.emit_progress(Some("50% unpacked".into())).await?;
    ctx.insert("dataset", "dataset/");
    Ok(())
  });

  // The progress hook fires once per step, before the step's action, with
  // $current_step already naming the upcoming action.
  engine.register_hook("on_progress", |ctx: JobContext, metadata: Option<Value>| async move {
    let (run_id, step, status) = {
      let guard = ctx.read();
      (
        guard.run_id().unwrap_or_default().to_string(),
        guard.current_step().unwrap_or_default(),
        guard.status().map(|s| s.to_string()).unwrap_or_default(),
      )
    };
    match metadata {
      Some(detail) => info!("on_progress: Job {}: {} ({})", run_id, step, detail),
      None => info!("on_progress: Job {}: Step {} with status {}", run_id, step, status),
    }
    Ok(())
  });

  let mut job = Job::new("dataset_fetch");
  job.steps = vec![
    Step::new("download").with_output(["archive"]),
    Step::new("unpack").with_input(["archive"]).with_output(["dataset"]),
  ];
  job.output = vec!["dataset".to_string()];
  job.on_progress = Some("on_progress".to_string());

  let mut future = engine.submit_job(job);
  match future.wait().await {
    Ok(output) => info!("Job completed with output: {:?}", output),
    Err(err) => info!("Job failed with exception: {}", err),
  }

  engine.shutdown(true).await;
}
