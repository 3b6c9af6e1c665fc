// flowlite/examples/error_handling.rs

use flowlite::{FlowError, Job, JobContext, Step, WorkflowEngine};
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  let engine = WorkflowEngine::new();

  engine.register_action("load_data", |inputs: Vec<Value>, ctx: JobContext| async move {
    let source = inputs[0].as_str().unwrap_or_default();
    ctx.insert("data", format!("Data loaded from {}", source));
    Ok(())
  });

  engine.register_action("process_data", |_inputs: Vec<Value>, _ctx: JobContext| async move {
    anyhow::bail!("Error occurred during data processing")
  });

  engine.register_hook("on_except", |ctx: JobContext, _metadata: Option<Value>| async move {
    // Hooks observe the terminal status; $job_status is already FAILED here.
    let status = ctx.read().status();
    info!(?status, "on_except hook fired");
    Ok(())
  });

  let mut job = Job::new("data_processing");
  job.env.insert("input_file".to_string(), "data.csv".into());
  job.steps = vec![
    Step::new("load_data").with_input(["input_file"]).with_output(["data"]),
    Step::new("process_data").with_input(["data"]).with_output(["processed_data"]),
  ];
  job.output = vec!["processed_data".to_string()];
  job.on_except = Some("on_except".to_string());

  let mut future = engine.submit_job(job);
  match future.wait().await {
    Ok(output) => info!("unexpected success: {:?}", output),
    Err(err) => {
      error!("Job failed with exception: {}", err);
      // The captured failure carries the terminal context, so outputs
      // computed before the failure are still inspectable.
      if let Some(context) = err.context() {
        info!("partial state at failure: data = {:?}", context.get("data"));
      }
      if let FlowError::JobFailed { step, .. } = &err {
        info!("failing step was '{}'", step);
      }
    }
  }

  engine.shutdown(true).await;
}
