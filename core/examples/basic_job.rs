// flowlite/examples/basic_job.rs

use flowlite::{Job, JobContext, Step, WorkflowEngine};
use serde_json::{json, Value};
use tracing::info;

#[tokio::main]
async fn main() {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Job Example ---");

  // 1. Create the engine and register the actions the job will dispatch.
  let engine = WorkflowEngine::new();

  engine.register_action("prepare", |inputs: Vec<Value>, ctx: JobContext| async move {
    info!("preparing {}", inputs[0]);
    ctx.insert("prepared_output", "prepared_output.mp4");
    Ok(())
  });

  engine.register_action("ffmpeg", |inputs: Vec<Value>, ctx: JobContext| async move {
    info!("transcoding {}", inputs[0]);
    ctx.insert("mp3_output", "output.mp3");
    Ok(())
  });

  // 2. Lifecycle hooks, referenced from the job by name.
  engine.register_hook("on_finish", |_ctx: JobContext, _metadata: Option<Value>| async move {
    info!("Job finished successfully!");
    Ok(())
  });
  engine.register_hook("on_except", |_ctx: JobContext, _metadata: Option<Value>| async move {
    info!("Job encountered an exception.");
    Ok(())
  });

  // 3. The job definition is plain data; a JSON literal works as well as
  //    the struct constructors below.
  let mut job = Job::new("video_processing");
  job.env.insert("input_file".to_string(), json!("video.mp4"));
  job.steps = vec![
    Step::new("prepare").with_input(["input_file"]).with_output(["prepared_output"]),
    Step::new("ffmpeg").with_input(["prepared_output"]).with_output(["mp3_output"]),
  ];
  job.output = vec!["mp3_output".to_string()];
  job.on_finish = Some("on_finish".to_string());
  job.on_except = Some("on_except".to_string());

  // 4. Submit, wait, tear down.
  let mut future = engine.submit_job(job);
  match future.wait().await {
    Ok(output) => info!("Job completed with output: {:?}", output),
    Err(err) => info!("Job failed with exception: {}", err),
  }

  engine.shutdown(true).await;
}
