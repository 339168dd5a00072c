// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use nichegen::{ContextData, GenError, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("step1", false, None), ("step2", false, None), ("step3", false, None)]);

  pipeline.on_root("step1", create_simple_handler("step1", " S1"));
  pipeline.on_root("step2", create_simple_handler("step2", " S2"));
  pipeline.on_root("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::with_steps(&["search", "extract", "render"]);

  pipeline.on_root("search", create_simple_handler("search", "A"));
  pipeline.on_root("extract", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push("extract".to_string());
      Ok::<PipelineControl, GenError>(PipelineControl::Stop)
    })
  });
  pipeline.on_root("render", create_simple_handler("render", "C"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert!(!result.is_completed());
  let guard = ctx.read();
  assert_eq!(guard.message, "A");
  assert_eq!(guard.steps_executed, vec!["search", "extract"]);
}

#[tokio::test]
#[serial]
async fn test_stop_in_before_handler_skips_on_and_after() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::with_steps(&["only"]);
  pipeline.before_root("only", create_simple_handler("before", "B"));
  pipeline.on_root("only", create_simple_handler("on", "O"));
  pipeline.after_root("only", create_simple_handler("after", "A"));

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("before".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["before"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("good_step", false, None),
    ("bad_step", false, None),
    ("another_step", false, None),
  ]);

  pipeline.on_root("good_step", create_simple_handler("good_step", "Good"));
  pipeline.on_root("bad_step", create_failing_handler("bad_step", "I am a bad step!"));
  pipeline.on_root("another_step", create_simple_handler("another_step", "NeverRun"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("I am a bad step!".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_skips_step_if_condition_met() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("step1", false, None),
    (
      "step_to_skip",
      false,
      Some(Arc::new(|ctx: ContextData<TestContext>| ctx.read().counter > 0)),
    ),
    ("step3", false, None),
  ]);

  pipeline.on_root("step1", create_simple_handler("step1", " S1"));
  pipeline.on_root("step_to_skip", create_simple_handler("step_to_skip", " SKIPPED_THIS"));
  pipeline.on_root("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.message, " S1 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_set_skip_condition_after_construction() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::with_steps(&["a", "b"]);
  pipeline.on_root("a", create_simple_handler("a", "A"));
  pipeline.on_root("b", create_simple_handler("b", "B"));
  pipeline
    .set_skip_condition("b", Some(Arc::new(|_ctx: ContextData<TestContext>| true)))
    .unwrap();

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().steps_executed, vec!["a"]);

  let missing = pipeline.set_skip_condition("nope", None);
  assert!(matches!(missing, Err(GenError::StepNotFound { step_name }) if step_name == "nope"));
}

#[tokio::test]
#[serial]
async fn test_non_optional_step_missing_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("step_with_no_handler", false, None)]);

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx).await;

  match result {
    Err(TestError::Engine(s)) => {
      assert!(s.contains("StepHandlerMissing"));
      assert!(s.contains("step_with_no_handler"));
    }
    other => panic!("Expected StepHandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_optional_step_missing_handler_succeeds() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("optional_step_no_handler", true, None), ("real", false, None)]);
  pipeline.on_root("real", create_simple_handler("real", "R"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["real"]);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_execution_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("main_step", false, None)]);

  pipeline.after_root("main_step", create_simple_handler("after_main", "After;"));
  pipeline.on_root("main_step", create_simple_handler("on_main", "On;"));
  pipeline.before_root("main_step", create_simple_handler("before_main", "Before;"));
  pipeline.on_root("main_step", create_simple_handler("on_main_2", "On2;"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.message, "Before;On;On2;After;");
  assert_eq!(guard.steps_executed, vec!["before_main", "on_main", "on_main_2", "after_main"]);
}

#[tokio::test]
#[serial]
async fn test_insert_and_remove_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::with_steps(&["search", "render"]);
  pipeline.insert_after_step("search", "extract", false, None).unwrap();
  pipeline.insert_before_step("search", "prepare", true, None).unwrap();
  pipeline.insert_after_step("render", "write", false, None).unwrap();
  assert_eq!(pipeline.step_names(), vec!["prepare", "search", "extract", "render", "write"]);

  for step in ["search", "extract", "render", "write"] {
    pipeline.on_root(step, create_simple_handler(step, ""));
  }
  pipeline.remove_step("render").unwrap();
  assert_eq!(pipeline.step_names(), vec!["prepare", "search", "extract", "write"]);

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await.unwrap();
  assert!(result.is_completed());
  assert_eq!(ctx.read().steps_executed, vec!["search", "extract", "write"]);

  assert!(matches!(
    pipeline.remove_step("render"),
    Err(GenError::StepNotFound { .. })
  ));
  assert!(matches!(
    pipeline.insert_before_step("missing", "x", false, None),
    Err(GenError::StepNotFound { .. })
  ));
}

#[test]
#[should_panic(expected = "not found in pipeline definition")]
fn test_registering_handler_on_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::with_steps(&["search"]);
  pipeline.on_root("serach", create_simple_handler("serach", ""));
}
