// nichegen/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps and their handlers in order.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::GenError;
use crate::pipeline::definition::Pipeline;
use std::collections::HashMap;
use tracing::{event, instrument, span, Instrument, Level};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  fn label(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<GenError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// Steps run in definition order; within a step, `before`, `on` and `after`
  /// handlers run in registration order. The first `PipelineControl::Stop`
  /// ends the run with `PipelineResult::Stopped`; the first handler error is
  /// returned as-is. A non-optional step without any handler fails with
  /// `GenError::StepHandlerMissing` converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let outcome = async {
        if let Some(skip_cond_fn) = &step_def.skip_if {
          if skip_cond_fn(ctx_data.clone()) {
            event!(Level::INFO, "Step skipped due to 'skip_if' condition.");
            return Ok(None);
          }
        }

        let has_handlers = [&self.before, &self.on, &self.after]
          .iter()
          .any(|phase| phase.get(step_name).is_some_and(|v| !v.is_empty()));

        if !has_handlers {
          if step_def.optional {
            event!(Level::DEBUG, "Optional step has no handlers, skipping.");
            return Ok(None);
          }
          event!(Level::ERROR, "Non-optional step has no handlers.");
          return Err(Err::from(GenError::StepHandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }

        for (phase, handlers) in [(Phase::Before, &self.before), (Phase::On, &self.on), (Phase::After, &self.after)] {
          if let Some(stopped) = Self::run_phase(phase, handlers, step_name, &ctx_data).await? {
            return Ok(Some(stopped));
          }
        }
        event!(Level::DEBUG, "Step finished.");
        Ok(None)
      }
      .instrument(step_span)
      .await?;

      if let Some(result) = outcome {
        return Ok(result);
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  /// Runs one phase of one step. `Ok(Some(Stopped))` means a handler halted the pipeline.
  async fn run_phase(
    phase: Phase,
    handlers: &HashMap<String, Vec<Handler<TData, Err>>>,
    step_name: &str,
    ctx_data: &ContextData<TData>,
  ) -> Result<Option<PipelineResult>, Err> {
    let Some(handlers) = handlers.get(step_name) else {
      return Ok(None);
    };

    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      let handler_span = span!(Level::DEBUG, "step_handler", phase = phase.label(), handler_index = handler_idx);
      match handler_fn(ctx_data.clone()).instrument(handler_span).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, phase = phase.label(), "Pipeline stopped by a handler.");
          return Ok(Some(PipelineResult::Stopped));
        }
        Err(e) => {
          event!(Level::ERROR, phase = phase.label(), error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(None)
  }
}
