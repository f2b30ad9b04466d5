use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{CanvasFlowError, Result};
use crate::flow::parameters::names;
use crate::flow::{Flow, FlowParameters};
use crate::tools::ToolRegistry;
use crate::transform::ParameterTransformer;

use super::types::ExecutionSummary;

pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_SPACING: f64 = 200.0;

/// Flow 执行器
///
/// Replays a flow's steps in order against the tool registry. With a
/// `count` above one the whole flow is repeated, each instance shifted
/// right by `spacing`. The stored flow is only read.
#[derive(Clone)]
pub struct FlowExecutor {
    tools: Arc<ToolRegistry>,
    transformer: Arc<ParameterTransformer>,
    step_delay: Duration,
    default_spacing: f64,
}

impl FlowExecutor {
    pub fn new(tools: Arc<ToolRegistry>, transformer: Arc<ParameterTransformer>) -> Self {
        Self {
            tools,
            transformer,
            step_delay: DEFAULT_STEP_DELAY,
            default_spacing: DEFAULT_SPACING,
        }
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_default_spacing(mut self, spacing: f64) -> Self {
        self.default_spacing = spacing;
        self
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub async fn execute(
        &self,
        flow: &Flow,
        parameters: Option<&FlowParameters>,
    ) -> Result<ExecutionSummary> {
        self.execute_with_cancel(flow, parameters, &CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), but stops issuing tool calls once
    /// `cancel` fires. Effects already applied stay in place.
    #[tracing::instrument(skip_all, fields(flow_id = %flow.id, flow = %flow.name))]
    pub async fn execute_with_cancel(
        &self,
        flow: &Flow,
        parameters: Option<&FlowParameters>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionSummary> {
        let parameters = parameters.cloned().unwrap_or_default();
        let count = instance_count(&parameters);
        let spacing = parameters.spacing().unwrap_or(self.default_spacing);
        let instance_pause = parameters
            .delay()
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .map(Duration::from_secs_f64);

        info!(count, spacing, steps = flow.steps.len(), "executing flow");
        let mut summary = ExecutionSummary::default();

        for index in 0..count {
            ensure_active(cancel)?;
            let instance = instance_parameters(&parameters, count, index, spacing);
            debug!(instance = index, "starting flow instance");

            for step in &flow.steps {
                for invocation in &step.tools_used {
                    ensure_active(cancel)?;
                    let payload =
                        self.transformer
                            .apply(&invocation.payload, &instance, &invocation.tool);
                    let element_id = self
                        .tools
                        .invoke(&invocation.tool, &payload)
                        .await
                        .inspect_err(|err| {
                            error!(tool = %invocation.tool, instance = index, %err, "tool invocation failed");
                        })?;
                    summary.invocations += 1;
                    summary.element_ids.extend(element_id);
                }
                pause(self.step_delay, cancel).await?;
            }

            summary.instances += 1;
            if let Some(duration) = instance_pause {
                if index + 1 < count {
                    pause(duration, cancel).await?;
                }
            }
        }

        info!(
            instances = summary.instances,
            invocations = summary.invocations,
            "flow execution finished"
        );
        Ok(summary)
    }
}

/// `count` floored; absent means one, anything not positive means none.
fn instance_count(parameters: &FlowParameters) -> usize {
    match parameters.count() {
        None => 1,
        Some(count) if count.is_finite() && count >= 1.0 => count.floor() as usize,
        Some(_) => 0,
    }
}

fn instance_parameters(
    parameters: &FlowParameters,
    count: usize,
    index: usize,
    spacing: f64,
) -> FlowParameters {
    let mut instance = parameters.clone();
    if count > 1 {
        let x = parameters.x_offset().unwrap_or(0.0) + index as f64 * spacing;
        let y = parameters.y_offset().unwrap_or(0.0);
        instance.set(names::X_OFFSET, x);
        instance.set(names::Y_OFFSET, y);
    }
    instance
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CanvasFlowError::Cancelled);
    }
    Ok(())
}

async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    if duration.is_zero() {
        return ensure_active(cancel);
    }
    tokio::select! {
        _ = sleep(duration) => Ok(()),
        _ = cancel.cancelled() => Err(CanvasFlowError::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_defaults_and_floors() {
        assert_eq!(instance_count(&FlowParameters::new()), 1);
        assert_eq!(instance_count(&FlowParameters::new().with("count", 2.7)), 2);
        assert_eq!(instance_count(&FlowParameters::new().with("count", 0)), 0);
        assert_eq!(instance_count(&FlowParameters::new().with("count", -4)), 0);
    }

    #[test]
    fn single_instance_keeps_parameters_untouched() {
        let params = FlowParameters::new().with("color", "red");
        assert_eq!(instance_parameters(&params, 1, 0, 200.0), params);
    }

    #[test]
    fn instances_are_spaced_from_base_offset() {
        let params = FlowParameters::new().with("xOffset", 10);
        let offsets: Vec<(f64, f64)> = (0..3)
            .map(|i| {
                let p = instance_parameters(&params, 3, i, 150.0);
                (p.x_offset().unwrap(), p.y_offset().unwrap())
            })
            .collect();
        assert_eq!(offsets, vec![(10.0, 0.0), (160.0, 0.0), (310.0, 0.0)]);
    }
}
