use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use canvasflow::{
    CanvasFlowError, Flow, FlowExecutor, FlowManager, FlowParameters, FlowRecorder, FlowStep,
    FlowStore, MemoryStore, ParameterSchemaRegistry, ParameterTransformer, RecordingCanvas,
    ToolInvocation, ToolRegistry,
};
use serde_json::json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

struct Harness {
    manager: FlowManager,
    canvas: Arc<RecordingCanvas>,
    tools: Arc<ToolRegistry>,
}

async fn harness() -> Harness {
    harness_with_step_delay(Duration::ZERO).await
}

async fn harness_with_step_delay(step_delay: Duration) -> Harness {
    let tools = Arc::new(ToolRegistry::new());
    let canvas = RecordingCanvas::new();
    canvas.install(&tools);

    let schemas = ParameterSchemaRegistry::with_builtins().shared();
    let transformer = Arc::new(ParameterTransformer::new(Arc::clone(&schemas)));
    let executor = FlowExecutor::new(Arc::clone(&tools), transformer).with_step_delay(step_delay);
    let store = Arc::new(FlowStore::open(Arc::new(MemoryStore::new()), "flows").await);

    Harness {
        manager: FlowManager::with_parts(store, schemas, executor),
        canvas,
        tools,
    }
}

fn step(tools: Vec<ToolInvocation>) -> FlowStep {
    FlowStep::new("do it", "Done.", tools)
}

fn square_flow() -> Flow {
    Flow::new("Square").with_step(step(vec![ToolInvocation::new(
        "drawSquare",
        json!({"x": 100, "y": 100, "size": 50, "strokeColor": "black"}),
    )]))
}

#[tokio::test]
async fn replay_without_parameters_repeats_the_recording() -> anyhow::Result<()> {
    let h = harness().await;
    let flow = h.manager.save_flow(square_flow()).await;

    let summary = h.manager.execute_flow(&flow, None).await?;
    assert_eq!(summary.instances, 1);
    assert_eq!(summary.invocations, 1);
    assert_eq!(summary.element_ids, vec!["el_1".to_string()]);

    let calls = h.canvas.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].tool, "drawSquare");
    assert_eq!(calls[0].payload["x"], json!(100));
    assert_eq!(calls[0].payload["strokeColor"], "black");
    Ok(())
}

#[tokio::test]
async fn count_and_spacing_lay_instances_out_in_a_row() -> anyhow::Result<()> {
    let h = harness().await;
    let flow = h.manager.save_flow(square_flow()).await;
    let params = FlowParameters::new()
        .with("count", 3)
        .with("spacing", 150)
        .with("xOffset", 10)
        .with("color", "red");

    let summary = h.manager.execute_flow(&flow, Some(&params)).await?;
    assert_eq!(summary.instances, 3);

    let xs: Vec<f64> = h
        .canvas
        .calls()
        .iter()
        .map(|call| call.payload["x"].as_f64().unwrap())
        .collect();
    assert_eq!(xs, vec![110.0, 260.0, 410.0]);
    assert!(h
        .canvas
        .calls()
        .iter()
        .all(|call| call.payload["strokeColor"] == "red" && call.payload["y"].as_f64() == Some(100.0)));

    // the stored recording is not rewritten by a replay
    let stored = h.manager.get_flow(&flow.id).unwrap();
    assert_eq!(stored, flow);
    Ok(())
}

#[tokio::test]
async fn zero_count_makes_no_calls() -> anyhow::Result<()> {
    let h = harness().await;
    let flow = h.manager.save_flow(square_flow()).await;
    let params = FlowParameters::new().with("count", 0);

    let summary = h.manager.execute_flow(&flow, Some(&params)).await?;
    assert_eq!(summary.instances, 0);
    assert!(h.canvas.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn failing_tool_aborts_the_rest_of_the_replay() {
    let h = harness().await;
    h.tools.register_fn("drawCircle", |_| {
        Err(CanvasFlowError::tool_failed("drawCircle", "canvas is locked"))
    });
    let flow = Flow::new("Mixed")
        .with_step(step(vec![ToolInvocation::new(
            "drawSquare",
            json!({"x": 0, "y": 0, "size": 10}),
        )]))
        .with_step(step(vec![ToolInvocation::new(
            "drawCircle",
            json!({"x": 0, "y": 0, "size": 10}),
        )]))
        .with_step(step(vec![ToolInvocation::new(
            "addText",
            json!({"x": 0, "y": 0, "text": "never"}),
        )]));

    let err = h.manager.execute_flow(&flow, None).await.unwrap_err();
    assert!(matches!(err, CanvasFlowError::ToolFailed { ref tool, .. } if tool == "drawCircle"));

    let tools: Vec<String> = h.canvas.calls().into_iter().map(|c| c.tool).collect();
    assert_eq!(tools, vec!["drawSquare"]);
}

#[tokio::test]
async fn unknown_tool_is_skipped() -> anyhow::Result<()> {
    let h = harness().await;
    let flow = Flow::new("Odd").with_step(step(vec![
        ToolInvocation::new("summonDragon", json!({"size": "large"})),
        ToolInvocation::new("drawSquare", json!({"x": 1, "y": 2, "size": 3})),
    ]));

    let summary = h.manager.execute_flow(&flow, None).await?;
    assert_eq!(summary.invocations, 2);
    assert_eq!(summary.element_ids.len(), 1);
    assert_eq!(h.canvas.calls().len(), 1);
    Ok(())
}

#[tokio::test]
async fn cancelled_replay_stops_issuing_calls() {
    let h = harness().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let cancel = CancellationToken::new();
    {
        let calls = Arc::clone(&calls);
        let cancel = cancel.clone();
        h.tools.register_fn("drawSquare", move |_| {
            // cancel from inside the second call
            if calls.fetch_add(1, Ordering::SeqCst) == 1 {
                cancel.cancel();
            }
            Ok(None)
        });
    }
    let params = FlowParameters::new().with("count", 5);

    let result = h
        .manager
        .execute_flow_with_cancel(&square_flow(), Some(&params), &cancel)
        .await;
    assert!(matches!(result, Err(CanvasFlowError::Cancelled)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn executes_by_loose_name() -> anyhow::Result<()> {
    let h = harness().await;
    h.manager.save_flow(square_flow()).await;

    let summary = h
        .manager
        .execute_flow_command(json!({"flowName": "draw the square", "count": 2}))
        .await?;
    assert_eq!(summary.instances, 2);

    let missing = h.manager.execute_flow_by_name("hexagon", None).await;
    assert!(matches!(missing, Err(CanvasFlowError::FlowNotFound(name)) if name == "hexagon"));
    Ok(())
}

#[tokio::test]
async fn recorded_session_can_be_saved_and_replayed() -> anyhow::Result<()> {
    let h = harness().await;
    let mut recorder = FlowRecorder::new();
    recorder.start();
    assert!(!recorder.record_step("hello", "Hi!", Vec::new()));
    assert!(recorder.record_step(
        "add a title",
        "Added.",
        vec![ToolInvocation::new("addText", json!({"x": 5, "y": 5, "text": "Title"}))],
    ));
    let draft = recorder.stop().expect("draft has a step");

    let saved = h
        .manager
        .save_recording(draft, "  Title card ", Some("one line of text"))
        .await?;
    assert_eq!(saved.name, "Title card");
    assert_eq!(h.manager.find_flow_by_name("title").map(|f| f.id), Some(saved.id.clone()));

    let params = FlowParameters::new().with("textTemplate", "Slide {index}");
    h.manager.execute_flow(&saved, Some(&params)).await?;
    assert_eq!(h.canvas.calls()[0].payload["text"], "Slide 0");
    Ok(())
}

#[tokio::test]
async fn execute_command_needs_a_flow_name() {
    let h = harness().await;
    let result = h.manager.execute_flow_command(json!({"count": 2})).await;
    assert!(matches!(result, Err(CanvasFlowError::InvalidPayload { ref tool, .. }) if tool == "executeFlow"));
}

#[tokio::test(start_paused = true)]
async fn delay_pauses_between_instances_only() -> anyhow::Result<()> {
    let h = harness().await;
    let params = FlowParameters::new().with("count", 2).with("delay", 1);

    let started = Instant::now();
    let summary = h.manager.execute_flow(&square_flow(), Some(&params)).await?;
    let elapsed = started.elapsed();

    assert_eq!(summary.instances, 2);
    // one pause between the two instances, none after the last
    assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn single_instance_ignores_delay() -> anyhow::Result<()> {
    let h = harness().await;
    let params = FlowParameters::new().with("delay", 5);

    let started = Instant::now();
    h.manager.execute_flow(&square_flow(), Some(&params)).await?;
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_step_still_waits_the_step_delay() -> anyhow::Result<()> {
    let h = harness_with_step_delay(Duration::from_millis(500)).await;
    let flow = Flow::new("Pause").with_step(step(Vec::new()));

    let started = Instant::now();
    let summary = h.manager.execute_flow(&flow, None).await?;

    assert_eq!(summary.invocations, 0);
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(h.canvas.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn validation_problems_do_not_block_a_named_replay() -> anyhow::Result<()> {
    let h = harness().await;
    let flow = h.manager.save_flow(square_flow()).await;
    let params = FlowParameters::new()
        .with("count", 3)
        .with("spacing", 150)
        .with("xOffset", 10);

    // payload fields are required at flow level and xOffset is not in the schema
    let report = h.manager.validate_flow_parameters(&flow.id, &params);
    assert!(!report.valid);
    assert!(report.errors.contains(&"Unknown parameter: xOffset".to_string()));
    assert!(report.errors.contains(&"Required parameter x is missing".to_string()));

    let summary = h.manager.execute_flow_by_name("Square", Some(&params)).await?;
    assert_eq!(summary.instances, 3);
    assert_eq!(h.canvas.calls()[2].payload["x"].as_f64(), Some(410.0));
    Ok(())
}
