use std::sync::Arc;

use canvasflow::{ContextStore, FileStore, Flow, FlowStep, FlowStore, MemoryStore, ToolInvocation};
use serde_json::json;

fn square_flow(name: &str) -> Flow {
    Flow::new(name).with_step(FlowStep::new(
        "draw a square",
        "Done.",
        vec![ToolInvocation::new(
            "drawSquare",
            json!({"x": 100, "y": 100, "size": 50, "strokeColor": "black"}),
        )
        .with_element_id("el_1")],
    ))
}

#[tokio::test]
async fn flows_survive_a_reload_with_dates_intact() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let backend: Arc<dyn ContextStore> = Arc::new(FileStore::new(dir.path()));

    let store = FlowStore::open(Arc::clone(&backend), FlowStore::DEFAULT_KEY).await;
    let saved = store.upsert(square_flow("Square")).await;
    store
        .publish(&saved.id, "workspace-1")
        .await
        .then_some(())
        .ok_or_else(|| anyhow::anyhow!("publish missed the flow"))?;

    let reopened = FlowStore::open(backend, FlowStore::DEFAULT_KEY).await;
    let flows = reopened.list();
    assert_eq!(flows.len(), 1);

    let restored = &flows[0];
    let original = store.get(&saved.id).unwrap();
    assert_eq!(restored, &original);
    assert_eq!(restored.created_at, saved.created_at);
    assert!(restored.updated_at > saved.updated_at);
    assert!(restored.is_published);
    assert_eq!(restored.workspace_id.as_deref(), Some("workspace-1"));
    assert_eq!(restored.steps[0].tools_used[0].element_id.as_deref(), Some("el_1"));
    Ok(())
}

#[tokio::test]
async fn stored_document_uses_camel_case_fields() -> anyhow::Result<()> {
    let backend = Arc::new(MemoryStore::new());
    let store = FlowStore::open(backend.clone(), "flows").await;
    store.upsert(square_flow("Square")).await;

    let raw = backend.get("flows").await?.expect("document written");
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let flow = &value[0];
    for field in ["id", "name", "steps", "createdAt", "updatedAt", "isPublished"] {
        assert!(flow.get(field).is_some(), "missing `{field}`");
    }
    let invocation = &flow["steps"][0]["toolsUsed"][0];
    assert_eq!(invocation["tool"], "drawSquare");
    assert_eq!(invocation["elementId"], "el_1");
    assert_eq!(invocation["payload"]["strokeColor"], "black");
    Ok(())
}

#[tokio::test]
async fn removing_a_missing_id_leaves_storage_untouched() -> anyhow::Result<()> {
    let backend = Arc::new(MemoryStore::new());
    let store = FlowStore::open(backend.clone(), "flows").await;
    store.upsert(square_flow("One")).await;
    store.upsert(square_flow("Two")).await;
    let before = backend.get("flows").await?;

    assert!(!store.remove("flow_does_not_exist").await);
    assert_eq!(backend.get("flows").await?, before);
    assert_eq!(store.len(), 2);
    Ok(())
}

#[tokio::test]
async fn upsert_replaces_by_id_and_keeps_order() {
    let store = FlowStore::open(Arc::new(MemoryStore::new()), "flows").await;
    let first = store.upsert(square_flow("First")).await;
    let second = store.upsert(square_flow("Second")).await;

    let mut renamed = first.clone();
    renamed.name = "First, renamed".to_string();
    let renamed = store.upsert(renamed).await;

    let names: Vec<String> = store.list().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["First, renamed", "Second"]);
    assert!(renamed.updated_at > first.updated_at);
    assert_eq!(renamed.created_at, first.created_at);
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn list_is_a_copy() {
    let store = FlowStore::open(Arc::new(MemoryStore::new()), "flows").await;
    store.upsert(square_flow("Square")).await;

    let mut copy = store.list();
    copy[0].name = "tampered".to_string();
    copy.clear();

    assert_eq!(store.list()[0].name, "Square");
}

#[tokio::test]
async fn malformed_document_loads_as_empty() -> anyhow::Result<()> {
    let backend = Arc::new(MemoryStore::new());
    backend.set("flows", "{not json".to_string()).await?;

    let store = FlowStore::open(backend, "flows").await;
    assert!(store.is_empty());
    Ok(())
}

#[tokio::test]
async fn recorded_payload_is_persisted_verbatim() -> anyhow::Result<()> {
    let backend = Arc::new(MemoryStore::new());
    let payload = json!({"x": 100, "y": 0.5, "size": 50, "backgroundColor": null, "angle": null});
    let flow = Flow::new("Nulls").with_step(FlowStep::new(
        "draw",
        "ok",
        vec![ToolInvocation::new("drawSquare", payload.clone())],
    ));

    let store = FlowStore::open(backend.clone(), "flows").await;
    store.upsert(flow).await;

    let raw = backend.get("flows").await?.expect("document written");
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(value[0]["steps"][0]["toolsUsed"][0]["payload"], payload);

    let reopened = FlowStore::open(backend, "flows").await;
    let flows = reopened.list();
    assert_eq!(flows[0].steps[0].tools_used[0].payload.to_value(), payload);
    Ok(())
}
