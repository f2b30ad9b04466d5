use std::path::Path;

use serde::Deserialize;

use crate::config::FlowConfig;
use crate::error::{CanvasFlowError, Result};
use crate::flow::{Flow, FlowParameters};
use crate::manager::FlowManager;

/// Config file if given, otherwise defaults; `CANVASFLOW_*` variables win
/// over both.
pub fn load_config(path: Option<&Path>) -> Result<FlowConfig> {
    let base = match path {
        Some(path) => FlowConfig::from_file(path)?,
        None => FlowConfig::default(),
    };
    base.merge_env()
}

/// Parses `--params` JSON. Absent means "no parameters".
pub fn parse_parameters(raw: Option<&str>) -> Result<Option<FlowParameters>> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw)?;
            FlowParameters::from_value(value).map(Some)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlowImport {
    Many(Vec<Flow>),
    One(Box<Flow>),
}

/// Imports a JSON file holding one flow or an array of flows. Flows with an
/// id already present replace the stored one.
pub async fn import_flows(manager: &FlowManager, path: &Path) -> Result<Vec<Flow>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| CanvasFlowError::Storage(format!("cannot read `{}`: {err}", path.display())))?;
    let flows = match serde_json::from_str::<FlowImport>(&raw)? {
        FlowImport::Many(flows) => flows,
        FlowImport::One(flow) => vec![*flow],
    };

    let mut saved = Vec::with_capacity(flows.len());
    for flow in flows {
        saved.push(manager.save_flow(flow).await);
    }
    Ok(saved)
}

pub fn render_flow_table(flows: &[Flow]) {
    println!(
        "{:<40} {:<28} {:>5} {:<9} {}",
        "Id", "Name", "Steps", "Published", "Updated"
    );
    for flow in flows {
        println!(
            "{:<40} {:<28} {:>5} {:<9} {}",
            flow.id,
            flow.name,
            flow.steps.len(),
            if flow.is_published { "yes" } else { "no" },
            flow.updated_at.to_rfc3339()
        );
    }
}
