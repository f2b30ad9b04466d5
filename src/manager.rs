//! The surface the chat / recording layer talks to.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::FlowConfig;
use crate::error::{CanvasFlowError, Result};
use crate::flow::parameters::names;
use crate::flow::{self, Flow, FlowParameters, FlowStep};
use crate::runtime::{ExecutionSummary, FlowExecutor};
use crate::schema::{
    validate_parameters, FlowParameterSchema, ParameterDiscovery, ParameterMetadata,
    ParameterSchemaRegistry, SharedSchemaRegistry, ValidationReport,
};
use crate::state::{ContextStore, FileStore, FlowStore};
use crate::tools::ToolRegistry;
use crate::transform::ParameterTransformer;
use crate::utils::InputValidator;

pub struct FlowManager {
    store: Arc<FlowStore>,
    schemas: SharedSchemaRegistry,
    discovery: ParameterDiscovery,
    executor: FlowExecutor,
}

impl FlowManager {
    /// Manager over `store` with the built-in parameter schemas and the
    /// default executor timing.
    pub fn new(store: Arc<FlowStore>, tools: Arc<ToolRegistry>) -> Self {
        let schemas = ParameterSchemaRegistry::with_builtins().shared();
        let transformer = Arc::new(ParameterTransformer::new(Arc::clone(&schemas)));
        let executor = FlowExecutor::new(tools, transformer);
        Self::with_parts(store, schemas, executor)
    }

    pub fn with_parts(
        store: Arc<FlowStore>,
        schemas: SharedSchemaRegistry,
        executor: FlowExecutor,
    ) -> Self {
        Self {
            store,
            discovery: ParameterDiscovery::new(Arc::clone(&schemas)),
            schemas,
            executor,
        }
    }

    /// File-backed manager laid out as `config` describes.
    pub async fn from_config(config: &FlowConfig, tools: Arc<ToolRegistry>) -> Self {
        let backend: Arc<dyn ContextStore> = Arc::new(FileStore::new(config.data_dir.clone()));
        let store = Arc::new(FlowStore::open(backend, config.storage_key.clone()).await);
        let schemas = ParameterSchemaRegistry::with_builtins().shared();
        let transformer = Arc::new(ParameterTransformer::new(Arc::clone(&schemas)));
        let executor = FlowExecutor::new(tools, transformer)
            .with_step_delay(config.step_delay())
            .with_default_spacing(config.default_spacing);
        Self::with_parts(store, schemas, executor)
    }

    pub fn store(&self) -> &Arc<FlowStore> {
        &self.store
    }

    pub fn executor(&self) -> &FlowExecutor {
        &self.executor
    }

    /// Creates an empty flow and persists it right away.
    pub async fn create_flow(&self, name: &str, description: Option<&str>) -> Result<Flow> {
        InputValidator::validate_flow_name(name)?;
        let mut flow = Flow::new(name.trim());
        flow.description = description.map(str::to_string);
        let flow = self.store.upsert(flow).await;
        info!(flow_id = %flow.id, name = %flow.name, "created flow");
        Ok(flow)
    }

    pub async fn save_flow(&self, flow: Flow) -> Flow {
        self.store.upsert(flow).await
    }

    /// Names a finished recording and saves it.
    pub async fn save_recording(
        &self,
        mut draft: Flow,
        name: &str,
        description: Option<&str>,
    ) -> Result<Flow> {
        InputValidator::validate_flow_name(name)?;
        draft.name = name.trim().to_string();
        draft.description = description.map(str::to_string);
        Ok(self.store.upsert(draft).await)
    }

    pub async fn delete_flow(&self, id: &str) -> bool {
        self.store.remove(id).await
    }

    pub fn list_flows(&self) -> Vec<Flow> {
        self.store.list()
    }

    pub fn get_flow(&self, id: &str) -> Option<Flow> {
        self.store.get(id)
    }

    pub fn find_flow_by_name(&self, name: &str) -> Option<Flow> {
        let flows = self.store.list();
        flow::find_by_name(&flows, name).cloned()
    }

    pub fn find_flows_by_name(&self, name: &str) -> Vec<Flow> {
        let flows = self.store.list();
        flow::find_all_by_name(&flows, name)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn publish_flow(&self, id: &str, workspace_id: &str) -> Result<bool> {
        InputValidator::validate_workspace_id(workspace_id)?;
        Ok(self.store.publish(id, workspace_id).await)
    }

    pub async fn add_step_to_flow(&self, id: &str, step: FlowStep) -> bool {
        self.store.add_step(id, step).await
    }

    pub async fn execute_flow(
        &self,
        flow: &Flow,
        parameters: Option<&FlowParameters>,
    ) -> Result<ExecutionSummary> {
        self.executor.execute(flow, parameters).await
    }

    pub async fn execute_flow_with_cancel(
        &self,
        flow: &Flow,
        parameters: Option<&FlowParameters>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionSummary> {
        self.executor
            .execute_with_cancel(flow, parameters, cancel)
            .await
    }

    /// Resolves `name` with the matcher and replays the hit. Validation
    /// problems are logged but do not stop the replay.
    pub async fn execute_flow_by_name(
        &self,
        name: &str,
        parameters: Option<&FlowParameters>,
    ) -> Result<ExecutionSummary> {
        let flow = self
            .find_flow_by_name(name)
            .ok_or_else(|| CanvasFlowError::FlowNotFound(name.to_string()))?;

        if let Some(parameters) = parameters {
            let report = validate_parameters(parameters, &self.discovery.discover(&flow));
            if !report.valid {
                warn!(flow_id = %flow.id, errors = ?report.errors, "flow parameters did not validate");
            }
        }
        self.executor.execute(&flow, parameters).await
    }

    /// Runs an `executeFlow` tool call as produced by the language model:
    /// `flowName` picks the flow, every other field is a parameter.
    pub async fn execute_flow_command(&self, payload: Value) -> Result<ExecutionSummary> {
        let mut parameters = FlowParameters::from_value(payload)?;
        let name = match parameters.remove(names::FLOW_NAME) {
            Some(Value::String(name)) => name,
            _ => {
                return Err(CanvasFlowError::InvalidPayload {
                    tool: "executeFlow".to_string(),
                    message: format!("`{}` must be a string", names::FLOW_NAME),
                })
            }
        };
        let parameters = (!parameters.is_empty()).then_some(parameters);
        self.execute_flow_by_name(&name, parameters.as_ref()).await
    }

    pub fn get_flow_parameter_schema(&self, id: &str) -> Option<FlowParameterSchema> {
        self.store.get(id).map(|flow| self.discovery.discover(&flow))
    }

    pub fn get_all_flow_parameter_schemas(&self) -> Vec<FlowParameterSchema> {
        self.store
            .list()
            .iter()
            .map(|flow| self.discovery.discover(flow))
            .collect()
    }

    pub fn validate_flow_parameters(
        &self,
        id: &str,
        parameters: &FlowParameters,
    ) -> ValidationReport {
        match self.get_flow_parameter_schema(id) {
            Some(schema) => validate_parameters(parameters, &schema),
            None => ValidationReport::flow_not_found(),
        }
    }

    pub fn register_tool_schema(&self, tool: &str, parameters: Vec<ParameterMetadata>) {
        self.schemas.write().register(tool, parameters);
    }

    pub fn tool_schemas(&self) -> BTreeMap<String, Vec<ParameterMetadata>> {
        self.schemas.read().get_all()
    }
}
