use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::store::ContextStore;
use crate::flow::{Flow, FlowStep};

/// Persists the whole flow collection as one JSON document under a single
/// key. The in-memory copy is authoritative for the session; a failed write
/// is logged and not retried.
pub struct FlowStore {
    backend: Arc<dyn ContextStore>,
    key: String,
    flows: RwLock<Vec<Flow>>,
    write_lock: Mutex<()>,
}

impl FlowStore {
    pub const DEFAULT_KEY: &'static str = "canvasflow-flows";

    /// Opens the store and loads whatever the backend holds.
    pub async fn open(backend: Arc<dyn ContextStore>, key: impl Into<String>) -> Self {
        let store = Self {
            backend,
            key: key.into(),
            flows: RwLock::new(Vec::new()),
            write_lock: Mutex::new(()),
        };
        store.load().await;
        store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reloads from the backend. Missing or malformed data yields an empty
    /// collection.
    pub async fn load(&self) -> Vec<Flow> {
        let _guard = self.write_lock.lock().await;
        let flows = match self.backend.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Flow>>(&raw) {
                Ok(flows) => flows,
                Err(err) => {
                    error!(key = %self.key, %err, "stored flows are malformed, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                error!(key = %self.key, %err, "failed to load flows, starting empty");
                Vec::new()
            }
        };
        info!(key = %self.key, count = flows.len(), "loaded flows");
        *self.flows.write() = flows.clone();
        flows
    }

    /// Replaces the collection and writes it in one go.
    pub async fn save_all(&self, flows: Vec<Flow>) {
        let _guard = self.write_lock.lock().await;
        *self.flows.write() = flows.clone();
        self.persist(&flows).await;
    }

    /// Replaces the flow with the same id, or appends it as a new one.
    pub async fn upsert(&self, mut flow: Flow) -> Flow {
        let _guard = self.write_lock.lock().await;
        let snapshot = {
            let mut flows = self.flows.write();
            match flows.iter().position(|f| f.id == flow.id) {
                Some(index) => {
                    flow.updated_at = next_stamp(flows[index].updated_at);
                    flows[index] = flow.clone();
                }
                None => {
                    let now = Utc::now();
                    flow.created_at = now;
                    flow.updated_at = now;
                    flows.push(flow.clone());
                }
            }
            flows.clone()
        };
        debug!(flow_id = %flow.id, "saved flow");
        self.persist(&snapshot).await;
        flow
    }

    pub async fn remove(&self, id: &str) -> bool {
        let _guard = self.write_lock.lock().await;
        let snapshot = {
            let mut flows = self.flows.write();
            let before = flows.len();
            flows.retain(|flow| flow.id != id);
            if flows.len() == before {
                return false;
            }
            flows.clone()
        };
        debug!(flow_id = %id, "deleted flow");
        self.persist(&snapshot).await;
        true
    }

    pub async fn add_step(&self, id: &str, step: FlowStep) -> bool {
        self.modify(id, |flow| flow.steps.push(step)).await
    }

    pub async fn publish(&self, id: &str, workspace_id: impl Into<String>) -> bool {
        let workspace_id = workspace_id.into();
        self.modify(id, |flow| {
            flow.is_published = true;
            flow.workspace_id = Some(workspace_id);
        })
        .await
    }

    pub fn get(&self, id: &str) -> Option<Flow> {
        self.flows.read().iter().find(|flow| flow.id == id).cloned()
    }

    /// A copy of the collection in store order.
    pub fn list(&self) -> Vec<Flow> {
        self.flows.read().clone()
    }

    pub fn len(&self) -> usize {
        self.flows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.read().is_empty()
    }

    async fn modify(&self, id: &str, change: impl FnOnce(&mut Flow)) -> bool {
        let _guard = self.write_lock.lock().await;
        let snapshot = {
            let mut flows = self.flows.write();
            let Some(flow) = flows.iter_mut().find(|flow| flow.id == id) else {
                return false;
            };
            change(flow);
            flow.updated_at = next_stamp(flow.updated_at);
            flows.clone()
        };
        self.persist(&snapshot).await;
        true
    }

    async fn persist(&self, flows: &[Flow]) {
        let raw = match serde_json::to_string(flows) {
            Ok(raw) => raw,
            Err(err) => {
                error!(key = %self.key, %err, "failed to serialize flows");
                return;
            }
        };
        if let Err(err) = self.backend.set(&self.key, raw).await {
            error!(key = %self.key, %err, "failed to persist flows");
        }
    }
}

/// `now`, or just past `previous` when the clock has not moved forward.
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
